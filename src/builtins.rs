// ABOUTME: Built-in call and constructor dispatch for print/input/length/match/repr/exit and the five constructors

use std::io::Write;
use std::rc::Rc;

use regex::Regex;

use crate::ast::ConstructKind;
use crate::control::Flow;
use crate::env::Environment;
use crate::error::{regex_error, type_error, value_error, CocktailError};
use crate::token::Token;
use crate::value::{BuiltinKind, Value};

/// Seeds a fresh global environment with the six built-in callables,
/// the three reserved constants, and nothing else — §3's "one flat
/// mapping per scope" module-level env, pre-populated exactly as the
/// reference's `DEFAULT_ENV` is.
pub fn register(env: &Rc<Environment>) {
    env.define("true", Value::Bool(true));
    env.define("false", Value::Bool(false));
    env.define("none", Value::None);

    for kind in [
        BuiltinKind::Print,
        BuiltinKind::Input,
        BuiltinKind::Length,
        BuiltinKind::Match,
        BuiltinKind::Repr,
        BuiltinKind::Exit,
    ] {
        env.define(kind.name(), Value::BuiltinFunction(kind));
    }
    env.define("quit", Value::BuiltinFunction(BuiltinKind::Exit));
}

fn arity_error(name: &str, expected: &str, got: usize, token: &Token) -> CocktailError {
    type_error(token.info.clone(), Some(token.clone()), format!("{} excepted {}, got {}", name, expected, got))
}

pub fn call(kind: BuiltinKind, args: Vec<Value>, token: &Token) -> Result<Flow<Value>, CocktailError> {
    match kind {
        BuiltinKind::Print => call_print(args),
        BuiltinKind::Input => call_input(args, token),
        BuiltinKind::Length => call_length(args, token),
        BuiltinKind::Match => call_match(args, token),
        BuiltinKind::Repr => call_repr(args, token),
        BuiltinKind::Exit => call_exit(args, token),
    }
}

fn call_print(args: Vec<Value>) -> Result<Flow<Value>, CocktailError> {
    let line = args.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
    println!("{}", line);
    Ok(Flow::Value(Value::None))
}

fn call_input(args: Vec<Value>, token: &Token) -> Result<Flow<Value>, CocktailError> {
    if args.len() > 1 {
        return Err(arity_error("input", "at most 1 argument", args.len(), token));
    }
    if let Some(prompt) = args.first() {
        print!("{}", prompt);
        std::io::stdout().flush().ok();
    }
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| value_error(token.info.clone(), Some(token.clone()), format!("failed to read input: {}", e)))?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Flow::Value(Value::Str(line)))
}

fn call_length(args: Vec<Value>, token: &Token) -> Result<Flow<Value>, CocktailError> {
    if args.len() != 1 {
        return Err(arity_error("length", "exactly 1 argument", args.len(), token));
    }
    let n = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::Tuple(items) => items.len(),
        Value::List(items) => items.borrow().len(),
        other => {
            return Err(type_error(
                token.info.clone(),
                Some(token.clone()),
                format!("object of type '{}' has no length", other.type_name()),
            ))
        }
    };
    Ok(Flow::Value(Value::Num(n as f64)))
}

fn call_match(args: Vec<Value>, token: &Token) -> Result<Flow<Value>, CocktailError> {
    if args.len() != 2 {
        return Err(arity_error("match", "exactly 2 arguments", args.len(), token));
    }
    let pattern = match &args[0] {
        Value::Str(s) => s,
        other => {
            return Err(type_error(
                token.info.clone(),
                Some(token.clone()),
                format!("match() pattern must be a string, not '{}'", other.type_name()),
            ))
        }
    };
    let subject = match &args[1] {
        Value::Str(s) => s,
        other => {
            return Err(type_error(
                token.info.clone(),
                Some(token.clone()),
                format!("match() string must be a string, not '{}'", other.type_name()),
            ))
        }
    };
    // Anchored at position 0, partial match allowed — see DESIGN.md.
    let anchored = format!("^(?:{})", pattern);
    let re = Regex::new(&anchored).map_err(|e| regex_error(token.info.clone(), Some(token.clone()), e.to_string()))?;
    Ok(Flow::Value(Value::Bool(re.is_match(subject))))
}

fn call_repr(args: Vec<Value>, token: &Token) -> Result<Flow<Value>, CocktailError> {
    if args.len() != 1 {
        return Err(arity_error("repr", "exactly 1 argument", args.len(), token));
    }
    Ok(Flow::Value(Value::Str(args[0].repr())))
}

fn call_exit(args: Vec<Value>, token: &Token) -> Result<Flow<Value>, CocktailError> {
    if args.len() > 1 {
        return Err(arity_error("exit", "at most 1 argument", args.len(), token));
    }
    match args.into_iter().next() {
        Some(v) => {
            println!("{}", v);
            Ok(Flow::Exit(Some(v)))
        }
        None => Ok(Flow::Exit(None)),
    }
}

/// `Boolean()`/`Number()`/`String()`/`Tuple()`/`List()` per §4.9: no
/// argument yields the type's default-empty value; one argument
/// coerces.
pub fn construct(kind: ConstructKind, arg: Option<Value>, token: &Token) -> Result<Value, CocktailError> {
    match kind {
        ConstructKind::Boolean => Ok(Value::Bool(arg.map(|v| v.truthy()).unwrap_or(false))),
        ConstructKind::Number => construct_number(arg, token),
        ConstructKind::String => Ok(Value::Str(arg.map(|v| v.to_string()).unwrap_or_default())),
        ConstructKind::Tuple => Ok(Value::tuple(construct_sequence(arg, token)?)),
        ConstructKind::List => Ok(Value::list(construct_sequence(arg, token)?)),
    }
}

fn construct_number(arg: Option<Value>, token: &Token) -> Result<Value, CocktailError> {
    match arg {
        None => Ok(Value::Num(0.0)),
        Some(Value::Bool(b)) => Ok(Value::Num(b as i64 as f64)),
        Some(Value::Num(n)) => Ok(Value::Num(n)),
        Some(Value::Str(s)) => s
            .trim()
            .parse::<f64>()
            .map(Value::Num)
            .map_err(|_| value_error(token.info.clone(), Some(token.clone()), format!("could not convert string to number: '{}'", s))),
        Some(other) => Err(value_error(
            token.info.clone(),
            Some(token.clone()),
            format!("cannot convert '{}' to a number", other.type_name()),
        )),
    }
}

fn construct_sequence(arg: Option<Value>, token: &Token) -> Result<Vec<Value>, CocktailError> {
    match arg {
        None => Ok(Vec::new()),
        Some(Value::Str(s)) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
        Some(Value::Tuple(items)) => Ok((*items).clone()),
        Some(Value::List(items)) => Ok(items.borrow().clone()),
        Some(other) => Err(type_error(
            token.info.clone(),
            Some(token.clone()),
            format!("'{}' object is not iterable", other.type_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module_info::ModuleInfo;
    use crate::token::SourcePos;

    fn tok() -> Token {
        Token::new(crate::token::TokenKind::Name, "x", SourcePos { line: 1, col: 1, idx: 0 }, ModuleInfo::unknown(""))
    }

    #[test]
    fn length_of_list() {
        let v = call_length(vec![Value::list(vec![Value::Num(1.0), Value::Num(2.0)])], &tok()).unwrap();
        assert!(matches!(v, Flow::Value(Value::Num(n)) if n == 2.0));
    }

    #[test]
    fn length_arity_error() {
        assert!(call_length(vec![], &tok()).is_err());
    }

    #[test]
    fn match_anchors_at_start() {
        let v = call_match(vec![Value::Str("ab".into()), Value::Str("abc".into())], &tok()).unwrap();
        assert!(matches!(v, Flow::Value(Value::Bool(true))));
        let v = call_match(vec![Value::Str("bc".into()), Value::Str("abc".into())], &tok()).unwrap();
        assert!(matches!(v, Flow::Value(Value::Bool(false))));
    }

    #[test]
    fn repr_quotes_strings() {
        let v = call_repr(vec![Value::Str("hi".into())], &tok()).unwrap();
        assert!(matches!(v, Flow::Value(Value::Str(s)) if s == "\"hi\""));
    }

    #[test]
    fn exit_with_no_argument() {
        assert!(matches!(call_exit(vec![], &tok()).unwrap(), Flow::Exit(None)));
    }

    #[test]
    fn number_construct_parses_string() {
        let v = construct_number(Some(Value::Str(" 42 ".into())), &tok()).unwrap();
        assert!(matches!(v, Value::Num(n) if n == 42.0));
    }

    #[test]
    fn tuple_construct_from_list() {
        let v = construct(ConstructKind::Tuple, Some(Value::list(vec![Value::Num(1.0)])), &tok()).unwrap();
        assert!(matches!(v, Value::Tuple(items) if items.len() == 1));
    }
}
