// ABOUTME: The Value universe every expression evaluates to

use std::fmt;
use std::rc::Rc;

use crate::ast::{Expr, Stmt};
use crate::env::Environment;

/// Formal parameter descriptor: a bare name, kept for diagnostics
/// (duplicate-name rejection, missing required argument errors).
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: String,
}

impl Arg {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A function's full parameter descriptor: position-only, positional,
/// keyword-only, `*args`/`**kwargs`. Defaults are unevaluated expressions
/// attached directly to the parameter they fill, evaluated in the
/// function's closure environment at call time when the caller omits
/// that argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub posonly: Vec<(Arg, Option<Expr>)>,
    pub args: Vec<(Arg, Option<Expr>)>,
    pub vararg: Option<Arg>,
    pub kwonly: Vec<(Arg, Option<Expr>)>,
    pub kwarg: Option<Arg>,
}

impl Arguments {
    /// All declared parameter names, in declaration order, across every
    /// category. Used to check the name-uniqueness invariant.
    pub fn all_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        names.extend(self.posonly.iter().map(|(a, _)| a.name.as_str()));
        names.extend(self.args.iter().map(|(a, _)| a.name.as_str()));
        if let Some(v) = &self.vararg {
            names.push(v.name.as_str());
        }
        names.extend(self.kwonly.iter().map(|(a, _)| a.name.as_str()));
        if let Some(k) = &self.kwarg {
            names.push(k.name.as_str());
        }
        names
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuiltinKind {
    Print,
    Input,
    Length,
    Match,
    Repr,
    Exit,
}

impl BuiltinKind {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinKind::Print => "print",
            BuiltinKind::Input => "input",
            BuiltinKind::Length => "length",
            BuiltinKind::Match => "match",
            BuiltinKind::Repr => "repr",
            BuiltinKind::Exit => "exit",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    None,
    Num(f64),
    Str(String),
    Tuple(Rc<Vec<Value>>),
    List(Rc<std::cell::RefCell<Vec<Value>>>),
    Slice(Box<Value>, Box<Value>, Box<Value>),
    /// An l-value handle: the name a store-context expression refers to.
    /// Never produced as the result of an ordinary (load-context)
    /// evaluation.
    Name(String),
    Function {
        name: String,
        args: Rc<Arguments>,
        body: Rc<Vec<Stmt>>,
        qualname: String,
        closure: Rc<Environment>,
    },
    BuiltinFunction(BuiltinKind),
    Module(Rc<Environment>),
}

impl Value {
    pub fn list(values: Vec<Value>) -> Value {
        Value::List(Rc::new(std::cell::RefCell::new(values)))
    }

    pub fn tuple(values: Vec<Value>) -> Value {
        Value::Tuple(Rc::new(values))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::None => "none",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
            Value::Slice(..) => "slice",
            Value::Name(_) => "name",
            Value::Function { .. } => "function",
            Value::BuiltinFunction(_) => "builtin_function",
            Value::Module(_) => "module",
        }
    }

    /// `v % 1 == 0`: whether a Num carries an exact integer value.
    pub fn is_integral(&self) -> bool {
        matches!(self, Value::Num(n) if n % 1.0 == 0.0)
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::None => false,
            Value::Num(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            _ => true,
        }
    }

    /// The debugging string form used by `repr` and by container
    /// elements' display (Python's `repr`, not `str`).
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => format!("{:?}", s),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::None => write!(f, "none"),
            Value::Num(n) => {
                if n % 1.0 == 0.0 && n.is_finite() {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.repr())?;
                }
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.repr())?;
                }
                write!(f, "]")
            }
            Value::Slice(start, stop, step) => {
                write!(f, "SliceType({}, {}, {})", start, stop, step)
            }
            Value::Name(id) => write!(f, "{}", id),
            Value::Function { qualname, .. } => {
                write!(f, "<function {} at {:#x}>", qualname, self as *const _ as usize)
            }
            Value::BuiltinFunction(kind) => write!(f, "<built-in function {}>", kind.name()),
            Value::Module(env) => write!(f, "Module({})", env),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_print_without_decimal_point() {
        assert_eq!(Value::Num(3.0).to_string(), "3");
        assert_eq!(Value::Num(3.5).to_string(), "3.5");
    }

    #[test]
    fn bool_prints_lowercase_keyword() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }

    #[test]
    fn string_repr_is_quoted() {
        assert_eq!(Value::Str("hi".into()).repr(), "\"hi\"");
    }

    #[test]
    fn empty_containers_are_falsy() {
        assert!(!Value::list(vec![]).truthy());
        assert!(!Value::tuple(vec![]).truthy());
        assert!(Value::list(vec![Value::Num(0.0)]).truthy());
    }

    #[test]
    fn fractional_num_is_not_integral() {
        assert!(Value::Num(4.0).is_integral());
        assert!(!Value::Num(4.5).is_integral());
    }
}
