// ABOUTME: The tree-walking evaluator: statements, expressions, operator dispatch, calls

use std::rc::Rc;

use crate::ast::{Expr, IncDecOp, Operator, Stmt};
use crate::builtins;
use crate::control::Flow;
use crate::env::{Environment, Redirect};
use crate::error::{index_error, name_error, syntax_error, type_error, CocktailError};
use crate::flow_try;
use crate::ast::Ctx;
use crate::ops::{self, BinResult};
use crate::token::Token;
use crate::value::Value;

/// Evaluates a whole module: a static well-formedness pass (mirroring
/// the reference's `Module.eval`, which scans the whole tree for
/// misplaced `break`/`continue`/`return`/`global`/`nonlocal` before
/// running anything) followed by execution in a fresh global scope.
pub fn eval_module(body: &[Stmt], env: &Rc<Environment>) -> Result<Option<Value>, CocktailError> {
    validate_block(body, false, false)?;
    match eval_block(body, env)? {
        Flow::Value(_) => Ok(None),
        Flow::Break | Flow::Continue => unreachable!("validated: no break/continue outside a loop"),
        Flow::Return(_) => unreachable!("validated: no return outside a function"),
        Flow::Exit(v) => Ok(v),
    }
}

/// Walks statements checking that `break`/`continue` only occur with
/// `in_loop`, and `return`/`global`/`nonlocal` only occur with
/// `in_function`. Nested function bodies reset both flags (a loop does
/// not extend into a function defined inside it, and vice versa).
fn validate_block(body: &[Stmt], in_loop: bool, in_function: bool) -> Result<(), CocktailError> {
    for stmt in body {
        validate_stmt(stmt, in_loop, in_function)?;
    }
    Ok(())
}

fn validate_stmt(stmt: &Stmt, in_loop: bool, in_function: bool) -> Result<(), CocktailError> {
    match stmt {
        Stmt::Break(token) if !in_loop => Err(syntax_error(token.info.clone(), Some(token.clone()), "'break' outside loop")),
        Stmt::Continue(token) if !in_loop => Err(syntax_error(token.info.clone(), Some(token.clone()), "'continue' not properly in loop")),
        Stmt::Return(_, token) if !in_function => Err(syntax_error(token.info.clone(), Some(token.clone()), "'return' outside function")),
        Stmt::Global(_, token) if !in_function => Err(syntax_error(token.info.clone(), Some(token.clone()), "'global' outside function")),
        Stmt::Nonlocal(_, token) if !in_function => Err(syntax_error(token.info.clone(), Some(token.clone()), "'nonlocal' outside function")),
        Stmt::If { branches, orelse, .. } => {
            for (_, body) in branches {
                validate_block(body, in_loop, in_function)?;
            }
            validate_block(orelse, in_loop, in_function)
        }
        Stmt::While { body, orelse, .. } => {
            validate_block(body, true, in_function)?;
            validate_block(orelse, in_loop, in_function)
        }
        Stmt::For { body, orelse, .. } | Stmt::ForOf { body, orelse, .. } => {
            validate_block(body, true, in_function)?;
            validate_block(orelse, in_loop, in_function)
        }
        Stmt::FunctionDef { body, .. } => validate_block(body, false, true),
        _ => Ok(()),
    }
}

/// Runs a statement list in order, stopping at the first non-`Value`
/// flow and propagating it to the caller.
pub fn eval_block(body: &[Stmt], env: &Rc<Environment>) -> Result<Flow<Value>, CocktailError> {
    for stmt in body {
        let flow = eval_stmt(stmt, env)?;
        if flow.is_unwinding() {
            return Ok(flow);
        }
    }
    Ok(Flow::Value(Value::None))
}

pub fn eval_stmt(stmt: &Stmt, env: &Rc<Environment>) -> Result<Flow<Value>, CocktailError> {
    match stmt {
        Stmt::ExprStmt(expr) => {
            flow_try!(eval_expr(expr, env)?);
            Ok(Flow::Value(Value::None))
        }

        Stmt::Assign { target, value, .. } => {
            let v = flow_try!(eval_expr(value, env)?);
            store(target, v, env)?;
            Ok(Flow::Value(Value::None))
        }

        Stmt::AugAssign { target, op, value, token } => {
            let name = store_name(target)?;
            let current = env.load(name, token.info.clone(), Some(token.clone()))?;
            let rhs = flow_try!(eval_expr(value, env)?);
            let result = apply_binary(*op, &current, &rhs, token)?;
            store(target, result, env)?;
            Ok(Flow::Value(Value::None))
        }

        Stmt::If { branches, orelse, .. } => {
            for (cond, body) in branches {
                let c = flow_try!(eval_expr(cond, env)?);
                if c.truthy() {
                    return eval_block(body, env);
                }
            }
            eval_block(orelse, env)
        }

        Stmt::While { cond, body, orelse, .. } => eval_while(cond, body, orelse, env),

        Stmt::For { init, cond, step, body, orelse, .. } => eval_for(init, cond, step, body, orelse, env),

        Stmt::ForOf { target, iter, body, orelse, .. } => eval_for_of(target, iter, body, orelse, env),

        Stmt::FunctionDef { name, args, body, .. } => {
            let function = Value::Function {
                name: name.clone(),
                args: Rc::new(args.clone()),
                body: Rc::new(body.clone()),
                qualname: name.clone(),
                closure: env.clone(),
            };
            env.assign(name.clone(), function);
            Ok(Flow::Value(Value::None))
        }

        Stmt::Break(_) => Ok(Flow::Break),
        Stmt::Continue(_) => Ok(Flow::Continue),

        Stmt::Return(value, _) => {
            let v = match value {
                Some(expr) => flow_try!(eval_expr(expr, env)?),
                None => Value::None,
            };
            Ok(Flow::Return(v))
        }

        Stmt::Global(names, _) => {
            let root = env.root();
            for name in names {
                if !root.contains_local(name) {
                    root.define(name.clone(), Value::None);
                }
                env.mark_redirected(name.clone(), Redirect::Global);
            }
            Ok(Flow::Value(Value::None))
        }

        Stmt::Nonlocal(names, token) => {
            if env.parent().is_none() {
                return Err(name_error(token.info.clone(), Some(token.clone()), "nonlocal declared at module scope"));
            }
            for name in names {
                env.mark_redirected(name.clone(), Redirect::Nonlocal);
            }
            Ok(Flow::Value(Value::None))
        }
    }
}

/// Runs one loop body, honouring `Break`/`Continue`/`Return`/`Exit`
/// per §4.5: `Break` skips `orelse` entirely, `Continue` advances,
/// anything else unwinds straight out. Per §4.6's "current environment"
/// wording, loop bodies do not introduce a fresh scope — only function
/// calls do — so assignments made inside a loop are visible to the next
/// iteration and after the loop exits.
fn run_loop_body(body: &[Stmt], env: &Rc<Environment>) -> Result<Option<Flow<Value>>, CocktailError> {
    match eval_block(body, env)? {
        Flow::Value(_) => Ok(None),
        Flow::Break => Ok(Some(Flow::Value(Value::None))),
        Flow::Continue => Ok(None),
        other => Ok(Some(other)),
    }
}

fn eval_while(cond: &Expr, body: &[Stmt], orelse: &[Stmt], env: &Rc<Environment>) -> Result<Flow<Value>, CocktailError> {
    loop {
        let c = flow_try!(eval_expr(cond, env)?);
        if !c.truthy() {
            break;
        }
        if let Some(exit) = run_loop_body(body, env)? {
            return match exit {
                Flow::Value(_) => Ok(Flow::Value(Value::None)),
                other => Ok(other),
            };
        }
    }
    eval_block(orelse, env)
}

#[allow(clippy::too_many_arguments)]
fn eval_for(
    init: &Option<Box<Stmt>>,
    cond: &Option<Expr>,
    step: &Option<Box<Stmt>>,
    body: &[Stmt],
    orelse: &[Stmt],
    env: &Rc<Environment>,
) -> Result<Flow<Value>, CocktailError> {
    if let Some(init) = init {
        flow_try!(eval_stmt(init, env)?);
    }
    loop {
        if let Some(cond) = cond {
            let c = flow_try!(eval_expr(cond, env)?);
            if !c.truthy() {
                break;
            }
        }
        if let Some(exit) = run_loop_body(body, env)? {
            return match exit {
                Flow::Value(_) => Ok(Flow::Value(Value::None)),
                other => Ok(other),
            };
        }
        if let Some(step) = step {
            flow_try!(eval_stmt(step, env)?);
        }
    }
    eval_block(orelse, env)
}

fn eval_for_of(target: &str, iter: &Expr, body: &[Stmt], orelse: &[Stmt], env: &Rc<Environment>) -> Result<Flow<Value>, CocktailError> {
    let iterable = flow_try!(eval_expr(iter, env)?);
    let token = iter.token();
    let items = iterate(&iterable, token)?;

    for item in items {
        env.assign(target.to_string(), item);
        if let Some(exit) = run_loop_body(body, env)? {
            return match exit {
                Flow::Value(_) => Ok(Flow::Value(Value::None)),
                other => Ok(other),
            };
        }
    }
    eval_block(orelse, env)
}

/// Materializes the elements `for-of` walks over. Strings iterate as
/// one-character strings, Tuple/List iterate their elements.
fn iterate(value: &Value, token: &Token) -> Result<Vec<Value>, CocktailError> {
    match value {
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
        Value::Tuple(items) => Ok((**items).clone()),
        Value::List(items) => Ok(items.borrow().clone()),
        other => Err(type_error(
            token.info.clone(),
            Some(token.clone()),
            format!("'{}' object is not iterable", other.type_name()),
        )),
    }
}

pub fn eval_expr(expr: &Expr, env: &Rc<Environment>) -> Result<Flow<Value>, CocktailError> {
    match expr {
        Expr::Constant(v, _) => Ok(Flow::Value(v.clone())),

        Expr::TupleLit(items, _) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(flow_try!(eval_expr(item, env)?));
            }
            Ok(Flow::Value(Value::tuple(out)))
        }

        Expr::ListLit(items, _) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(flow_try!(eval_expr(item, env)?));
            }
            Ok(Flow::Value(Value::list(out)))
        }

        Expr::SliceExpr { start, stop, step, .. } => {
            let start = match start {
                Some(e) => flow_try!(eval_expr(e, env)?),
                None => Value::None,
            };
            let stop = match stop {
                Some(e) => flow_try!(eval_expr(e, env)?),
                None => Value::None,
            };
            let step = match step {
                Some(e) => flow_try!(eval_expr(e, env)?),
                None => Value::None,
            };
            Ok(Flow::Value(Value::Slice(Box::new(start), Box::new(stop), Box::new(step))))
        }

        Expr::Name { id, ctx, token } => match ctx {
            Ctx::Store => Ok(Flow::Value(Value::Name(id.clone()))),
            Ctx::Load => {
                let v = env.load(id, token.info.clone(), Some(token.clone()))?;
                Ok(Flow::Value(v))
            }
        },

        Expr::BinOp { left, op, right, token } => {
            let l = flow_try!(eval_expr(left, env)?);
            let r = flow_try!(eval_expr(right, env)?);
            Ok(Flow::Value(apply_binary(*op, &l, &r, token)?))
        }

        Expr::UnaryOp { op, operand, token } => {
            let v = flow_try!(eval_expr(operand, env)?);
            match ops::unary_op(*op, &v) {
                Some(BinResult::Value(result)) => Ok(Flow::Value(result)),
                Some(BinResult::Error(message)) => Err(type_error(token.info.clone(), Some(token.clone()), message)),
                None => Err(type_error(
                    token.info.clone(),
                    Some(token.clone()),
                    format!("bad operand type for unary {}: '{}'", op.symbol(), v.type_name()),
                )),
            }
        }

        Expr::InplaceUnaryOp { op, target, token } => {
            let current = env.load(target, token.info.clone(), Some(token.clone()))?;
            let delta = match current {
                Value::Num(n) => n,
                Value::Bool(b) => b as i64 as f64,
                _ => {
                    return Err(type_error(
                        token.info.clone(),
                        Some(token.clone()),
                        format!("bad operand type for {}: '{}'", inc_dec_symbol(*op), current.type_name()),
                    ))
                }
            };
            let updated = Value::Num(match op {
                IncDecOp::PreIncrement | IncDecOp::PostIncrement => delta + 1.0,
                IncDecOp::PreDecrement | IncDecOp::PostDecrement => delta - 1.0,
            });
            env.assign(target.clone(), updated.clone());
            let result = match op {
                IncDecOp::PreIncrement | IncDecOp::PreDecrement => updated,
                IncDecOp::PostIncrement | IncDecOp::PostDecrement => Value::Num(delta),
            };
            Ok(Flow::Value(result))
        }

        Expr::Compare { left, ops: cmp_ops, comparators, token } => {
            let mut current = flow_try!(eval_expr(left, env)?);
            for (op, comparator) in cmp_ops.iter().zip(comparators.iter()) {
                let next = flow_try!(eval_expr(comparator, env)?);
                match ops::compare(*op, &current, &next) {
                    Some(true) => current = next,
                    Some(false) => return Ok(Flow::Value(Value::Bool(false))),
                    None => {
                        return Err(type_error(
                            token.info.clone(),
                            Some(token.clone()),
                            format!("'{}' not supported between '{}' and '{}'", op.symbol(), current.type_name(), next.type_name()),
                        ))
                    }
                }
            }
            Ok(Flow::Value(Value::Bool(true)))
        }

        Expr::GetItem { value, index, token } => {
            let v = flow_try!(eval_expr(value, env)?);
            let idx = flow_try!(eval_expr(index, env)?);
            Ok(Flow::Value(get_item(&v, &idx, token)?))
        }

        Expr::Call { func, args, token } => {
            let callee = flow_try!(eval_expr(func, env)?);
            let mut arg_values = Vec::with_capacity(args.len());
            for arg in args {
                arg_values.push(flow_try!(eval_expr(arg, env)?));
            }
            call_function(&callee, arg_values, token)
        }

        Expr::Construct { kind, arg, token } => {
            let arg_value = match arg {
                Some(e) => Some(flow_try!(eval_expr(e, env)?)),
                None => None,
            };
            Ok(Flow::Value(builtins::construct(*kind, arg_value, token)?))
        }

        Expr::BuiltinCall { kind, args, token } => {
            let mut arg_values = Vec::with_capacity(args.len());
            for arg in args {
                arg_values.push(flow_try!(eval_expr(arg, env)?));
            }
            builtins::call(*kind, arg_values, token)
        }
    }
}

fn inc_dec_symbol(op: IncDecOp) -> &'static str {
    match op {
        IncDecOp::PreIncrement | IncDecOp::PostIncrement => "++",
        IncDecOp::PreDecrement | IncDecOp::PostDecrement => "--",
    }
}

/// Store-context target resolution: only bare names are assignable
/// (the reference never attaches a subscript target to `Assign`).
fn store_name(target: &Expr) -> Result<&str, CocktailError> {
    match target {
        Expr::Name { id, .. } => Ok(id.as_str()),
        other => Err(type_error(
            other.token().info.clone(),
            Some(other.token().clone()),
            "cannot assign to this expression",
        )),
    }
}

fn store(target: &Expr, value: Value, env: &Rc<Environment>) -> Result<(), CocktailError> {
    let name = store_name(target)?;
    match env.redirect_of(name) {
        Some(Redirect::Global) => {
            let root = env.root();
            root.assign(name.to_string(), value);
        }
        Some(Redirect::Nonlocal) => {
            if !env.set(name, value.clone()) {
                if let Some(parent) = env.parent() {
                    parent.assign(name.to_string(), value);
                }
            }
        }
        None => env.assign(name.to_string(), value),
    }
    Ok(())
}

/// Shared by `BinOp` and `AugAssign`: dispatch through `ops::binary_op`
/// and translate the `NotImplemented`/guard-error outcomes into the
/// arithmetic-operator `TypeError` wording from §4.3.
fn apply_binary(op: Operator, left: &Value, right: &Value, token: &Token) -> Result<Value, CocktailError> {
    match ops::binary_op(op, left, right) {
        Some(BinResult::Value(v)) => Ok(v),
        Some(BinResult::Error(message)) => Err(type_error(token.info.clone(), Some(token.clone()), message)),
        None => Err(type_error(
            token.info.clone(),
            Some(token.clone()),
            format!("unsupported operand type(s) for {}: '{}' and '{}'", op.symbol(), left.type_name(), right.type_name()),
        )),
    }
}

/// `x[i]` / `x[slice]` per §4.4.
fn get_item(value: &Value, index: &Value, token: &Token) -> Result<Value, CocktailError> {
    match index {
        Value::Slice(start, stop, step) => get_slice(value, start, stop, step, token),
        Value::Num(n) => {
            if n % 1.0 != 0.0 {
                return Err(type_error(
                    token.info.clone(),
                    Some(token.clone()),
                    format!("{} indices must be integers or slices, not float", value.type_name()),
                ));
            }
            get_index(value, *n as i64, token)
        }
        other => match value {
            Value::Tuple(_) | Value::List(_) | Value::Str(_) => Err(type_error(
                token.info.clone(),
                Some(token.clone()),
                format!("{} indices must be integers or slices, not {}", value.type_name(), other.type_name()),
            )),
            _ => Err(type_error(
                token.info.clone(),
                Some(token.clone()),
                format!("'{}' object is not subscriptable", value.type_name()),
            )),
        },
    }
}

fn normalize_index(len: usize, i: i64) -> i64 {
    if i < 0 {
        i + len as i64
    } else {
        i
    }
}

fn get_index(value: &Value, i: i64, token: &Token) -> Result<Value, CocktailError> {
    match value {
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let idx = normalize_index(chars.len(), i);
            if idx < 0 || idx as usize >= chars.len() {
                return Err(index_error(token.info.clone(), Some(token.clone()), "string index out of range"));
            }
            Ok(Value::Str(chars[idx as usize].to_string()))
        }
        Value::Tuple(items) => {
            let idx = normalize_index(items.len(), i);
            if idx < 0 || idx as usize >= items.len() {
                return Err(index_error(token.info.clone(), Some(token.clone()), "tuple index out of range"));
            }
            Ok(items[idx as usize].clone())
        }
        Value::List(items) => {
            let items = items.borrow();
            let idx = normalize_index(items.len(), i);
            if idx < 0 || idx as usize >= items.len() {
                return Err(index_error(token.info.clone(), Some(token.clone()), "list index out of range"));
            }
            Ok(items[idx as usize].clone())
        }
        other => Err(type_error(
            token.info.clone(),
            Some(token.clone()),
            format!("'{}' object is not subscriptable", other.type_name()),
        )),
    }
}

fn slice_bound(v: &Value, default: i64, len: usize, token: &Token) -> Result<i64, CocktailError> {
    match v {
        Value::None => Ok(default),
        Value::Num(n) if n % 1.0 == 0.0 => Ok(normalize_index(len, *n as i64)),
        Value::Num(_) => Err(type_error(token.info.clone(), Some(token.clone()), "slice indices must be integers")),
        other => Err(type_error(
            token.info.clone(),
            Some(token.clone()),
            format!("slice indices must be integers, not '{}'", other.type_name()),
        )),
    }
}

fn get_slice(value: &Value, start: &Value, stop: &Value, step: &Value, token: &Token) -> Result<Value, CocktailError> {
    let step_n = match step {
        Value::None => 1,
        Value::Num(n) if n % 1.0 == 0.0 && *n != 0.0 => *n as i64,
        Value::Num(n) if *n == 0.0 => {
            return Err(crate::error::value_error(token.info.clone(), Some(token.clone()), "slice step cannot be zero"))
        }
        _ => return Err(type_error(token.info.clone(), Some(token.clone()), "slice indices must be integers")),
    };

    let lo_default = if step_n > 0 { 0 } else { -1 };
    let hi_default_sign_matters = step_n > 0;

    match value {
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len();
            let (lo, hi) = slice_bounds(start, stop, len, lo_default, hi_default_sign_matters, token)?;
            let picked = pick_indices(lo, hi, step_n, len);
            Ok(Value::Str(picked.into_iter().map(|i| chars[i]).collect()))
        }
        Value::Tuple(items) => {
            let len = items.len();
            let (lo, hi) = slice_bounds(start, stop, len, lo_default, hi_default_sign_matters, token)?;
            let picked = pick_indices(lo, hi, step_n, len);
            Ok(Value::tuple(picked.into_iter().map(|i| items[i].clone()).collect()))
        }
        Value::List(items) => {
            let borrowed = items.borrow();
            let len = borrowed.len();
            let (lo, hi) = slice_bounds(start, stop, len, lo_default, hi_default_sign_matters, token)?;
            let picked = pick_indices(lo, hi, step_n, len);
            Ok(Value::list(picked.into_iter().map(|i| borrowed[i].clone()).collect()))
        }
        other => Err(type_error(
            token.info.clone(),
            Some(token.clone()),
            format!("'{}' object is not subscriptable", other.type_name()),
        )),
    }
}

fn slice_bounds(
    start: &Value,
    stop: &Value,
    len: usize,
    lo_default_neg_step: i64,
    positive_step: bool,
    token: &Token,
) -> Result<(i64, i64), CocktailError> {
    let lo_default = if positive_step { 0 } else { len as i64 + lo_default_neg_step };
    let hi_default = if positive_step { len as i64 } else { -1 };
    let lo = slice_bound(start, lo_default, len, token)?;
    let hi = slice_bound(stop, hi_default, len, token)?;
    Ok((lo, hi))
}

fn pick_indices(lo: i64, hi: i64, step: i64, len: usize) -> Vec<usize> {
    let mut out = Vec::new();
    if step > 0 {
        let mut i = lo.max(0);
        let hi = hi.min(len as i64);
        while i < hi {
            out.push(i as usize);
            i += step;
        }
    } else {
        let mut i = lo.min(len as i64 - 1);
        while i > hi {
            if i >= 0 && (i as usize) < len {
                out.push(i as usize);
            }
            i += step;
        }
    }
    out
}

/// Calls `callee` with already-evaluated `args`. Handles `Function`
/// (full argument binding per §4.6) and `BuiltinFunction` (dispatched
/// through the `builtins` module); anything else is not callable.
pub fn call_function(callee: &Value, args: Vec<Value>, token: &Token) -> Result<Flow<Value>, CocktailError> {
    match callee {
        Value::Function { name, args: params, body, closure, .. } => {
            let call_env = Environment::with_parent(closure.clone());
            bind_arguments(name, params, args, &call_env, token)?;
            match eval_block(body, &call_env)? {
                Flow::Return(v) => Ok(Flow::Value(v)),
                Flow::Value(_) => Ok(Flow::Value(Value::None)),
                other => Ok(other),
            }
        }
        Value::BuiltinFunction(kind) => builtins::call(*kind, args, token),
        other => Err(type_error(
            token.info.clone(),
            Some(token.clone()),
            format!("'{}' object is not callable", other.type_name()),
        )),
    }
}

/// Binds `args` against `params` per §4.6: position-only, positional,
/// keyword-only (filled positionally — Cocktail has no call-site
/// keyword syntax, so `*`-section parameters are simply the tail of
/// the positional run), `*vararg` absorbing anything left over, and
/// `**kwarg` (always empty, since there is no keyword call syntax).
/// Defaults fill anything the caller omitted, evaluated in the
/// callee's own (freshly bound) scope.
fn bind_arguments(
    name: &str,
    params: &crate::value::Arguments,
    mut args: Vec<Value>,
    call_env: &Rc<Environment>,
    token: &Token,
) -> Result<(), CocktailError> {
    let positional: Vec<_> = params.posonly.iter().chain(params.args.iter()).collect();
    let required = positional.iter().filter(|(_, default)| default.is_none()).count()
        + params.kwonly.iter().filter(|(_, d)| d.is_none()).count();
    let max = positional.len() + params.kwonly.len();

    if args.len() < required || (params.vararg.is_none() && args.len() > max) {
        return Err(type_error(
            token.info.clone(),
            Some(token.clone()),
            format!("{} excepted {} argument{}, got {}", name, required, if required == 1 { "" } else { "s" }, args.len()),
        ));
    }

    let mut drain = args.drain(..);
    for (arg, default) in &positional {
        let value = match drain.next() {
            Some(v) => v,
            None => eval_default(default, call_env, token)?,
        };
        call_env.define(arg.name.clone(), value);
    }
    for (arg, default) in &params.kwonly {
        let value = match drain.next() {
            Some(v) => v,
            None => eval_default(default, call_env, token)?,
        };
        call_env.define(arg.name.clone(), value);
    }
    if let Some(vararg) = &params.vararg {
        let rest: Vec<Value> = drain.collect();
        call_env.define(vararg.name.clone(), Value::tuple(rest));
    }
    if let Some(kwarg) = &params.kwarg {
        call_env.define(kwarg.name.clone(), Value::tuple(Vec::new()));
    }
    Ok(())
}

fn eval_default(default: &Option<Expr>, env: &Rc<Environment>, token: &Token) -> Result<Value, CocktailError> {
    match default {
        Some(expr) => match eval_expr(expr, env)? {
            Flow::Value(v) => Ok(v),
            _ => Err(type_error(token.info.clone(), Some(token.clone()), "default value evaluation did not produce a value")),
        },
        None => Err(type_error(token.info.clone(), Some(token.clone()), "missing required argument")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::lexer;
    use crate::module_info::ModuleInfo;
    use crate::parser;

    fn run(src: &str) -> Result<Option<Value>, CocktailError> {
        let info = ModuleInfo::unknown(src);
        let tokens = lexer::tokenize(info)?;
        let module = parser::parse(tokens)?;
        let env = Environment::new();
        crate::builtins::register(&env);
        eval_module(&module, &env)
    }

    fn run_and_get(src: &str, name: &str) -> Value {
        let info = ModuleInfo::unknown(src.to_string());
        let tokens = lexer::tokenize(info).unwrap();
        let module = parser::parse(tokens).unwrap();
        let env = Environment::new();
        crate::builtins::register(&env);
        eval_module(&module, &env).unwrap();
        env.get(name).unwrap()
    }

    #[test]
    fn arithmetic_assignment() {
        let v = run_and_get("x = 1 + 2 * 3;", "x");
        assert!(matches!(v, Value::Num(n) if n == 7.0));
    }

    #[test]
    fn if_else_branches() {
        let v = run_and_get("if (false) { x = 1; } else { x = 2; }", "x");
        assert!(matches!(v, Value::Num(n) if n == 2.0));
    }

    #[test]
    fn while_loop_accumulates() {
        let v = run_and_get("x = 0; i = 0; while (i < 5) { x = x + i; i = i + 1; }", "x");
        assert!(matches!(v, Value::Num(n) if n == 10.0));
    }

    #[test]
    fn break_skips_else_clause() {
        let v = run_and_get("x = 0; while (true) { break; } else { x = 99; }", "x");
        assert!(matches!(v, Value::Num(n) if n == 0.0));
    }

    #[test]
    fn function_call_and_return() {
        let v = run_and_get("func add(a, b) { return a + b; } x = add(2, 3);", "x");
        assert!(matches!(v, Value::Num(n) if n == 5.0));
    }

    #[test]
    fn closure_captures_defining_environment() {
        let v = run_and_get(
            "func make() { n = 10; func inner() { return n; } return inner; } f = make(); x = f();",
            "x",
        );
        assert!(matches!(v, Value::Num(n) if n == 10.0));
    }

    #[test]
    fn chained_comparison_short_circuits() {
        let v = run_and_get("x = 1 < 2 < 0;", "x");
        assert!(matches!(v, Value::Bool(false)));
    }

    #[test]
    fn break_outside_loop_is_rejected() {
        let err = run("break;").unwrap_err();
        assert!(matches!(err, CocktailError::Syntax { .. }));
    }

    #[test]
    fn return_outside_function_is_rejected() {
        let err = run("return 1;").unwrap_err();
        assert!(matches!(err, CocktailError::Syntax { .. }));
    }

    #[test]
    fn global_write_through() {
        let v = run_and_get("x = 1; func bump() { global x; x = x + 1; } bump(); bump();", "x");
        assert!(matches!(v, Value::Num(n) if n == 3.0));
    }

    #[test]
    fn list_indexing_and_slicing() {
        let v = run_and_get("xs = [1, 2, 3, 4, 5]; x = xs[1:3];", "x");
        match v {
            Value::List(items) => {
                let items = items.borrow();
                assert_eq!(items.len(), 2);
                assert!(matches!(items[0], Value::Num(n) if n == 2.0));
            }
            _ => panic!("expected a list"),
        }
    }

    #[test]
    fn exit_unwinds_to_module() {
        let result = run("print(1); exit(42);").unwrap();
        assert!(matches!(result, Some(Value::Num(n)) if n == 42.0));
    }
}
