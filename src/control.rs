// ABOUTME: The Flow sentinel that evaluator methods return to unwind loop/function scopes

use crate::value::Value;

/// Replaces the reference's node-identity-as-marker scheme (see the
/// Design Notes) with an explicit return type. Every `eval` returns a
/// `Flow<Value>`; loop and function drivers match on the variant instead
/// of inspecting AST node identity.
#[derive(Debug, Clone)]
pub enum Flow<V = Value> {
    /// Ordinary evaluation result; execution continues.
    Value(V),
    /// Unwinds to the nearest enclosing loop, which terminates it.
    Break,
    /// Unwinds to the nearest enclosing loop, which advances to the next iteration.
    Continue,
    /// Unwinds to the nearest enclosing function call, which returns `V`.
    Return(V),
    /// Unwinds everything up to the module driver, which halts the program.
    Exit(Option<V>),
}

impl<V> Flow<V> {
    pub fn value(v: V) -> Self {
        Flow::Value(v)
    }

    pub fn is_unwinding(&self) -> bool {
        !matches!(self, Flow::Value(_))
    }

    /// Extract the plain value, panicking if this is a control-flow
    /// marker. Callers must have already checked `is_unwinding`.
    pub fn into_value(self) -> V {
        match self {
            Flow::Value(v) => v,
            _ => unreachable!("into_value called on a control-flow marker"),
        }
    }
}

/// Propagate an unwinding `Flow` out of the current evaluation, or unwrap
/// a `Value` and keep going. `$e` must already be a plain `Flow<V>` (apply
/// `?` first if the callee returns `Result<Flow<V>, CocktailError>`); the
/// enclosing function must return `Result<Flow<V>, CocktailError>` since
/// the non-local-exit arm re-wraps in `Ok`.
#[macro_export]
macro_rules! flow_try {
    ($e:expr) => {
        match $e {
            $crate::control::Flow::Value(v) => v,
            other => return Ok(other),
        }
    };
}
