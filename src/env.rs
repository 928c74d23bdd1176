// ABOUTME: Lexical-scope environments with insertion-order-preserving bindings

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{name_error, CocktailError};
use crate::module_info::ModuleInfo;
use crate::token::Token;
use crate::value::Value;

/// Which enclosing frame a `global`/`nonlocal` declaration redirects
/// subsequent plain assignment of a name to, instead of defining it
/// fresh in the current (function) scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Global,
    Nonlocal,
}

/// One flat mapping per lexical scope, insertion order preserved so later
/// shadowing rewrites the slot in place rather than reordering it.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<IndexMap<String, Value>>,
    parent: Option<Rc<Environment>>,
    redirected: RefCell<std::collections::HashMap<String, Redirect>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(IndexMap::new()),
            parent: None,
            redirected: RefCell::new(std::collections::HashMap::new()),
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(IndexMap::new()),
            parent: Some(parent),
            redirected: RefCell::new(std::collections::HashMap::new()),
        })
    }

    /// Records that `name`, when next assigned in this scope, should write
    /// through to the frame `global`/`nonlocal` designates rather than
    /// define a fresh local slot.
    pub fn mark_redirected(&self, name: impl Into<String>, kind: Redirect) {
        self.redirected.borrow_mut().insert(name.into(), kind);
    }

    pub fn redirect_of(&self, name: &str) -> Option<Redirect> {
        self.redirected.borrow().get(name).copied()
    }

    /// Defines or rewrites a binding in THIS scope (doesn't walk parent chain).
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Looks up a name in this scope and parent scopes recursively.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    /// Loads a name, turning a miss into a NameError at `token`.
    pub fn load(&self, name: &str, info: Rc<ModuleInfo>, token: Option<Token>) -> Result<Value, CocktailError> {
        self.get(name)
            .ok_or_else(|| name_error(info, token, format!("name '{}' is not found", name)))
    }

    /// Writes through to whichever frame already binds `name`, walking the
    /// parent chain; if no frame binds it, defines it in this frame. Used
    /// by ordinary assignment (which defines in the current scope) is NOT
    /// this method — see `assign`. This one backs `Global`/`Nonlocal`
    /// write-through semantics.
    pub fn set(&self, name: &str, value: Value) -> bool {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return true;
        }
        match &self.parent {
            Some(parent) => parent.set(name, value),
            None => false,
        }
    }

    /// Plain assignment: defines/rewrites the binding in the current
    /// scope, per §3's "one flat mapping per scope" rule (assignment does
    /// not implicitly write through to an enclosing scope).
    pub fn assign(&self, name: impl Into<String>, value: Value) {
        self.define(name, value);
    }

    pub fn parent(&self) -> Option<&Rc<Environment>> {
        self.parent.as_ref()
    }

    /// Walk to the outermost (module) frame. Used by `Global`.
    pub fn root(self: &Rc<Self>) -> Rc<Environment> {
        let mut current = Rc::clone(self);
        while let Some(parent) = current.parent.clone() {
            current = parent;
        }
        current
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.bindings.borrow().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("x", Value::Num(42.0));
        match env.get("x") {
            Some(Value::Num(n)) => assert_eq!(n, 42.0),
            _ => panic!("expected Num(42.0)"),
        }
    }

    #[test]
    fn undefined_name_is_none() {
        let env = Environment::new();
        assert!(env.get("undefined").is_none());
    }

    #[test]
    fn shadowing_rewrites_slot_in_place() {
        let parent = Environment::new();
        parent.define("x", Value::Num(1.0));
        parent.define("y", Value::Num(2.0));
        parent.define("x", Value::Num(3.0));
        let keys: Vec<_> = parent.bindings.borrow().keys().cloned().collect();
        assert_eq!(keys, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn child_shadows_parent() {
        let parent = Environment::new();
        parent.define("x", Value::Num(42.0));
        let child = Environment::with_parent(parent);
        child.define("x", Value::Num(100.0));
        match child.get("x") {
            Some(Value::Num(n)) => assert_eq!(n, 100.0),
            _ => panic!("expected Num(100.0)"),
        }
    }

    #[test]
    fn parent_lookup_through_chain() {
        let grandparent = Environment::new();
        grandparent.define("a", Value::Num(1.0));
        let parent = Environment::with_parent(grandparent);
        parent.define("b", Value::Num(2.0));
        let child = Environment::with_parent(parent);
        child.define("c", Value::Num(3.0));

        assert!(matches!(child.get("a"), Some(Value::Num(n)) if n == 1.0));
        assert!(matches!(child.get("b"), Some(Value::Num(n)) if n == 2.0));
        assert!(matches!(child.get("c"), Some(Value::Num(n)) if n == 3.0));
    }

    #[test]
    fn set_writes_through_to_defining_frame() {
        let parent = Environment::new();
        parent.define("x", Value::Num(1.0));
        let child = Environment::with_parent(parent.clone());
        assert!(child.set("x", Value::Num(9.0)));
        assert!(matches!(parent.get("x"), Some(Value::Num(n)) if n == 9.0));
        assert!(!child.contains_local("x"));
    }
}
