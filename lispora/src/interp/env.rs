//! Environment for variable bindings

use super::error::{InterpResult, RuntimeError};
use super::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Shared reference to an environment
pub type EnvRef = Rc<RefCell<Environment>>;

/// Environment holding variable bindings
#[derive(Debug, Default)]
pub struct Environment {
    /// Variable bindings in this scope
    bindings: HashMap<String, Value>,
    /// Enclosing scope. Non-owning: the outer environment always belongs to
    /// someone further up the call stack.
    parent: Option<Weak<RefCell<Environment>>>,
}

impl Environment {
    /// Create a new root environment
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
            parent: None,
        }
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn parent(&self) -> Option<EnvRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn set_parent(&mut self, parent: &EnvRef) {
        self.parent = Some(Rc::downgrade(parent));
    }

    /// Look up a variable in the scope chain, returning an independent copy.
    ///
    /// The chain grows with every nested call, so it is walked iteratively.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            return Some(value.clone());
        }

        let mut current = self.parent();
        while let Some(env) = current {
            let scope = env.borrow();
            if let Some(value) = scope.bindings.get(name) {
                return Some(value.clone());
            }
            current = scope.parent();
        }
        None
    }

    /// Like [`lookup`](Self::lookup), but an unbound name is an error
    pub fn get(&self, name: &str) -> InterpResult<Value> {
        self.lookup(name)
            .ok_or_else(|| RuntimeError::unbound_symbol(name))
    }

    /// Bind `name` in this scope, replacing any previous local binding
    pub fn put(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Deep-copy the bindings. The parent reference is shared, not copied.
    pub fn copy(&self) -> Environment {
        Environment {
            bindings: self.bindings.clone(),
            parent: self.parent.clone(),
        }
    }

}

/// Follow parent links up to the outermost environment
pub fn root_env(env: &EnvRef) -> EnvRef {
    let mut current = Rc::clone(env);
    loop {
        let parent = current.borrow().parent();
        match parent {
            Some(parent) => current = parent,
            None => return current,
        }
    }
}

/// Bind `name` in the root environment of `env`
pub fn define_global(env: &EnvRef, name: impl Into<String>, value: Value) {
    root_env(env).borrow_mut().put(name, value);
}
