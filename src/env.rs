// ABOUTME: Lexically-scoped binding environments shared between closures

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A frame of name→value bindings with an optional enclosing frame.
///
/// Frames are shared: every closure over a scope holds an `Rc` to the
/// same `Environment`, and the parent link is a strong reference so a
/// closure returned from a call keeps its definition scope alive. The
/// store needs interior mutability because `set` writes through those
/// shared handles.
#[derive(Debug)]
pub struct Environment {
    store: RefCell<HashMap<String, Value>>,
    outer: Option<Rc<Environment>>,
}

impl Environment {
    /// A fresh top-level environment.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            store: RefCell::new(HashMap::new()),
            outer: None,
        })
    }

    /// A child frame enclosing `outer`; used per function or macro
    /// invocation.
    pub fn new_enclosed(outer: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            store: RefCell::new(HashMap::new()),
            outer: Some(outer),
        })
    }

    /// Walks the frame chain outwards until the name resolves.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.store.borrow().get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.get(name))
    }

    /// Binds in this frame only; enclosing frames are never touched, so
    /// inner bindings shadow outer ones.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.store.borrow_mut().insert(name.into(), value);
    }
}
