//! The opaque per-node user-data slot shared by lexeme actions and production
//! actions.
//!
//! The source language models this as a bare `interface{}`/`any`; SPEC_FULL §3
//! asks for a sum type instead, so lexeme and production actions stay in safe,
//! typed Rust while still being able to stash an arbitrary host value for the
//! rare case none of the built-in variants fit.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// An erased value attached to an AST node.
#[derive(Clone)]
pub enum Value {
    /// No value has been attached yet (the default for a freshly created node).
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Escape hatch for host-defined data that doesn't fit the built-in
    /// variants.
    Box(Rc<dyn Any>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Unit
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "Unit"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Box(_) => write!(f, "Box(..)"),
        }
    }
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn downcast_box<T: 'static>(&self) -> Option<Rc<T>> {
        match self {
            Value::Box(b) => b.clone().downcast::<T>().ok(),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
