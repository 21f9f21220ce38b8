// zeno-core - Host-level values shared between the engine and its host
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! The heterogeneous value type stored in node trees and scopes.
//!
//! `Native` is what slot handlers see: the host-side projection of a VM
//! stack value. The VM's own operand representation lives in `zeno-vm`;
//! `to_native` there produces one of these.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A host-level value: nil, bool, 64-bit float, string, or an opaque
/// host handle.
///
/// Cloning is cheap: strings and opaque handles are reference counted.
#[derive(Clone)]
pub enum Native {
    /// The absence of a value.
    Nil,
    /// A boolean.
    Bool(bool),
    /// A 64-bit float. All script numbers are floats.
    Num(f64),
    /// An immutable string.
    Str(Rc<str>),
    /// An opaque host handle (database rows, request objects, ...).
    Opaque(Rc<dyn Any>),
}

impl Native {
    /// Create a string value.
    pub fn str(s: impl AsRef<str>) -> Self {
        Native::Str(Rc::from(s.as_ref()))
    }

    /// Create an opaque host handle.
    pub fn opaque(obj: Rc<dyn Any>) -> Self {
        Native::Opaque(obj)
    }

    /// The numeric reading, if this value has one.
    #[must_use]
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Native::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// The string reading, if this value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Native::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean reading, if this value is a bool.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Native::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Type name for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Native::Nil => "nil",
            Native::Bool(_) => "bool",
            Native::Num(_) => "number",
            Native::Str(_) => "string",
            Native::Opaque(_) => "object",
        }
    }
}

impl PartialEq for Native {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Native::Nil, Native::Nil) => true,
            (Native::Bool(a), Native::Bool(b)) => a == b,
            (Native::Num(a), Native::Num(b)) => a == b,
            (Native::Str(a), Native::Str(b)) => a == b,
            // Opaque handles have identity, not structure.
            (Native::Opaque(a), Native::Opaque(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Native::Nil => write!(f, "Nil"),
            Native::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Native::Num(n) => f.debug_tuple("Num").field(n).finish(),
            Native::Str(s) => f.debug_tuple("Str").field(s).finish(),
            // Opaque payloads are host handles with no useful rendering.
            Native::Opaque(_) => write!(f, "Opaque(..)"),
        }
    }
}

impl fmt::Display for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Native::Nil => write!(f, "nil"),
            Native::Bool(b) => write!(f, "{}", b),
            Native::Num(n) => write!(f, "{}", n),
            Native::Str(s) => write!(f, "{}", s),
            Native::Opaque(_) => write!(f, "#<object>"),
        }
    }
}

impl From<bool> for Native {
    fn from(b: bool) -> Self {
        Native::Bool(b)
    }
}

impl From<f64> for Native {
    fn from(n: f64) -> Self {
        Native::Num(n)
    }
}

impl From<&str> for Native {
    fn from(s: &str) -> Self {
        Native::str(s)
    }
}

impl From<String> for Native {
    fn from(s: String) -> Self {
        Native::Str(Rc::from(s.as_str()))
    }
}
