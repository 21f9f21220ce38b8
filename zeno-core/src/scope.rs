// zeno-core - Lexical scopes
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! Lexical variable scopes with parent-chain lookup.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Native;

/// A parent-linked variable scope.
///
/// Lookup walks the chain from child to parent and returns the first
/// hit. Assignment always writes to the current scope; parent bindings
/// are never rebound through a child.
///
/// Scopes are not thread-safe: a scope chain belongs to a single VM run
/// or request at a time.
///
/// # Examples
///
/// ```
/// use zeno_core::{Native, Scope};
///
/// let globals = Scope::new(None);
/// globals.set("x", 10.0);
///
/// let request = globals.child();
/// assert_eq!(request.get("x"), Some(Native::Num(10.0)));
///
/// // Writes stay local to the request scope.
/// request.set("x", 20.0);
/// assert_eq!(globals.get("x"), Some(Native::Num(10.0)));
/// ```
#[derive(Debug, Clone)]
pub struct Scope {
    inner: Rc<RefCell<ScopeInner>>,
}

#[derive(Debug)]
struct ScopeInner {
    bindings: HashMap<String, Native>,
    parent: Option<Scope>,
}

impl Scope {
    /// Create a scope, optionally chained to a parent.
    pub fn new(parent: Option<&Scope>) -> Self {
        Scope {
            inner: Rc::new(RefCell::new(ScopeInner {
                bindings: HashMap::new(),
                parent: parent.cloned(),
            })),
        }
    }

    /// Create a child scope with `self` as parent.
    #[must_use]
    pub fn child(&self) -> Self {
        Scope::new(Some(self))
    }

    /// Bind `key` in this scope, overwriting any prior local binding.
    /// Parent bindings are unaffected.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Native>) {
        self.inner
            .borrow_mut()
            .bindings
            .insert(key.into(), value.into());
    }

    /// Look up `key` in this scope or the parent chain.
    /// Iterative traversal, so deep chains cannot overflow the stack.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Native> {
        let mut current = self.clone();
        loop {
            let inner = current.inner.borrow();
            if let Some(val) = inner.bindings.get(key) {
                return Some(val.clone());
            }
            let parent = inner.parent.clone();
            drop(inner);
            match parent {
                Some(p) => current = p,
                None => return None,
            }
        }
    }

    /// Whether `key` is bound in this scope or any parent.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The parent scope, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Scope> {
        self.inner.borrow().parent.clone()
    }

    /// Whether two handles refer to the same scope.
    #[must_use]
    pub fn same(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new(None)
    }
}
