// zeno-core - Execution context
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! The ambient execution context threaded through a VM run.
//!
//! `ExecCtx` carries the engine by reference, so slot resolution during
//! `CallSlot` is a plain field access. Host integrations attach their
//! own opaque values (the current HTTP exchange, a transaction handle)
//! under string keys; the VM never looks at those.
//!
//! Cancellation is cooperative: the VM does not poll the token, slot
//! handlers honor it at their own I/O boundaries and return
//! [`Error::Cancelled`](crate::Error::Cancelled).

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::Engine;

/// A shareable cancellation flag.
///
/// Clones observe the same flag, and the flag may be set from another
/// thread (a request timeout, a shutdown signal).
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The ambient context handed to the VM and on to slot handlers.
pub struct ExecCtx<'e> {
    engine: &'e Engine,
    cancel: CancelToken,
    values: HashMap<String, Rc<dyn Any>>,
}

impl<'e> ExecCtx<'e> {
    /// Create a context over `engine` with a fresh cancel token.
    #[must_use]
    pub fn new(engine: &'e Engine) -> Self {
        ExecCtx {
            engine,
            cancel: CancelToken::new(),
            values: HashMap::new(),
        }
    }

    /// Create a context sharing an existing cancel token.
    #[must_use]
    pub fn with_cancel(engine: &'e Engine, cancel: CancelToken) -> Self {
        ExecCtx {
            engine,
            cancel,
            values: HashMap::new(),
        }
    }

    /// The engine whose registry resolves slot names.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        self.engine
    }

    /// The cancellation token for this run.
    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Whether this run has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Attach an opaque host value under `key`. Builder-style.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: Rc<dyn Any>) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// The raw value attached under `key`, if any.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Rc<dyn Any>> {
        self.values.get(key)
    }

    /// The value attached under `key`, downcast to `T`.
    #[must_use]
    pub fn value_of<T: 'static>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }
}
