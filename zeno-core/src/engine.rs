// zeno-core - Slot registry
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! The engine: a registry of named slot handlers.
//!
//! Hosts populate the registry before execution; the VM only reads it.
//! A slot is the script-visible unit of host capability (`log`,
//! `http.response`, `db.query` and friends), implemented by a handler
//! closure.

use std::collections::HashMap;
use std::rc::Rc;

use crate::context::ExecCtx;
use crate::error::Result;
use crate::node::Node;
use crate::scope::Scope;

/// A slot handler: invoked with the execution context, the invocation
/// node (slot name plus argument children in declaration order), and
/// the current scope. May mutate the scope and perform host effects.
pub type SlotHandler = Rc<dyn Fn(&ExecCtx<'_>, &Rc<Node>, &Scope) -> Result<()>>;

/// Optional metadata registered alongside a handler, surfaced by
/// tooling (documentation listings, editors).
#[derive(Debug, Clone, Default)]
pub struct SlotMeta {
    /// One-line description of what the slot does.
    pub description: String,
}

impl SlotMeta {
    /// Metadata with just a description.
    pub fn describe(description: impl Into<String>) -> Self {
        SlotMeta {
            description: description.into(),
        }
    }
}

struct SlotEntry {
    handler: SlotHandler,
    meta: SlotMeta,
}

/// The slot registry. Populated by the host before execution; read by
/// the VM during `CallSlot` dispatch.
#[derive(Default)]
pub struct Engine {
    registry: HashMap<String, SlotEntry>,
}

impl Engine {
    /// Create an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Engine {
            registry: HashMap::new(),
        }
    }

    /// Register a handler under `name`, replacing any previous
    /// registration.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl Fn(&ExecCtx<'_>, &Rc<Node>, &Scope) -> Result<()> + 'static,
        meta: SlotMeta,
    ) {
        self.registry.insert(
            name.into(),
            SlotEntry {
                handler: Rc::new(handler),
                meta,
            },
        );
    }

    /// Look up the handler for `name`.
    #[must_use]
    pub fn handler(&self, name: &str) -> Option<SlotHandler> {
        self.registry.get(name).map(|e| Rc::clone(&e.handler))
    }

    /// Look up the metadata for `name`.
    #[must_use]
    pub fn meta(&self, name: &str) -> Option<&SlotMeta> {
        self.registry.get(name).map(|e| &e.meta)
    }

    /// Names of all registered slots, unordered.
    #[must_use]
    pub fn slot_names(&self) -> Vec<&str> {
        self.registry.keys().map(String::as_str).collect()
    }
}
