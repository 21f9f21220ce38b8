// zeno-core - Runtime substrate for the Zeno scripting engine
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! # zeno-core
//!
//! Runtime substrate for Zeno, a host-embeddable scripting engine whose
//! programs are trees of declarative slot invocations. This crate holds
//! everything the bytecode pipeline in `zeno-vm` and the host share:
//!
//! - [`Native`] - the heterogeneous host-level value
//! - [`Node`] - the script tree consumed by the compiler
//! - [`Scope`] - parent-linked variable environments
//! - [`Arena`] - request-scoped bump allocation
//! - [`Engine`] - the slot handler registry
//! - [`ExecCtx`] - the ambient execution context (engine reference,
//!   cancellation, opaque host values)
//! - [`Host`] - the capability surface handlers call into
//!
//! # Quick Start
//!
//! ```
//! use std::rc::Rc;
//! use zeno_core::{Engine, ExecCtx, Native, Node, Scope, SlotMeta};
//!
//! let mut engine = Engine::new();
//! engine.register(
//!     "greet",
//!     |_ctx, node, scope| {
//!         let name = node
//!             .child("name")
//!             .and_then(|n| n.value().cloned())
//!             .unwrap_or(Native::str("world"));
//!         scope.set("greeting", format!("hello, {}", name));
//!         Ok(())
//!     },
//!     SlotMeta::describe("Store a greeting in the scope"),
//! );
//!
//! let node = Node::new("greet");
//! node.add_child(Node::with_value("name", "zeno"));
//!
//! let scope = Scope::new(None);
//! let ctx = ExecCtx::new(&engine);
//! let handler = engine.handler("greet").unwrap();
//! handler(&ctx, &node, &scope).unwrap();
//!
//! assert_eq!(scope.get("greeting"), Some(Native::str("hello, zeno")));
//! ```

pub mod arena;
pub mod context;
pub mod engine;
pub mod error;
pub mod host;
pub mod node;
pub mod scope;
pub mod value;

pub use arena::{Arena, BufHandle};
pub use context::{CancelToken, ExecCtx};
pub use engine::{Engine, SlotHandler, SlotMeta};
pub use error::{Error, Result};
pub use host::{ExecResult, Host, Rows};
pub use node::Node;
pub use scope::Scope;
pub use value::Native;
