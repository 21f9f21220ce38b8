// zeno-embed - Embedding API for Zeno
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! # zeno-embed
//!
//! A high-level embedding API for the Zeno scripting engine.
//!
//! This crate wires the kernel crates together for hosts: environment
//! setup, the request-scoped run lifecycle, type conversion, and the
//! built-in slot vocabulary over the [`Host`](zeno_core::Host)
//! capability surface.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::rc::Rc;
//! use zeno_core::Node;
//! use zeno_embed::Runtime;
//! # use zeno_core::{ExecCtx, Host, Native, Result, Rows, ExecResult};
//! # struct MyHost;
//! # impl Host for MyHost {
//! #     fn log(&self, _: &str, _: &str) {}
//! #     fn db_query(&self, _: &ExecCtx<'_>, _: &str, _: &str, _: &[Native])
//! #         -> Result<Box<dyn Rows>> { unimplemented!() }
//! #     fn db_execute(&self, _: &ExecCtx<'_>, _: &str, _: &str, _: &[Native])
//! #         -> Result<Box<dyn ExecResult>> { unimplemented!() }
//! #     fn http_send_response(&self, _: &ExecCtx<'_>, _: u16, _: &str, _: &[u8]) -> Result<()> { Ok(()) }
//! #     fn http_get_header(&self, _: &ExecCtx<'_>, _: &str) -> Option<String> { None }
//! #     fn http_get_query(&self, _: &ExecCtx<'_>, _: &str) -> Option<String> { None }
//! #     fn http_get_body(&self, _: &ExecCtx<'_>) -> Result<Vec<u8>> { Ok(Vec::new()) }
//! # }
//!
//! let mut runtime = Runtime::new(Rc::new(MyHost));
//!
//! // http.response:
//! //   status: 201
//! //   body: "created"
//! let script = Node::new("http.response");
//! script.add_child(Node::with_value("status", "201"));
//! script.add_child(Node::with_value("body", "created"));
//!
//! let chunk = runtime.compile(&script).unwrap();
//! runtime.run(&chunk).unwrap();
//! ```
//!
//! ## Registering Custom Slots
//!
//! ```
//! # use std::rc::Rc;
//! # use zeno_core::{ExecCtx, Host, Native, Node, Result, Rows, ExecResult, SlotMeta};
//! # use zeno_embed::Runtime;
//! # struct NullHost;
//! # impl Host for NullHost {
//! #     fn log(&self, _: &str, _: &str) {}
//! #     fn db_query(&self, _: &ExecCtx<'_>, _: &str, _: &str, _: &[Native])
//! #         -> Result<Box<dyn Rows>> { Err(zeno_core::Error::host("db_query", "none")) }
//! #     fn db_execute(&self, _: &ExecCtx<'_>, _: &str, _: &str, _: &[Native])
//! #         -> Result<Box<dyn ExecResult>> { Err(zeno_core::Error::host("db_execute", "none")) }
//! #     fn http_send_response(&self, _: &ExecCtx<'_>, _: u16, _: &str, _: &[u8]) -> Result<()> { Ok(()) }
//! #     fn http_get_header(&self, _: &ExecCtx<'_>, _: &str) -> Option<String> { None }
//! #     fn http_get_query(&self, _: &ExecCtx<'_>, _: &str) -> Option<String> { None }
//! #     fn http_get_body(&self, _: &ExecCtx<'_>) -> Result<Vec<u8>> { Ok(Vec::new()) }
//! # }
//! let mut runtime = Runtime::new_bare(Rc::new(NullHost));
//! runtime.register_slot(
//!     "greet",
//!     |_ctx, node, scope| {
//!         let name = node
//!             .child("name")
//!             .and_then(|n| n.value().cloned())
//!             .unwrap_or(Native::str("world"));
//!         scope.set("greeting", format!("hello, {}", name));
//!         Ok(())
//!     },
//!     SlotMeta::describe("Bind a greeting"),
//! );
//! ```

mod convert;
mod error;
mod runtime;
mod slots;

pub use convert::{FromNative, IntoNative};
pub use error::{Error, Result};
pub use runtime::Runtime;
pub use slots::register_builtin_slots;

// Re-export the types hosts interact with.
pub use zeno_core::{
    CancelToken, Engine, ExecCtx, ExecResult, Host, Native, Node, Rows, Scope, SlotMeta,
};
pub use zeno_vm::{Chunk, Compiler, Vm, codec};
