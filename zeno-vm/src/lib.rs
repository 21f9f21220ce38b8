// zeno-vm - Bytecode compiler and virtual machine for the Zeno scripting engine
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! # zeno-vm
//!
//! Bytecode pipeline for Zeno: a tree-to-bytecode [`Compiler`], a
//! portable [`Chunk`] container with a binary [`codec`], and a
//! stack-based [`Vm`] that executes chunks against a scope and the
//! host's slot registry.
//!
//! # Quick Start
//!
//! ```
//! use zeno_core::{Engine, ExecCtx, Native, Node, Scope};
//! use zeno_vm::{Compiler, Vm};
//!
//! // $x: 10
//! let node = Node::with_value("$x", "10");
//! let chunk = Compiler::new().compile(&node).unwrap();
//!
//! let engine = Engine::new();
//! let scope = Scope::new(None);
//! let mut vm = Vm::new();
//! vm.run(&ExecCtx::new(&engine), &chunk, &scope).unwrap();
//!
//! assert_eq!(scope.get("x"), Some(Native::Num(10.0)));
//! ```

pub mod chunk;
pub mod codec;
pub mod compiler;
pub mod disasm;
pub mod opcode;
pub mod value;
pub mod vm;

pub use chunk::Chunk;
pub use compiler::{CompileError, Compiler};
pub use opcode::{OpCode, Operands};
pub use value::Value;
pub use vm::{RuntimeError, STACK_MAX, Vm};
