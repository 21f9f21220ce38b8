// zeno-embed - The Runtime facade
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! The `Runtime` struct - main entry point for embedding Zeno.

use std::rc::Rc;

use zeno_core::{Arena, CancelToken, Engine, ExecCtx, Host, Native, Node, Result as CoreResult,
                Scope, SlotMeta};
use zeno_vm::{Chunk, Compiler, Vm};

use crate::convert::{FromNative, IntoNative};
use crate::error::{Error, Result};
use crate::slots::register_builtin_slots;

/// Initial arena capacity; grows on demand and is retained across
/// requests.
const DEFAULT_ARENA_CAPACITY: usize = 64 * 1024;

/// The Zeno embedding runtime.
///
/// `Runtime` wires the pieces a host needs into one value: a slot
/// registry, a global scope, a request arena, and the host capability
/// surface. Compile trees once with [`Runtime::compile`], then execute
/// the chunk per request with [`Runtime::run`].
///
/// # Thread Safety
///
/// **`Runtime` is NOT thread-safe.** Scopes and nodes use `Rc` and
/// `RefCell` internally. Create one runtime per thread; chunks are
/// immutable and may be shared between them.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use zeno_core::{ExecCtx, Host, Native, Node, Result, Rows, ExecResult};
/// use zeno_embed::Runtime;
///
/// struct NullHost;
///
/// impl Host for NullHost {
///     fn log(&self, _level: &str, _message: &str) {}
///     fn db_query(&self, _: &ExecCtx<'_>, _: &str, _: &str, _: &[Native])
///         -> Result<Box<dyn Rows>> {
///         Err(zeno_core::Error::host("db_query", "no database"))
///     }
///     fn db_execute(&self, _: &ExecCtx<'_>, _: &str, _: &str, _: &[Native])
///         -> Result<Box<dyn ExecResult>> {
///         Err(zeno_core::Error::host("db_execute", "no database"))
///     }
///     fn http_send_response(&self, _: &ExecCtx<'_>, _: u16, _: &str, _: &[u8]) -> Result<()> {
///         Ok(())
///     }
///     fn http_get_header(&self, _: &ExecCtx<'_>, _: &str) -> Option<String> { None }
///     fn http_get_query(&self, _: &ExecCtx<'_>, _: &str) -> Option<String> { None }
///     fn http_get_body(&self, _: &ExecCtx<'_>) -> Result<Vec<u8>> { Ok(Vec::new()) }
/// }
///
/// let mut runtime = Runtime::new(Rc::new(NullHost));
/// let script = Node::with_value("$x", "1 + 2");
/// runtime.run_tree(&script).unwrap();
/// ```
pub struct Runtime {
    engine: Engine,
    globals: Scope,
    arena: Arena,
    host: Rc<dyn Host>,
    cancel: CancelToken,
}

impl Runtime {
    /// Create a runtime with the built-in slots registered.
    pub fn new(host: Rc<dyn Host>) -> Self {
        let mut runtime = Self::new_bare(Rc::clone(&host));
        register_builtin_slots(&mut runtime.engine, host);
        runtime
    }

    /// Create a runtime without the built-in slots.
    ///
    /// Useful for sandboxed environments or when the host provides its
    /// own slot vocabulary.
    pub fn new_bare(host: Rc<dyn Host>) -> Self {
        Runtime {
            engine: Engine::new(),
            globals: Scope::new(None),
            arena: Arena::new(DEFAULT_ARENA_CAPACITY),
            host,
            cancel: CancelToken::new(),
        }
    }

    /// Register a slot handler.
    pub fn register_slot(
        &mut self,
        name: impl Into<String>,
        handler: impl Fn(&ExecCtx<'_>, &Rc<Node>, &Scope) -> CoreResult<()> + 'static,
        meta: SlotMeta,
    ) {
        self.engine.register(name, handler, meta);
    }

    /// Compile a script tree into a chunk.
    pub fn compile(&self, node: &Rc<Node>) -> Result<Chunk> {
        Compiler::new().compile(node).map_err(Error::from)
    }

    /// Execute a chunk with the request-scoped lifecycle: a scope is
    /// allocated from the arena rooted at the globals, the chunk runs,
    /// and the arena is reset on every exit path.
    ///
    /// Variables the script binds live in the request scope and are
    /// discarded with it; effects reach the host through slots, and
    /// shared state belongs in [`Runtime::globals`].
    pub fn run(&mut self, chunk: &Chunk) -> Result<()> {
        let scope = self.arena.alloc_scope(Some(&self.globals));
        let ctx = ExecCtx::with_cancel(&self.engine, self.cancel.clone());
        let mut vm = Vm::new();
        let result = vm.run(&ctx, chunk, &scope);
        self.arena.reset();
        result.map_err(Error::from)
    }

    /// Execute a chunk against a caller-provided scope, without
    /// touching the arena. The caller owns the scope's lifetime.
    pub fn run_in(&self, chunk: &Chunk, scope: &Scope) -> Result<()> {
        let ctx = ExecCtx::with_cancel(&self.engine, self.cancel.clone());
        let mut vm = Vm::new();
        vm.run(&ctx, chunk, scope).map_err(Error::from)
    }

    /// Compile and execute a script tree with the request lifecycle.
    pub fn run_tree(&mut self, node: &Rc<Node>) -> Result<()> {
        let chunk = self.compile(node)?;
        self.run(&chunk)
    }

    /// Bind a value in the global scope.
    pub fn set(&self, name: impl Into<String>, value: impl IntoNative) {
        self.globals.set(name, value.into_native());
    }

    /// Read a global as a Rust type. `None` when unbound or of the
    /// wrong type.
    #[must_use]
    pub fn get_as<T: FromNative>(&self, name: &str) -> Option<T> {
        self.globals
            .get(name)
            .and_then(|v| T::from_native(&v).ok())
    }

    /// Read a raw global value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Native> {
        self.globals.get(name)
    }

    /// The global scope shared by all runs.
    #[must_use]
    pub fn globals(&self) -> &Scope {
        &self.globals
    }

    /// The slot registry.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The host this runtime was built over.
    #[must_use]
    pub fn host(&self) -> &Rc<dyn Host> {
        &self.host
    }

    /// A token that cancels in-flight handler I/O for this runtime's
    /// runs. Clones observe the same flag.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Arena usage, `(used bytes, capacity)`. Used bytes are zero
    /// between requests.
    #[must_use]
    pub fn arena_stats(&self) -> (usize, usize) {
        self.arena.stats()
    }
}

// Default is intentionally not implemented: a Runtime without a Host
// cannot do anything useful, and which host to use is the embedder's
// decision.
