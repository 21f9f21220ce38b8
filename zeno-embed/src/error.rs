// zeno-embed - Embedding errors
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! Error type unifying the compile and run halves of the pipeline.

use std::fmt;

use zeno_vm::{CompileError, RuntimeError};

/// Result type for embedding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error from compiling or running a script.
#[derive(Debug, Clone)]
pub enum Error {
    /// The tree failed to compile.
    Compile(CompileError),
    /// The chunk failed at runtime (including handler errors).
    Runtime(RuntimeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Compile(err) => write!(f, "{}", err),
            Error::Runtime(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Compile(err) => Some(err),
            Error::Runtime(err) => Some(err),
        }
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Error::Compile(err)
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Error::Runtime(err)
    }
}
