// zeno-core - Error types for slot handlers and the host surface
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! Error types for slot handlers and host capabilities.
//!
//! These are the errors a slot handler can return to the VM; the VM
//! propagates them verbatim to the caller of `run`. Compilation and
//! bytecode-execution errors have their own types in `zeno-vm`.

use std::fmt;

/// Result type for handler and host operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by slot handlers and host capabilities.
#[derive(Debug, Clone)]
pub enum Error {
    /// Wrong value type for an operation.
    Type {
        expected: &'static str,
        got: String,
        context: Option<String>,
    },
    /// A slot was invoked without a required argument.
    MissingArgument { slot: String, argument: String },
    /// A host capability failed.
    Host {
        operation: &'static str,
        message: String,
    },
    /// An I/O failure (file operations, request bodies, ...).
    Io {
        operation: &'static str,
        path: Option<String>,
        message: String,
    },
    /// The execution context was cancelled.
    Cancelled,
    /// A slot-specific failure.
    Slot { slot: String, message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Type {
                expected,
                got,
                context,
            } => {
                if let Some(ctx) = context {
                    write!(f, "{}: expected {}, got {}", ctx, expected, got)
                } else {
                    write!(f, "Type error: expected {}, got {}", expected, got)
                }
            }
            Error::MissingArgument { slot, argument } => {
                write!(f, "Slot '{}' requires argument '{}'", slot, argument)
            }
            Error::Host { operation, message } => {
                write!(f, "Host error in {}: {}", operation, message)
            }
            Error::Io {
                operation,
                path,
                message,
            } => {
                if let Some(path) = path {
                    write!(f, "{} '{}': {}", operation, path, message)
                } else {
                    write!(f, "{}: {}", operation, message)
                }
            }
            Error::Cancelled => write!(f, "Execution cancelled"),
            Error::Slot { slot, message } => {
                write!(f, "Slot '{}' failed: {}", slot, message)
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create a type error.
    pub fn type_error(expected: &'static str, got: impl Into<String>) -> Self {
        Error::Type {
            expected,
            got: got.into(),
            context: None,
        }
    }

    /// Create a type error with context.
    pub fn type_error_in(
        context: impl Into<String>,
        expected: &'static str,
        got: impl Into<String>,
    ) -> Self {
        Error::Type {
            expected,
            got: got.into(),
            context: Some(context.into()),
        }
    }

    /// Create a missing-argument error.
    pub fn missing_argument(slot: impl Into<String>, argument: impl Into<String>) -> Self {
        Error::MissingArgument {
            slot: slot.into(),
            argument: argument.into(),
        }
    }

    /// Create a host capability error.
    pub fn host(operation: &'static str, message: impl Into<String>) -> Self {
        Error::Host {
            operation,
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`.
    pub fn io(operation: &'static str, path: Option<String>, error: std::io::Error) -> Self {
        Error::Io {
            operation,
            path,
            message: error.to_string(),
        }
    }

    /// Create a slot failure.
    pub fn slot(slot: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Slot {
            slot: slot.into(),
            message: message.into(),
        }
    }
}
