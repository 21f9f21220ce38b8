// zeno-vm - Runtime errors
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! Runtime errors for the VM.

use std::fmt;

/// Runtime error during VM execution.
///
/// All runtime failures halt the VM and propagate to the caller of
/// `run`; nothing is retried inside the kernel.
#[derive(Debug, Clone)]
pub enum RuntimeError {
    /// Push onto a full operand stack.
    StackOverflow,
    /// Pop or peek past the bottom of the stack.
    StackUnderflow,
    /// An opcode byte outside the instruction set.
    UnknownOpcode(u8),
    /// The instruction stream ended inside an instruction.
    TruncatedCode,
    /// A constant operand past the end of the pool.
    ConstantOutOfBounds(u8),
    /// A local slot operand past the live stack.
    LocalOutOfBounds(u8),
    /// An operand of the wrong type for an opcode.
    Operand {
        op: &'static str,
        expected: &'static str,
        got: &'static str,
    },
    /// `CallSlot` named a slot with no registered handler.
    SlotNotFound(String),
    /// A slot handler failed; the handler's error is carried verbatim.
    Handler(zeno_core::Error),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::StackOverflow => write!(f, "Stack overflow"),
            RuntimeError::StackUnderflow => write!(f, "Stack underflow"),
            RuntimeError::UnknownOpcode(byte) => write!(f, "Unsupported opcode: {}", byte),
            RuntimeError::TruncatedCode => write!(f, "Instruction stream truncated"),
            RuntimeError::ConstantOutOfBounds(idx) => {
                write!(f, "Constant index {} out of bounds", idx)
            }
            RuntimeError::LocalOutOfBounds(idx) => {
                write!(f, "Local slot {} out of bounds", idx)
            }
            RuntimeError::Operand { op, expected, got } => {
                write!(f, "{}: expected {} operand, got {}", op, expected, got)
            }
            RuntimeError::SlotNotFound(name) => write!(f, "slot not found: {}", name),
            RuntimeError::Handler(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Handler(err) => Some(err),
            _ => None,
        }
    }
}

impl From<zeno_core::Error> for RuntimeError {
    fn from(err: zeno_core::Error) -> Self {
        RuntimeError::Handler(err)
    }
}

/// Result type for VM operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
