// zeno-vm - Bytecode instruction definitions
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! Bytecode instruction definitions.
//!
//! Instructions operate on a value stack. The encoding is a one-byte
//! opcode followed by zero, one, or two one-byte operands; jump
//! instructions carry a two-byte big-endian relative offset.

/// Bytecode instructions for the Zeno VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Constants & literals
    // =========================================================================
    /// Push constant from the constant pool.
    Constant = 0,

    /// Push nil.
    Nil = 1,

    /// Push true.
    True = 2,

    /// Push false.
    False = 3,

    // =========================================================================
    // Scope variables
    // =========================================================================
    /// Look up a name (string constant) in the scope chain; push the
    /// hit wrapped as an object, or nil on miss.
    GetGlobal = 4,

    /// Pop a value and bind it under a name (string constant) in the
    /// current scope.
    SetGlobal = 5,

    // =========================================================================
    // Stack locals
    // =========================================================================
    /// Push the value at an absolute stack slot.
    GetLocal = 6,

    /// Write the top of stack (without popping) into an absolute stack
    /// slot, extending the live stack to cover it.
    SetLocal = 7,

    // =========================================================================
    // Arithmetic & comparison
    // =========================================================================
    /// Pop b, a; push a + b.
    Add = 8,

    /// Pop b, a; push a - b.
    Subtract = 9,

    /// Pop b, a; push a == b through native projection.
    Equal = 10,

    /// Pop b, a; push a != b through native projection.
    NotEqual = 11,

    /// Pop b, a; numeric compare a > b.
    Greater = 12,

    /// Pop b, a; numeric compare a >= b.
    GreaterEqual = 13,

    /// Pop b, a; numeric compare a < b.
    Less = 14,

    /// Pop b, a; numeric compare a <= b.
    LessEqual = 15,

    // =========================================================================
    // Control flow
    // =========================================================================
    /// Unconditional forward jump (u16 big-endian offset).
    Jump = 16,

    /// Pop the condition; jump forward when it is not truthy.
    JumpIfFalse = 17,

    /// Unconditional backward jump (u16 big-endian offset).
    Loop = 18,

    // =========================================================================
    // Dispatch
    // =========================================================================
    /// Invoke a slot handler. Operands: slot-name constant index, then
    /// argument count. The stack holds argc (name, value) pairs pushed
    /// in declaration order.
    CallSlot = 19,

    /// Synchronize named locals into the scope and halt.
    Return = 20,
}

/// Operand layout of an instruction, for decoding and disassembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    /// No operands.
    None,
    /// One byte: constant pool index.
    Const,
    /// One byte: absolute stack slot.
    Slot,
    /// Two bytes: big-endian relative jump offset.
    Jump,
    /// Two bytes: constant pool index, then argument count.
    ConstArgc,
}

impl OpCode {
    /// Decode an opcode byte.
    #[must_use]
    pub fn from_u8(byte: u8) -> Option<OpCode> {
        Some(match byte {
            0 => OpCode::Constant,
            1 => OpCode::Nil,
            2 => OpCode::True,
            3 => OpCode::False,
            4 => OpCode::GetGlobal,
            5 => OpCode::SetGlobal,
            6 => OpCode::GetLocal,
            7 => OpCode::SetLocal,
            8 => OpCode::Add,
            9 => OpCode::Subtract,
            10 => OpCode::Equal,
            11 => OpCode::NotEqual,
            12 => OpCode::Greater,
            13 => OpCode::GreaterEqual,
            14 => OpCode::Less,
            15 => OpCode::LessEqual,
            16 => OpCode::Jump,
            17 => OpCode::JumpIfFalse,
            18 => OpCode::Loop,
            19 => OpCode::CallSlot,
            20 => OpCode::Return,
            _ => return None,
        })
    }

    /// The instruction mnemonic.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OpCode::Constant => "Constant",
            OpCode::Nil => "Nil",
            OpCode::True => "True",
            OpCode::False => "False",
            OpCode::GetGlobal => "GetGlobal",
            OpCode::SetGlobal => "SetGlobal",
            OpCode::GetLocal => "GetLocal",
            OpCode::SetLocal => "SetLocal",
            OpCode::Add => "Add",
            OpCode::Subtract => "Subtract",
            OpCode::Equal => "Equal",
            OpCode::NotEqual => "NotEqual",
            OpCode::Greater => "Greater",
            OpCode::GreaterEqual => "GreaterEqual",
            OpCode::Less => "Less",
            OpCode::LessEqual => "LessEqual",
            OpCode::Jump => "Jump",
            OpCode::JumpIfFalse => "JumpIfFalse",
            OpCode::Loop => "Loop",
            OpCode::CallSlot => "CallSlot",
            OpCode::Return => "Return",
        }
    }

    /// The operand layout following the opcode byte.
    #[must_use]
    pub fn operands(self) -> Operands {
        match self {
            OpCode::Constant | OpCode::GetGlobal | OpCode::SetGlobal => Operands::Const,
            OpCode::GetLocal | OpCode::SetLocal => Operands::Slot,
            OpCode::Jump | OpCode::JumpIfFalse | OpCode::Loop => Operands::Jump,
            OpCode::CallSlot => Operands::ConstArgc,
            _ => Operands::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u8() {
        for byte in 0..=20u8 {
            let op = OpCode::from_u8(byte).expect("all opcode bytes decode");
            assert_eq!(op as u8, byte);
        }
        assert_eq!(OpCode::from_u8(21), None);
        assert_eq!(OpCode::from_u8(0xff), None);
    }

    #[test]
    fn operand_layouts() {
        assert_eq!(OpCode::Return.operands(), Operands::None);
        assert_eq!(OpCode::Constant.operands(), Operands::Const);
        assert_eq!(OpCode::SetLocal.operands(), Operands::Slot);
        assert_eq!(OpCode::JumpIfFalse.operands(), Operands::Jump);
        assert_eq!(OpCode::CallSlot.operands(), Operands::ConstArgc);
    }
}
