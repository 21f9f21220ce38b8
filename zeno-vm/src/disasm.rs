// zeno-vm - Chunk disassembler
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! Human-readable rendering of compiled chunks, for debugging.

use std::fmt::Write;

use crate::chunk::Chunk;
use crate::opcode::{OpCode, Operands};

/// Render `chunk` one instruction per line: byte offset, mnemonic,
/// decoded operands, and constant values where an operand indexes the
/// pool.
#[must_use]
pub fn disassemble(chunk: &Chunk) -> String {
    let mut out = String::new();
    let mut ip = 0usize;

    while ip < chunk.code.len() {
        let offset = ip;
        let byte = chunk.code[ip];
        ip += 1;

        let Some(op) = OpCode::from_u8(byte) else {
            let _ = writeln!(out, "{:04} .byte {:#04x}", offset, byte);
            continue;
        };

        match op.operands() {
            Operands::None => {
                let _ = writeln!(out, "{:04} {}", offset, op.name());
            }
            Operands::Const => match read(chunk, &mut ip) {
                Some(idx) => {
                    let _ = writeln!(
                        out,
                        "{:04} {} {} ({})",
                        offset,
                        op.name(),
                        idx,
                        render_constant(chunk, idx)
                    );
                }
                None => return truncated(out, offset),
            },
            Operands::Slot => match read(chunk, &mut ip) {
                Some(slot) => {
                    let _ = writeln!(out, "{:04} {} {}", offset, op.name(), slot);
                }
                None => return truncated(out, offset),
            },
            Operands::Jump => match (read(chunk, &mut ip), read(chunk, &mut ip)) {
                (Some(hi), Some(lo)) => {
                    let distance = u16::from_be_bytes([hi, lo]);
                    let target = if op == OpCode::Loop {
                        ip.wrapping_sub(distance as usize)
                    } else {
                        ip + distance as usize
                    };
                    let _ = writeln!(out, "{:04} {} -> {:04}", offset, op.name(), target);
                }
                _ => return truncated(out, offset),
            },
            Operands::ConstArgc => match (read(chunk, &mut ip), read(chunk, &mut ip)) {
                (Some(idx), Some(argc)) => {
                    let _ = writeln!(
                        out,
                        "{:04} {} {} ({}) argc={}",
                        offset,
                        op.name(),
                        idx,
                        render_constant(chunk, idx),
                        argc
                    );
                }
                _ => return truncated(out, offset),
            },
        }
    }

    out
}

fn read(chunk: &Chunk, ip: &mut usize) -> Option<u8> {
    let byte = chunk.code.get(*ip).copied();
    *ip += 1;
    byte
}

fn render_constant(chunk: &Chunk, idx: u8) -> String {
    match chunk.constants.get(idx as usize) {
        Some(value) => value.to_string(),
        None => "<out of bounds>".to_string(),
    }
}

fn truncated(mut out: String, offset: usize) -> String {
    let _ = writeln!(out, "{:04} <truncated>", offset);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn renders_operands_and_constants() {
        let chunk = Chunk {
            code: vec![
                OpCode::Constant as u8,
                0,
                OpCode::Constant as u8,
                1,
                OpCode::Add as u8,
                OpCode::Return as u8,
            ],
            constants: vec![Value::Num(1.0), Value::Num(2.0)],
            local_names: vec![],
        };

        let text = disassemble(&chunk);
        assert!(text.contains("0000 Constant 0 (1)"));
        assert!(text.contains("0002 Constant 1 (2)"));
        assert!(text.contains("0004 Add"));
        assert!(text.contains("0005 Return"));
    }

    #[test]
    fn renders_jump_targets() {
        let mut chunk = Chunk::new();
        let operand = chunk.emit_jump(OpCode::JumpIfFalse);
        chunk.emit_op(OpCode::Nil);
        assert!(chunk.patch_jump(operand));
        chunk.emit_op(OpCode::Return);

        let text = disassemble(&chunk);
        assert!(text.contains("JumpIfFalse -> 0004"), "got: {}", text);
    }

    #[test]
    fn survives_garbage_bytes() {
        let chunk = Chunk {
            code: vec![0xfe, OpCode::Return as u8],
            constants: vec![],
            local_names: vec![],
        };
        let text = disassemble(&chunk);
        assert!(text.contains(".byte 0xfe"));
        assert!(text.contains("Return"));
    }
}
