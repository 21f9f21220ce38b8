// zeno-vm - Stack-based virtual machine
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! The stack-based virtual machine.
//!
//! A [`Vm`] executes one [`Chunk`] at a time against a [`Scope`] and
//! the slot registry reachable through the [`ExecCtx`]. Each run is
//! single-frame and runs to completion, a fatal error, or an error
//! returned by a slot handler. The VM performs no I/O and never checks
//! cancellation; both are handler concerns.
//!
//! Multiple VMs may run in parallel, each with its own stack and scope
//! chain; a scope must not be shared between concurrently running VMs.

pub mod error;
pub mod stack;

use std::rc::Rc;

use zeno_core::{ExecCtx, Node, Scope};

use crate::chunk::Chunk;
use crate::opcode::OpCode;
use crate::value::Value;

pub use error::{Result, RuntimeError};
pub use stack::{STACK_MAX, ValueStack};

/// The bytecode execution engine.
#[derive(Default, Debug)]
pub struct Vm {
    stack: ValueStack,
}

impl Vm {
    /// Create a VM with an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Vm {
            stack: ValueStack::new(),
        }
    }

    /// Execute `chunk` against `scope`. The stack and instruction
    /// pointer are reset first, so a VM can be reused across runs.
    pub fn run(&mut self, ctx: &ExecCtx<'_>, chunk: &Chunk, scope: &Scope) -> Result<()> {
        self.stack.clear();
        let mut ip = 0usize;

        loop {
            let byte = read_byte(chunk, &mut ip)?;
            let op = OpCode::from_u8(byte).ok_or(RuntimeError::UnknownOpcode(byte))?;

            match op {
                OpCode::Return => {
                    self.sync_locals(chunk, scope);
                    return Ok(());
                }

                OpCode::Constant => {
                    let constant = read_constant(chunk, &mut ip)?;
                    self.stack.push(constant)?;
                }
                OpCode::Nil => self.stack.push(Value::Nil)?,
                OpCode::True => self.stack.push(Value::Bool(true))?,
                OpCode::False => self.stack.push(Value::Bool(false))?,

                OpCode::GetGlobal => {
                    let name = read_string_constant(chunk, &mut ip, "GetGlobal")?;
                    match scope.get(&name) {
                        Some(native) => self.stack.push(Value::Obj(native))?,
                        None => self.stack.push(Value::Nil)?,
                    }
                }
                OpCode::SetGlobal => {
                    let name = read_string_constant(chunk, &mut ip, "SetGlobal")?;
                    let value = self.stack.pop()?;
                    scope.set(name.as_ref(), value.to_native());
                }

                OpCode::GetLocal => {
                    let index = read_byte(chunk, &mut ip)?;
                    let value = self
                        .stack
                        .get(index as usize)
                        .map_err(|_| RuntimeError::LocalOutOfBounds(index))?;
                    self.stack.push(value)?;
                }
                OpCode::SetLocal => {
                    let index = read_byte(chunk, &mut ip)?;
                    let value = self.stack.peek(0)?;
                    self.stack.set_grow(index as usize, value)?;
                }

                OpCode::Add => self.binary_num(op, |a, b| Value::Num(a + b))?,
                OpCode::Subtract => self.binary_num(op, |a, b| Value::Num(a - b))?,

                OpCode::Equal => {
                    let b = self.stack.pop()?;
                    let a = self.stack.pop()?;
                    self.stack.push(Value::Bool(a.native_eq(&b)))?;
                }
                OpCode::NotEqual => {
                    let b = self.stack.pop()?;
                    let a = self.stack.pop()?;
                    self.stack.push(Value::Bool(!a.native_eq(&b)))?;
                }

                OpCode::Greater => self.binary_num(op, |a, b| Value::Bool(a > b))?,
                OpCode::GreaterEqual => self.binary_num(op, |a, b| Value::Bool(a >= b))?,
                OpCode::Less => self.binary_num(op, |a, b| Value::Bool(a < b))?,
                OpCode::LessEqual => self.binary_num(op, |a, b| Value::Bool(a <= b))?,

                OpCode::Jump => {
                    let offset = read_short(chunk, &mut ip)?;
                    ip += offset as usize;
                }
                OpCode::JumpIfFalse => {
                    let offset = read_short(chunk, &mut ip)?;
                    let condition = self.stack.pop()?;
                    if !condition.is_truthy() {
                        ip += offset as usize;
                    }
                }
                OpCode::Loop => {
                    let offset = read_short(chunk, &mut ip)?;
                    ip = ip
                        .checked_sub(offset as usize)
                        .ok_or(RuntimeError::TruncatedCode)?;
                }

                OpCode::CallSlot => self.call_slot(ctx, chunk, &mut ip, scope)?,
            }
        }
    }

    /// The current top of the operand stack. After a run ending in
    /// `Return`, this is the run's residual value, if any.
    #[must_use]
    pub fn top(&self) -> Option<&Value> {
        self.stack.top()
    }

    /// Project the named bottom stack slots into the scope. Performed
    /// before every slot call and on return, so bytecode locals are
    /// observable to host handlers.
    fn sync_locals(&self, chunk: &Chunk, scope: &Scope) {
        let slots = self.stack.as_slice();
        for (i, name) in chunk.local_names.iter().enumerate() {
            if let Some(value) = slots.get(i) {
                scope.set(name.as_str(), value.to_native());
            }
        }
    }

    /// Dispatch a slot invocation.
    ///
    /// The stack holds argc (name, value) pairs pushed in declaration
    /// order. The handler is resolved before any popping, so an
    /// unregistered slot fails without touching scope or host state.
    fn call_slot(
        &mut self,
        ctx: &ExecCtx<'_>,
        chunk: &Chunk,
        ip: &mut usize,
        scope: &Scope,
    ) -> Result<()> {
        let slot_name = read_string_constant(chunk, ip, "CallSlot")?;
        let argc = read_byte(chunk, ip)? as usize;

        let handler = ctx
            .engine()
            .handler(&slot_name)
            .ok_or_else(|| RuntimeError::SlotNotFound(slot_name.to_string()))?;

        // Pop pairs in reverse so declaration order is preserved.
        let mut reversed: Vec<Rc<Node>> = Vec::with_capacity(argc);
        for _ in 0..argc {
            let value = self.stack.pop()?;
            let name = match self.stack.pop()? {
                Value::Str(s) => s,
                other => {
                    return Err(RuntimeError::Operand {
                        op: "CallSlot",
                        expected: "string",
                        got: other.type_name(),
                    });
                }
            };
            reversed.push(Node::with_value(name.as_ref(), value.to_native()));
        }

        let node = Node::new(slot_name.as_ref());
        for child in reversed.into_iter().rev() {
            node.add_child(child);
        }

        self.sync_locals(chunk, scope);

        handler(ctx, &node, scope).map_err(RuntimeError::Handler)
    }

    fn binary_num(&mut self, op: OpCode, apply: impl Fn(f64, f64) -> Value) -> Result<()> {
        let b = self.stack.pop()?;
        let a = self.stack.pop()?;
        let (a, b) = match (a.as_num(), b.as_num()) {
            (Some(a), Some(b)) => (a, b),
            (None, _) => {
                return Err(RuntimeError::Operand {
                    op: op.name(),
                    expected: "number",
                    got: a.type_name(),
                });
            }
            (_, None) => {
                return Err(RuntimeError::Operand {
                    op: op.name(),
                    expected: "number",
                    got: b.type_name(),
                });
            }
        };
        self.stack.push(apply(a, b))
    }
}

fn read_byte(chunk: &Chunk, ip: &mut usize) -> Result<u8> {
    let byte = *chunk.code.get(*ip).ok_or(RuntimeError::TruncatedCode)?;
    *ip += 1;
    Ok(byte)
}

fn read_short(chunk: &Chunk, ip: &mut usize) -> Result<u16> {
    let hi = read_byte(chunk, ip)?;
    let lo = read_byte(chunk, ip)?;
    Ok(u16::from_be_bytes([hi, lo]))
}

fn read_constant(chunk: &Chunk, ip: &mut usize) -> Result<Value> {
    let index = read_byte(chunk, ip)?;
    chunk
        .constants
        .get(index as usize)
        .cloned()
        .ok_or(RuntimeError::ConstantOutOfBounds(index))
}

fn read_string_constant(chunk: &Chunk, ip: &mut usize, op: &'static str) -> Result<Rc<str>> {
    match read_constant(chunk, ip)? {
        Value::Str(s) => Ok(s),
        other => Err(RuntimeError::Operand {
            op,
            expected: "string",
            got: other.type_name(),
        }),
    }
}
