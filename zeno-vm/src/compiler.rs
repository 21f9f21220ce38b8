// zeno-vm - Tree-to-bytecode compiler
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! Lowers a script node tree into a bytecode [`Chunk`].
//!
//! Nodes compile in pre-order. A node is one of:
//!
//! - a variable binding (`$name` with a value expression),
//! - an `if` conditional (condition in the value, `then`/`else`
//!   children holding the branch bodies),
//! - a slot invocation (any other named node; children become named
//!   arguments in declaration order),
//! - a structural node (`root` or unnamed; children compile in order).
//!
//! Value expressions recognize `$`-references, numeric literals,
//! quoted and bare strings, and a minimal three-token infix form
//! (`$x == 10`, `1 + 2`). The compiled chunk always ends in `Return`.

use std::fmt;
use std::rc::Rc;

use zeno_core::{Native, Node};

use crate::chunk::Chunk;
use crate::opcode::OpCode;
use crate::value::Value;

/// Error during compilation.
#[derive(Debug, Clone)]
pub enum CompileError {
    /// Malformed expression or unsupported node shape.
    Syntax { node: String, message: String },
    /// Constant pool overflow.
    TooManyConstants,
    /// A slot invocation with more children than an argument-count
    /// byte can carry.
    TooManyArguments { slot: String, count: usize },
    /// A branch body too large for a 16-bit jump offset.
    JumpTooFar,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Syntax { node, message } => {
                write!(f, "Syntax error in node '{}': {}", node, message)
            }
            CompileError::TooManyConstants => write!(f, "Too many constants in chunk"),
            CompileError::TooManyArguments { slot, count } => {
                write!(f, "Slot '{}' has {} arguments; at most 255 fit", slot, count)
            }
            CompileError::JumpTooFar => write!(f, "Jump offset exceeds 16 bits"),
        }
    }
}

impl std::error::Error for CompileError {}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Infix operators recognized inside value strings.
const OPERATORS: &[(&str, OpCode)] = &[
    ("+", OpCode::Add),
    ("-", OpCode::Subtract),
    ("==", OpCode::Equal),
    ("!=", OpCode::NotEqual),
    (">", OpCode::Greater),
    (">=", OpCode::GreaterEqual),
    ("<", OpCode::Less),
    ("<=", OpCode::LessEqual),
];

/// The tree-to-bytecode compiler.
#[derive(Default)]
pub struct Compiler {
    chunk: Chunk,
}

impl Compiler {
    /// Create a compiler with an empty chunk.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a node tree into a chunk ending in `Return`.
    pub fn compile(mut self, node: &Rc<Node>) -> Result<Chunk> {
        self.compile_node(node)?;
        self.chunk.emit_op(OpCode::Return);
        Ok(self.chunk)
    }

    fn compile_node(&mut self, node: &Rc<Node>) -> Result<()> {
        let name = node.name();

        // $name: value
        if let Some(var) = name.strip_prefix('$') {
            self.compile_expr(node)?;
            self.emit_with_const(OpCode::SetGlobal, Value::str(var))?;
            return Ok(());
        }

        // if: condition, with then/else children
        if name == "if" {
            return self.compile_if(node);
        }

        // A bare infix expression carried in the value.
        if let Some(Native::Str(s)) = node.value() {
            if let Some(expr) = InfixExpr::recognize(s) {
                return self.compile_infix(node, &expr);
            }
        }

        // Any other named node invokes a slot.
        if !name.is_empty() && name != "root" {
            return self.compile_slot_call(node);
        }

        // Structural node: children in declaration order.
        for child in node.children() {
            self.compile_node(&child)?;
        }
        Ok(())
    }

    /// Compile the value expression of a node: infix if recognized,
    /// plain value otherwise.
    fn compile_expr(&mut self, node: &Rc<Node>) -> Result<()> {
        if let Some(Native::Str(s)) = node.value() {
            if let Some(expr) = InfixExpr::recognize(s) {
                return self.compile_infix(node, &expr);
            }
        }
        self.compile_value(node.value())
    }

    fn compile_if(&mut self, node: &Rc<Node>) -> Result<()> {
        if node.value().is_none() {
            return Err(self.syntax(node, "'if' requires a condition value"));
        }
        self.compile_expr(node)?;

        let else_jump = self.chunk.emit_jump(OpCode::JumpIfFalse);

        let then = node
            .child("then")
            .ok_or_else(|| self.syntax(node, "'if' requires a 'then' child"))?;
        for child in then.children() {
            self.compile_node(&child)?;
        }

        let end_jump = self.chunk.emit_jump(OpCode::Jump);
        self.patch_jump(else_jump)?;

        if let Some(els) = node.child("else") {
            for child in els.children() {
                self.compile_node(&child)?;
            }
        }
        self.patch_jump(end_jump)?;
        Ok(())
    }

    fn compile_infix(&mut self, node: &Rc<Node>, expr: &InfixExpr<'_>) -> Result<()> {
        self.compile_operand(node, expr.lhs)?;
        self.compile_operand(node, expr.rhs)?;
        self.chunk.emit_op(expr.op);
        Ok(())
    }

    /// An infix operand: a `$`-reference or a numeric literal.
    fn compile_operand(&mut self, node: &Rc<Node>, token: &str) -> Result<()> {
        if let Some(var) = token.strip_prefix('$') {
            return self.emit_with_const(OpCode::GetGlobal, Value::str(var));
        }
        match token.parse::<f64>() {
            Ok(n) => self.emit_with_const(OpCode::Constant, Value::Num(n)),
            Err(_) => Err(self.syntax(node, format!("invalid numeric operand '{}'", token))),
        }
    }

    fn compile_slot_call(&mut self, node: &Rc<Node>) -> Result<()> {
        let children = node.children();
        if children.len() > u8::MAX as usize {
            return Err(CompileError::TooManyArguments {
                slot: node.name().to_string(),
                count: children.len(),
            });
        }

        // Each argument is a (name, value) pair pushed in declaration
        // order; the VM rebuilds them into a node for the handler.
        for child in &children {
            self.emit_with_const(OpCode::Constant, Value::str(child.name()))?;
            self.compile_value(child.value())?;
        }

        let name_idx = self
            .chunk
            .add_constant(Value::str(node.name()))
            .ok_or(CompileError::TooManyConstants)?;
        self.chunk.emit_op(OpCode::CallSlot);
        self.chunk.emit_byte(name_idx);
        self.chunk.emit_byte(children.len() as u8);
        Ok(())
    }

    /// Lower a plain value: `$name` references read from the scope,
    /// numeric strings become number constants, quoted strings shed
    /// their quotes, other strings pass through, and non-string host
    /// values become the matching constant.
    fn compile_value(&mut self, value: Option<&Native>) -> Result<()> {
        match value {
            None | Some(Native::Nil) => {
                self.chunk.emit_op(OpCode::Nil);
                Ok(())
            }
            Some(Native::Str(s)) => {
                if let Some(var) = s.strip_prefix('$') {
                    return self.emit_with_const(OpCode::GetGlobal, Value::str(var));
                }
                if let Ok(n) = s.parse::<f64>() {
                    return self.emit_with_const(OpCode::Constant, Value::Num(n));
                }
                self.emit_with_const(OpCode::Constant, Value::str(strip_quotes(s)))
            }
            Some(Native::Num(n)) => self.emit_with_const(OpCode::Constant, Value::Num(*n)),
            Some(Native::Bool(true)) => {
                self.chunk.emit_op(OpCode::True);
                Ok(())
            }
            Some(Native::Bool(false)) => {
                self.chunk.emit_op(OpCode::False);
                Ok(())
            }
            Some(opaque @ Native::Opaque(_)) => {
                self.emit_with_const(OpCode::Constant, Value::Obj(opaque.clone()))
            }
        }
    }

    fn emit_with_const(&mut self, op: OpCode, value: Value) -> Result<()> {
        let idx = self
            .chunk
            .add_constant(value)
            .ok_or(CompileError::TooManyConstants)?;
        self.chunk.emit_op(op);
        self.chunk.emit_byte(idx);
        Ok(())
    }

    fn patch_jump(&mut self, operand_offset: usize) -> Result<()> {
        if self.chunk.patch_jump(operand_offset) {
            Ok(())
        } else {
            Err(CompileError::JumpTooFar)
        }
    }

    fn syntax(&self, node: &Rc<Node>, message: impl Into<String>) -> CompileError {
        CompileError::Syntax {
            node: node.name().to_string(),
            message: message.into(),
        }
    }
}

/// A recognized three-token infix expression.
struct InfixExpr<'a> {
    lhs: &'a str,
    op: OpCode,
    rhs: &'a str,
}

impl<'a> InfixExpr<'a> {
    /// Recognize `lhs op rhs` where the tokens are whitespace-separated
    /// and `op` is a known operator. Anything else is not infix.
    fn recognize(s: &'a str) -> Option<Self> {
        let mut fields = s.split_whitespace();
        let lhs = fields.next()?;
        let middle = fields.next()?;
        let rhs = fields.next()?;
        if fields.next().is_some() {
            return None;
        }
        let op = OPERATORS
            .iter()
            .find(|(text, _)| *text == middle)
            .map(|(_, op)| *op)?;
        Some(InfixExpr { lhs, op, rhs })
    }
}

/// Strip one matching pair of single quotes.
fn strip_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(chunk: &Chunk) -> Vec<u8> {
        chunk.code.clone()
    }

    #[test]
    fn compiles_variable_binding() {
        let node = Node::with_value("$x", "10");
        let chunk = Compiler::new().compile(&node).unwrap();

        assert_eq!(
            ops(&chunk),
            vec![
                OpCode::Constant as u8,
                0,
                OpCode::SetGlobal as u8,
                1,
                OpCode::Return as u8,
            ]
        );
        assert_eq!(chunk.constants[0], Value::Num(10.0));
        assert_eq!(chunk.constants[1], Value::str("x"));
    }

    #[test]
    fn compiles_numeric_infix() {
        let node = Node::with_value("$sum", "1 + 2");
        let chunk = Compiler::new().compile(&node).unwrap();

        assert_eq!(
            ops(&chunk),
            vec![
                OpCode::Constant as u8,
                0,
                OpCode::Constant as u8,
                1,
                OpCode::Add as u8,
                OpCode::SetGlobal as u8,
                2,
                OpCode::Return as u8,
            ]
        );
    }

    #[test]
    fn compiles_slot_call_with_named_arguments() {
        let node = Node::new("http.response");
        node.add_child(Node::with_value("status", "201"));
        node.add_child(Node::with_value("body", "created"));

        let chunk = Compiler::new().compile(&node).unwrap();

        // (name, value) pair per child, then CallSlot name argc.
        assert_eq!(
            ops(&chunk),
            vec![
                OpCode::Constant as u8,
                0, // "status"
                OpCode::Constant as u8,
                1, // 201
                OpCode::Constant as u8,
                2, // "body"
                OpCode::Constant as u8,
                3, // "created"
                OpCode::CallSlot as u8,
                4, // "http.response"
                2, // argc
                OpCode::Return as u8,
            ]
        );
        assert_eq!(chunk.constants[1], Value::Num(201.0));
        assert_eq!(chunk.constants[4], Value::str("http.response"));
    }

    #[test]
    fn compiles_conditional_with_both_branches() {
        let node = Node::with_value("if", "$x == 10");
        let then = Node::new("then");
        then.add_child(Node::with_value("$res", "'yes'"));
        let els = Node::new("else");
        els.add_child(Node::with_value("$res", "'no'"));
        node.add_child(then);
        node.add_child(els);

        let chunk = Compiler::new().compile(&node).unwrap();

        // Condition, conditional jump over the then-branch, then-branch,
        // jump over the else-branch, else-branch, return.
        assert_eq!(chunk.code[0], OpCode::GetGlobal as u8);
        let jif = chunk
            .code
            .iter()
            .position(|&b| b == OpCode::JumpIfFalse as u8)
            .unwrap();
        let distance = u16::from_be_bytes([chunk.code[jif + 1], chunk.code[jif + 2]]);
        // Lands just past the then-branch and its trailing Jump.
        let landing = jif + 3 + distance as usize;
        assert!(landing < chunk.code.len());
        assert_eq!(*chunk.code.last().unwrap(), OpCode::Return as u8);

        // Quote stripping: branch constants are unquoted.
        assert!(chunk.constants.contains(&Value::str("yes")));
        assert!(chunk.constants.contains(&Value::str("no")));
        assert!(!chunk.constants.contains(&Value::str("'yes'")));
    }

    #[test]
    fn root_and_unnamed_nodes_compile_children_in_order() {
        let root = Node::new("root");
        root.add_child(Node::with_value("$a", "1"));
        root.add_child(Node::with_value("$b", "2"));

        let chunk = Compiler::new().compile(&root).unwrap();
        let a_idx = chunk
            .constants
            .iter()
            .position(|c| *c == Value::str("a"))
            .unwrap();
        let b_idx = chunk
            .constants
            .iter()
            .position(|c| *c == Value::str("b"))
            .unwrap();

        let a_at = chunk
            .code
            .iter()
            .position(|&b| b == a_idx as u8)
            .unwrap();
        let b_at = chunk
            .code
            .iter()
            .rposition(|&b| b == b_idx as u8)
            .unwrap();
        assert!(a_at < b_at, "children must compile in declaration order");
    }

    #[test]
    fn invalid_infix_operand_names_the_node() {
        let node = Node::with_value("$x", "foo + 1");
        let err = Compiler::new().compile(&node).unwrap_err();
        match err {
            CompileError::Syntax { node, message } => {
                assert_eq!(node, "$x");
                assert!(message.contains("foo"));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn if_without_then_is_a_syntax_error() {
        let node = Node::with_value("if", "$x == 1");
        let err = Compiler::new().compile(&node).unwrap_err();
        assert!(matches!(err, CompileError::Syntax { .. }));
    }

    #[test]
    fn variable_reference_value_reads_scope() {
        let node = Node::new("log");
        node.add_child(Node::with_value("message", "$greeting"));

        let chunk = Compiler::new().compile(&node).unwrap();
        assert!(chunk.code.contains(&(OpCode::GetGlobal as u8)));
        assert!(chunk.constants.contains(&Value::str("greeting")));
    }
}
