// zeno-vm - End-to-end VM and compiler tests
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! End-to-end scenarios: hand-built chunks through the VM, compiled
//! trees through compiler and VM, slot dispatch against a registered
//! engine, and the runtime error paths.

use std::cell::RefCell;
use std::rc::Rc;

use zeno_core::{Engine, ExecCtx, Native, Node, Scope, SlotMeta};
use zeno_vm::{Chunk, Compiler, OpCode, RuntimeError, Value, Vm};

fn run_chunk(engine: &Engine, chunk: &Chunk, scope: &Scope) -> Result<Vm, RuntimeError> {
    let mut vm = Vm::new();
    let ctx = ExecCtx::new(engine);
    vm.run(&ctx, chunk, scope)?;
    Ok(vm)
}

// =============================================================================
// Arithmetic on a hand-built chunk
// =============================================================================

#[test]
fn arithmetic_leaves_sum_on_stack() {
    // 1 + 2
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

    let engine = Engine::new();
    let scope = Scope::new(None);
    let vm = run_chunk(&engine, &chunk, &scope).unwrap();

    assert_eq!(vm.top(), Some(&Value::Num(3.0)));
}

// =============================================================================
// Variable binding through the compiler
// =============================================================================

#[test]
fn compiled_binding_reaches_the_scope() {
    // $x: 10
    let node = Node::with_value("$x", "10");
    let chunk = Compiler::new().compile(&node).unwrap();

    let engine = Engine::new();
    let scope = Scope::new(None);
    run_chunk(&engine, &chunk, &scope).unwrap();

    assert_eq!(scope.get("x"), Some(Native::Num(10.0)));
}

// =============================================================================
// Slot invocation
// =============================================================================

#[test]
fn slot_handler_sees_arguments_in_declaration_order() {
    // http.response:
    //   status: 201
    //   body: "created"
    let node = Node::new("http.response");
    node.add_child(Node::with_value("status", "201"));
    node.add_child(Node::with_value("body", "created"));

    let calls = Rc::new(RefCell::new(0usize));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let mut engine = Engine::new();
    {
        let calls = Rc::clone(&calls);
        let seen = Rc::clone(&seen);
        engine.register(
            "http.response",
            move |_ctx, node, _scope| {
                *calls.borrow_mut() += 1;
                for child in node.children() {
                    seen.borrow_mut()
                        .push((child.name().to_string(), child.value().cloned()));
                }
                Ok(())
            },
            SlotMeta::default(),
        );
    }

    let chunk = Compiler::new().compile(&node).unwrap();
    let scope = Scope::new(None);
    run_chunk(&engine, &chunk, &scope).unwrap();

    assert_eq!(*calls.borrow(), 1, "handler must be invoked exactly once");
    assert_eq!(
        *seen.borrow(),
        vec![
            ("status".to_string(), Some(Native::Num(201.0))),
            ("body".to_string(), Some(Native::str("created"))),
        ]
    );
}

#[test]
fn slot_arguments_carry_parent_backreference() {
    let node = Node::new("check");
    node.add_child(Node::with_value("arg", "1"));

    let mut engine = Engine::new();
    engine.register(
        "check",
        |_ctx, node, _scope| {
            for child in node.children() {
                let parent = child.parent().expect("argument child must have a parent");
                assert!(Rc::ptr_eq(&parent, node));
            }
            Ok(())
        },
        SlotMeta::default(),
    );

    let chunk = Compiler::new().compile(&node).unwrap();
    run_chunk(&engine, &chunk, &Scope::new(None)).unwrap();
}

// =============================================================================
// Conditionals
// =============================================================================

fn conditional_tree() -> Rc<Node> {
    // if: $x == 10
    //   then:
    //     $res: 'yes'
    //   else:
    //     $res: 'no'
    let node = Node::with_value("if", "$x == 10");
    let then = Node::new("then");
    then.add_child(Node::with_value("$res", "'yes'"));
    let els = Node::new("else");
    els.add_child(Node::with_value("$res", "'no'"));
    node.add_child(then);
    node.add_child(els);
    node
}

#[test]
fn conditional_takes_then_branch() {
    let chunk = Compiler::new().compile(&conditional_tree()).unwrap();

    let engine = Engine::new();
    let scope = Scope::new(None);
    scope.set("x", 10.0);
    run_chunk(&engine, &chunk, &scope).unwrap();

    assert_eq!(scope.get("res"), Some(Native::str("yes")));
}

#[test]
fn conditional_takes_else_branch() {
    let chunk = Compiler::new().compile(&conditional_tree()).unwrap();

    let engine = Engine::new();
    let scope = Scope::new(None);
    scope.set("x", 20.0);
    run_chunk(&engine, &chunk, &scope).unwrap();

    assert_eq!(scope.get("res"), Some(Native::str("no")));
}

#[test]
fn same_chunk_runs_against_many_scopes() {
    // A chunk is immutable after compilation; one compile, two runs.
    let chunk = Compiler::new().compile(&conditional_tree()).unwrap();
    let engine = Engine::new();

    let scope1 = Scope::new(None);
    scope1.set("x", 10.0);
    run_chunk(&engine, &chunk, &scope1).unwrap();

    let scope2 = Scope::new(None);
    scope2.set("x", 20.0);
    run_chunk(&engine, &chunk, &scope2).unwrap();

    assert_eq!(scope1.get("res"), Some(Native::str("yes")));
    assert_eq!(scope2.get("res"), Some(Native::str("no")));
}

// =============================================================================
// Missing slots
// =============================================================================

#[test]
fn missing_slot_reports_name_and_mutates_nothing() {
    let node = Node::new("ghost.slot");
    node.add_child(Node::with_value("arg", "1"));
    let chunk = Compiler::new().compile(&node).unwrap();

    let engine = Engine::new();
    let scope = Scope::new(None);
    let err = run_chunk(&engine, &chunk, &scope).unwrap_err();

    match err {
        RuntimeError::SlotNotFound(name) => assert_eq!(name, "ghost.slot"),
        other => panic!("expected SlotNotFound, got {:?}", other),
    }
    assert_eq!(scope.get("arg"), None, "failed dispatch must not touch the scope");
}

// =============================================================================
// Handler errors propagate verbatim
// =============================================================================

#[test]
fn handler_error_aborts_the_run() {
    let node = Node::new("fail");
    let mut engine = Engine::new();
    engine.register(
        "fail",
        |_ctx, _node, _scope| Err(zeno_core::Error::slot("fail", "boom")),
        SlotMeta::default(),
    );

    let chunk = Compiler::new().compile(&node).unwrap();
    let err = run_chunk(&engine, &chunk, &Scope::new(None)).unwrap_err();

    match err {
        RuntimeError::Handler(inner) => {
            assert!(inner.to_string().contains("boom"));
        }
        other => panic!("expected Handler, got {:?}", other),
    }
}

// =============================================================================
// Local synchronization
// =============================================================================

#[test]
fn locals_sync_into_scope_on_return() {
    // Set local slot 0, then return: the slot projects into the scope
    // under its registered name.
    let chunk = Chunk {
        code: vec![
            OpCode::Constant as u8,
            0,
            OpCode::SetLocal as u8,
            0,
            OpCode::Return as u8,
        ],
        constants: vec![Value::Num(7.0)],
        local_names: vec!["counter".to_string()],
    };

    let engine = Engine::new();
    let scope = Scope::new(None);
    run_chunk(&engine, &chunk, &scope).unwrap();

    assert_eq!(scope.get("counter"), Some(Native::Num(7.0)));
}

#[test]
fn locals_sync_before_slot_calls() {
    // A handler invoked after SetLocal observes the local via the scope.
    let chunk = Chunk {
        code: vec![
            OpCode::Constant as u8,
            0,
            OpCode::SetLocal as u8,
            0,
            OpCode::CallSlot as u8,
            1,
            0,
            OpCode::Return as u8,
        ],
        constants: vec![Value::Num(42.0), Value::str("observe")],
        local_names: vec!["answer".to_string()],
    };

    let observed = Rc::new(RefCell::new(None));
    let mut engine = Engine::new();
    {
        let observed = Rc::clone(&observed);
        engine.register(
            "observe",
            move |_ctx, _node, scope| {
                *observed.borrow_mut() = scope.get("answer");
                Ok(())
            },
            SlotMeta::default(),
        );
    }

    run_chunk(&engine, &chunk, &Scope::new(None)).unwrap();
    assert_eq!(*observed.borrow(), Some(Native::Num(42.0)));
}

// =============================================================================
// Runtime failure modes
// =============================================================================

#[test]
fn unknown_opcode_is_fatal() {
    let chunk = Chunk {
        code: vec![0xee],
        constants: vec![],
        local_names: vec![],
    };
    let err = run_chunk(&Engine::new(), &chunk, &Scope::new(None)).unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownOpcode(0xee)));
}

#[test]
fn arithmetic_on_strings_is_an_operand_error() {
    let chunk = Chunk {
        code: vec![
            OpCode::Constant as u8,
            0,
            OpCode::Constant as u8,
            1,
            OpCode::Add as u8,
            OpCode::Return as u8,
        ],
        constants: vec![Value::str("a"), Value::str("b")],
        local_names: vec![],
    };
    let err = run_chunk(&Engine::new(), &chunk, &Scope::new(None)).unwrap_err();
    assert!(matches!(err, RuntimeError::Operand { .. }));
}

#[test]
fn get_global_with_numeric_name_is_an_operand_error() {
    let chunk = Chunk {
        code: vec![OpCode::GetGlobal as u8, 0, OpCode::Return as u8],
        constants: vec![Value::Num(1.0)],
        local_names: vec![],
    };
    let err = run_chunk(&Engine::new(), &chunk, &Scope::new(None)).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Operand { op: "GetGlobal", .. }
    ));
}

#[test]
fn truncated_code_is_fatal() {
    // Constant opcode with no operand byte.
    let chunk = Chunk {
        code: vec![OpCode::Constant as u8],
        constants: vec![],
        local_names: vec![],
    };
    let err = run_chunk(&Engine::new(), &chunk, &Scope::new(None)).unwrap_err();
    assert!(matches!(err, RuntimeError::TruncatedCode));
}

// =============================================================================
// Variable comparisons read through the scope wrapper
// =============================================================================

#[test]
fn numeric_comparison_on_scope_variable() {
    // if: $x > 5 / then: $big: 'yes'
    let node = Node::with_value("if", "$x > 5");
    let then = Node::new("then");
    then.add_child(Node::with_value("$big", "'yes'"));
    node.add_child(then);

    let chunk = Compiler::new().compile(&node).unwrap();
    let engine = Engine::new();

    let scope = Scope::new(None);
    scope.set("x", 6.0);
    run_chunk(&engine, &chunk, &scope).unwrap();
    assert_eq!(scope.get("big"), Some(Native::str("yes")));

    let scope = Scope::new(None);
    scope.set("x", 5.0);
    run_chunk(&engine, &chunk, &scope).unwrap();
    assert_eq!(scope.get("big"), None);
}

// =============================================================================
// Persistence round trip through the codec
// =============================================================================

#[test]
fn compiled_chunk_survives_serialization_and_still_runs() {
    let node = Node::with_value("$x", "1 + 2");
    let chunk = Compiler::new().compile(&node).unwrap();

    let bytes = zeno_vm::codec::serialize(&chunk).unwrap();
    let reloaded = zeno_vm::codec::deserialize(&bytes).unwrap();
    assert_eq!(reloaded, chunk);

    let engine = Engine::new();
    let scope = Scope::new(None);
    run_chunk(&engine, &reloaded, &scope).unwrap();
    assert_eq!(scope.get("x"), Some(Native::Num(3.0)));
}
