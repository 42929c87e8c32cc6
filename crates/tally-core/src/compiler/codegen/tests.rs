// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Tests for the bytecode compiler.

use super::*;
use crate::lexer::Scanner;
use crate::parser::Parser;
use crate::semantic::Analyzer;

fn compile_source(src: &str) -> Result<Bytecode, CompileError> {
    let tokens = Scanner::new(src).tokenize().expect("source should scan");
    let program = Parser::new(&tokens).parse_program()?;
    Analyzer::new().analyze(&program)?;
    Compiler::new().generate(&program)
}

fn compile_ok(src: &str) -> Bytecode {
    compile_source(src).expect("Compilation should succeed")
}

fn listing(src: &str) -> Vec<String> {
    compile_ok(src)
        .instructions
        .iter()
        .map(|instr| instr.to_string())
        .collect()
}

fn opcodes(src: &str) -> Vec<OpCode> {
    compile_ok(src)
        .instructions
        .iter()
        .map(|instr| instr.opcode)
        .collect()
}

#[test]
fn test_compiler_default() {
    let compiler = Compiler::default();
    assert!(compiler.bytecode.is_empty());
}

#[test]
fn test_compile_empty_program() {
    assert!(compile_ok("").is_empty());
}

#[test]
fn test_declarations_emit_nothing() {
    assert!(compile_ok("int x; real y; { int z; }").is_empty());
}

#[test]
fn test_compile_assignment_and_print() {
    assert_eq!(
        listing("int x; x = 2; print x;"),
        ["PUSH_CONST 2.0", "STORE_VAR x", "LOAD_VAR x", "PRINT"]
    );
}

#[test]
fn test_compile_input() {
    assert_eq!(listing("real n; input n;"), ["INPUT n"]);
}

#[test]
fn test_expression_statement_pops() {
    assert_eq!(
        opcodes("1 + 2;"),
        [OpCode::PushConst, OpCode::PushConst, OpCode::Add, OpCode::Pop]
    );
}

#[test]
fn test_operands_left_before_right() {
    assert_eq!(
        listing("int a; int b; print a - b;"),
        ["LOAD_VAR a", "LOAD_VAR b", "SUB", "PRINT"]
    );
}

#[test]
fn test_precedence_in_emitted_order() {
    assert_eq!(
        opcodes("print 1 + 2 * 3;"),
        [
            OpCode::PushConst,
            OpCode::PushConst,
            OpCode::PushConst,
            OpCode::Mul,
            OpCode::Add,
            OpCode::Print,
        ]
    );
}

#[test]
fn test_comparison_opcodes() {
    let cases = [
        ("==", OpCode::CmpEq),
        ("!=", OpCode::CmpNeq),
        (">", OpCode::CmpGt),
        (">=", OpCode::CmpGte),
        ("<", OpCode::CmpLt),
        ("<=", OpCode::CmpLte),
    ];
    for (op, expected) in cases {
        let ops = opcodes(&format!("1 {} 2;", op));
        assert_eq!(ops[2], expected, "operator {}", op);
    }
}

#[test]
fn test_unary_minus_subtracts_from_zero() {
    assert_eq!(
        listing("print -(2 + 3);"),
        [
            "PUSH_CONST 0.0",
            "PUSH_CONST 2.0",
            "PUSH_CONST 3.0",
            "ADD",
            "SUB",
            "PRINT",
        ]
    );
}

#[test]
fn test_unary_plus_emits_operand_only() {
    let program = Program {
        body: vec![Statement::Print(PrintStatement {
            argument: Expression::Unary(UnaryExpression {
                operator: UnaryOperator::Plus,
                argument: Box::new(Expression::Literal(4.0)),
            }),
        })],
    };
    let bytecode = Compiler::new().generate(&program).unwrap();
    assert_eq!(bytecode.to_string(), "0: PUSH_CONST 4.0\n1: PRINT\n");
}

#[test]
fn test_if_without_else() {
    assert_eq!(
        listing("int x; if (x) print x;"),
        ["LOAD_VAR x", "JMP_IF_FALSE -> 4", "LOAD_VAR x", "PRINT"]
    );
}

#[test]
fn test_if_else_backpatching() {
    assert_eq!(
        listing("int x; x = 5; if (x > 3) { print 1; } else { print 0; }"),
        [
            "PUSH_CONST 5.0",
            "STORE_VAR x",
            "LOAD_VAR x",
            "PUSH_CONST 3.0",
            "CMP_GT",
            "JMP_IF_FALSE -> 9",
            "PUSH_CONST 1.0",
            "PRINT",
            "JMP -> 11",
            "PUSH_CONST 0.0",
            "PRINT",
        ]
    );
}

#[test]
fn test_while_backpatching() {
    assert_eq!(
        listing("int x; x = 0; while (x < 3) { print x; x = x + 1; }"),
        [
            "PUSH_CONST 0.0",
            "STORE_VAR x",
            "LOAD_VAR x",
            "PUSH_CONST 3.0",
            "CMP_LT",
            "JMP_IF_FALSE -> 13",
            "LOAD_VAR x",
            "PRINT",
            "LOAD_VAR x",
            "PUSH_CONST 1.0",
            "ADD",
            "STORE_VAR x",
            "JMP -> 2",
        ]
    );
}

#[test]
fn test_empty_bodies_still_patch() {
    assert_eq!(
        listing("int x; while (x) { }"),
        ["LOAD_VAR x", "JMP_IF_FALSE -> 3", "JMP -> 0"]
    );
    assert_eq!(
        listing("int x; if (x) { } else { }"),
        ["LOAD_VAR x", "JMP_IF_FALSE -> 3", "JMP -> 3"]
    );
}

#[test]
fn test_jump_targets_in_range() {
    let bytecode = compile_ok(
        "int i; int j; i = 0;
         while (i < 3) {
             j = 0;
             while (j < i) { if (j == 1) print j; else { print 0 - j; } j = j + 1; }
             i = i + 1;
         }",
    );
    let len = bytecode.len();
    for (index, instr) in bytecode.instructions.iter().enumerate() {
        if instr.opcode.is_jump() {
            let target = instr.target.expect("jump should be patched");
            assert!(target <= len, "jump at {} targets {}", index, target);
            // Only while back-edges jump backwards, and they are plain JMPs
            if target <= index {
                assert_eq!(instr.opcode, OpCode::Jmp);
            }
        }
    }
}

#[test]
fn test_generation_is_deterministic() {
    let src = "int x; x = 1; while (x < 10) { if (x > 5) print x; x = x * 2; }";
    assert_eq!(compile_ok(src), compile_ok(src));
}

#[test]
fn test_compiler_is_reusable() {
    let tokens = Scanner::new("print 1;").tokenize().unwrap();
    let program = Parser::new(&tokens).parse_program().unwrap();
    let mut compiler = Compiler::new();
    let first = compiler.generate(&program).unwrap();
    let second = compiler.generate(&program).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.len(), 2);
}

#[test]
fn test_semantic_errors_surface() {
    assert!(matches!(
        compile_source("input z;"),
        Err(CompileError::Semantic(_))
    ));
    assert!(matches!(
        compile_source("print ;"),
        Err(CompileError::Syntax(_))
    ));
}
