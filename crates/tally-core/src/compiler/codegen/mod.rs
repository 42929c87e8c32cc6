// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Code generation from AST to bytecode.
//!
//! Control flow is emitted in one pass. A forward jump is emitted with no
//! target, its index remembered, and patched once the destination index is
//! known. `while` loops are the only source of backward jumps.

use tracing::debug;

use crate::ast::*;
use crate::compiler::bytecode::{Bytecode, Instruction, OpCode};
use crate::error::CompileError;

/// Compiles AST to bytecode.
#[derive(Debug, Default)]
pub struct Compiler {
    bytecode: Bytecode,
}

impl Compiler {
    /// Creates a new compiler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates bytecode for an analyzed program.
    ///
    /// Every jump in the result has a target in `0..=len`.
    pub fn generate(&mut self, program: &Program) -> Result<Bytecode, CompileError> {
        self.bytecode = Bytecode::new();

        for statement in &program.body {
            self.compile_statement(statement);
        }

        let bytecode = std::mem::take(&mut self.bytecode);
        if let Some(index) = bytecode.first_unresolved_jump() {
            return Err(CompileError::UnresolvedJump { index });
        }

        debug!(instructions = bytecode.len(), "generated bytecode");
        Ok(bytecode)
    }

    fn emit(&mut self, instruction: Instruction) -> usize {
        self.bytecode.emit(instruction)
    }

    /// The index the next emitted instruction will have.
    fn next_index(&self) -> usize {
        self.bytecode.len()
    }

    fn patch_jump(&mut self, index: usize, target: usize) {
        let patched = self.bytecode.patch_jump(index, target);
        debug_assert!(patched, "no jump at {index} to patch");
    }

    fn compile_statement(&mut self, stmt: &Statement) {
        match stmt {
            // Declarations only matter to the analyzer
            Statement::VariableDeclaration(_) => {}
            Statement::Assignment(assign) => {
                self.compile_expression(&assign.value);
                self.emit(Instruction::with_name(
                    OpCode::StoreVar,
                    assign.target.name.as_str(),
                ));
            }
            Statement::Print(print) => {
                self.compile_expression(&print.argument);
                self.emit(Instruction::simple(OpCode::Print));
            }
            Statement::Input(input) => {
                self.emit(Instruction::with_name(
                    OpCode::Input,
                    input.target.name.as_str(),
                ));
            }
            Statement::Expression(expr) => {
                self.compile_expression(&expr.expression);
                self.emit(Instruction::simple(OpCode::Pop));
            }
            Statement::Block(block) => {
                for stmt in &block.body {
                    self.compile_statement(stmt);
                }
            }
            Statement::If(if_stmt) => self.compile_if_statement(if_stmt),
            Statement::While(while_stmt) => self.compile_while_statement(while_stmt),
        }
    }

    fn compile_if_statement(&mut self, if_stmt: &IfStatement) {
        self.compile_expression(&if_stmt.test);

        // Jump to else/end if false
        let jump_to_else = self.emit(Instruction::jump(OpCode::JmpIfFalse));

        self.compile_statement(&if_stmt.consequent);

        if let Some(alternate) = &if_stmt.alternate {
            let jump_to_end = self.emit(Instruction::jump(OpCode::Jmp));

            let else_pos = self.next_index();
            self.patch_jump(jump_to_else, else_pos);

            self.compile_statement(alternate);

            let end_pos = self.next_index();
            self.patch_jump(jump_to_end, end_pos);
        } else {
            let end_pos = self.next_index();
            self.patch_jump(jump_to_else, end_pos);
        }
    }

    fn compile_while_statement(&mut self, while_stmt: &WhileStatement) {
        let loop_start = self.next_index();

        self.compile_expression(&while_stmt.test);
        let exit_jump = self.emit(Instruction::jump(OpCode::JmpIfFalse));

        self.compile_statement(&while_stmt.body);
        self.emit(Instruction::jump_to(OpCode::Jmp, loop_start));

        let end_pos = self.next_index();
        self.patch_jump(exit_jump, end_pos);
    }

    fn compile_expression(&mut self, expr: &Expression) {
        match expr {
            Expression::Literal(value) => {
                self.emit(Instruction::push_const(*value));
            }
            Expression::Identifier(id) => {
                self.emit(Instruction::with_name(OpCode::LoadVar, id.name.as_str()));
            }
            Expression::Grouping(inner) => self.compile_expression(inner),
            Expression::Unary(un) => self.compile_unary(un),
            Expression::Binary(bin) => self.compile_binary(bin),
        }
    }

    fn compile_unary(&mut self, un: &UnaryExpression) {
        match un.operator {
            // -x is computed as 0 - x
            UnaryOperator::Minus => {
                self.emit(Instruction::push_const(0.0));
                self.compile_expression(&un.argument);
                self.emit(Instruction::simple(OpCode::Sub));
            }
            UnaryOperator::Plus => self.compile_expression(&un.argument),
        }
    }

    fn compile_binary(&mut self, bin: &BinaryExpression) {
        self.compile_expression(&bin.left);
        self.compile_expression(&bin.right);

        let opcode = match bin.operator {
            BinaryOperator::Add => OpCode::Add,
            BinaryOperator::Subtract => OpCode::Sub,
            BinaryOperator::Multiply => OpCode::Mul,
            BinaryOperator::Divide => OpCode::Div,
            BinaryOperator::Equal => OpCode::CmpEq,
            BinaryOperator::NotEqual => OpCode::CmpNeq,
            BinaryOperator::GreaterThan => OpCode::CmpGt,
            BinaryOperator::GreaterThanEqual => OpCode::CmpGte,
            BinaryOperator::LessThan => OpCode::CmpLt,
            BinaryOperator::LessThanEqual => OpCode::CmpLte,
        };
        self.emit(Instruction::simple(opcode));
    }
}

#[cfg(test)]
mod tests;
