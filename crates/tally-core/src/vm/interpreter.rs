// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The bytecode interpreter.

use std::io::{BufRead, Write};

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::input::read_token;
use crate::compiler::{Bytecode, Instruction, OpCode};
use crate::error::RuntimeError;

/// The virtual machine.
///
/// The operand stack lives for one [`Vm::execute`] call. The variable store
/// outlives it, so one machine can run several programs against the same
/// variables.
#[derive(Debug, Default)]
pub struct Vm {
    stack: Vec<f64>,
    variables: FxHashMap<String, f64>,
    pc: usize,
}

impl Vm {
    /// Creates a new VM with no variables set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes bytecode, prompting on and reading from `input` for `INPUT`
    /// and writing `PRINT` output to `output`.
    ///
    /// Halts when the program counter reaches the end of the program.
    pub fn execute<R, W>(
        &mut self,
        bytecode: &Bytecode,
        mut input: R,
        mut output: W,
    ) -> Result<(), RuntimeError>
    where
        R: BufRead,
        W: Write,
    {
        self.pc = 0;
        self.stack.clear();

        let len = bytecode.instructions.len();
        let mut executed = 0usize;

        while self.pc < len {
            let pc = self.pc;
            let instruction = &bytecode.instructions[pc];
            trace!(pc, opcode = %instruction.opcode, depth = self.stack.len(), "step");
            executed += 1;
            self.pc += 1;

            match instruction.opcode {
                OpCode::PushConst => {
                    let value = instruction
                        .value
                        .ok_or_else(|| missing_operand(instruction, pc))?;
                    self.stack.push(value);
                }

                OpCode::LoadVar => {
                    let name = operand_name(instruction, pc)?;
                    let value = self.variables.get(name).copied().unwrap_or(0.0);
                    self.stack.push(value);
                }

                OpCode::StoreVar => {
                    let name = operand_name(instruction, pc)?;
                    let value = self.pop(instruction.opcode, pc)?;
                    self.store(name, value);
                }

                OpCode::Pop => {
                    self.pop(instruction.opcode, pc)?;
                }

                // Arithmetic, IEEE semantics throughout
                OpCode::Add => self.binary_num_op(instruction.opcode, pc, |a, b| a + b)?,
                OpCode::Sub => self.binary_num_op(instruction.opcode, pc, |a, b| a - b)?,
                OpCode::Mul => self.binary_num_op(instruction.opcode, pc, |a, b| a * b)?,
                OpCode::Div => self.binary_num_op(instruction.opcode, pc, |a, b| a / b)?,

                OpCode::CmpEq => self.compare_op(instruction.opcode, pc, |a, b| a == b)?,
                OpCode::CmpNeq => self.compare_op(instruction.opcode, pc, |a, b| a != b)?,
                OpCode::CmpGt => self.compare_op(instruction.opcode, pc, |a, b| a > b)?,
                OpCode::CmpGte => self.compare_op(instruction.opcode, pc, |a, b| a >= b)?,
                OpCode::CmpLt => self.compare_op(instruction.opcode, pc, |a, b| a < b)?,
                OpCode::CmpLte => self.compare_op(instruction.opcode, pc, |a, b| a <= b)?,

                OpCode::Print => {
                    let value = self.pop(instruction.opcode, pc)?;
                    writeln!(output, "{}", crate::format_number(value))?;
                }

                OpCode::Input => {
                    let name = operand_name(instruction, pc)?;
                    write!(output, "{} = ", name)?;
                    output.flush()?;

                    let text = read_token(&mut input)?.ok_or_else(|| {
                        RuntimeError::InputExhausted {
                            name: name.to_string(),
                        }
                    })?;
                    let value = text
                        .parse::<f64>()
                        .map_err(|_| RuntimeError::InvalidInput {
                            name: name.to_string(),
                            text: text.clone(),
                        })?;
                    self.store(name, value);
                }

                OpCode::Jmp => {
                    self.pc = jump_target(instruction, pc, len)?;
                }

                OpCode::JmpIfFalse => {
                    let target = jump_target(instruction, pc, len)?;
                    let condition = self.pop(instruction.opcode, pc)?;
                    if condition == 0.0 {
                        self.pc = target;
                    }
                }
            }
        }

        output.flush()?;
        debug!(executed, variables = self.variables.len(), "execution finished");
        Ok(())
    }

    /// Current value of a variable, if it has ever been written.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    /// The variable store.
    pub fn variables(&self) -> &FxHashMap<String, f64> {
        &self.variables
    }

    /// Forgets every variable.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.variables.clear();
        self.pc = 0;
    }

    fn store(&mut self, name: &str, value: f64) {
        match self.variables.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.variables.insert(name.to_string(), value);
            }
        }
    }

    fn pop(&mut self, opcode: OpCode, pc: usize) -> Result<f64, RuntimeError> {
        self.stack
            .pop()
            .ok_or(RuntimeError::StackUnderflow { opcode, pc })
    }

    fn binary_num_op<F>(&mut self, opcode: OpCode, pc: usize, op: F) -> Result<(), RuntimeError>
    where
        F: FnOnce(f64, f64) -> f64,
    {
        let b = self.pop(opcode, pc)?;
        let a = self.pop(opcode, pc)?;
        self.stack.push(op(a, b));
        Ok(())
    }

    fn compare_op<F>(&mut self, opcode: OpCode, pc: usize, op: F) -> Result<(), RuntimeError>
    where
        F: FnOnce(f64, f64) -> bool,
    {
        self.binary_num_op(opcode, pc, |a, b| if op(a, b) { 1.0 } else { 0.0 })
    }
}

fn missing_operand(instruction: &Instruction, pc: usize) -> RuntimeError {
    RuntimeError::MissingOperand {
        opcode: instruction.opcode,
        pc,
    }
}

fn operand_name(instruction: &Instruction, pc: usize) -> Result<&str, RuntimeError> {
    instruction
        .name
        .as_deref()
        .ok_or_else(|| missing_operand(instruction, pc))
}

fn jump_target(instruction: &Instruction, pc: usize, len: usize) -> Result<usize, RuntimeError> {
    let target = instruction
        .target
        .ok_or_else(|| missing_operand(instruction, pc))?;
    if target > len {
        return Err(RuntimeError::JumpOutOfRange { target, pc });
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn program(instructions: Vec<Instruction>) -> Bytecode {
        Bytecode { instructions }
    }

    fn run(bytecode: &Bytecode, input: &str) -> Result<String, RuntimeError> {
        let mut output = Vec::new();
        Vm::new().execute(bytecode, Cursor::new(input), &mut output)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(run(&Bytecode::new(), "").unwrap(), "");
    }

    #[test]
    fn test_arithmetic_pops_right_then_left() {
        let bytecode = program(vec![
            Instruction::push_const(10.0),
            Instruction::push_const(4.0),
            Instruction::simple(OpCode::Sub),
            Instruction::simple(OpCode::Print),
            Instruction::push_const(1.0),
            Instruction::push_const(4.0),
            Instruction::simple(OpCode::Div),
            Instruction::simple(OpCode::Print),
        ]);
        assert_eq!(run(&bytecode, "").unwrap(), "6.0\n0.25\n");
    }

    #[test]
    fn test_comparisons_push_one_or_zero() {
        let cases = [
            (OpCode::CmpEq, 2.0, 2.0, "1.0"),
            (OpCode::CmpNeq, 2.0, 2.0, "0.0"),
            (OpCode::CmpGt, 3.0, 2.0, "1.0"),
            (OpCode::CmpGte, 2.0, 2.0, "1.0"),
            (OpCode::CmpLt, 3.0, 2.0, "0.0"),
            (OpCode::CmpLte, 2.0, 3.0, "1.0"),
        ];
        for (opcode, a, b, expected) in cases {
            let bytecode = program(vec![
                Instruction::push_const(a),
                Instruction::push_const(b),
                Instruction::simple(opcode),
                Instruction::simple(OpCode::Print),
            ]);
            assert_eq!(run(&bytecode, "").unwrap(), format!("{}\n", expected), "{}", opcode);
        }
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        let bytecode = program(vec![
            Instruction::push_const(1.0),
            Instruction::push_const(0.0),
            Instruction::simple(OpCode::Div),
            Instruction::simple(OpCode::Print),
            Instruction::push_const(0.0),
            Instruction::push_const(0.0),
            Instruction::simple(OpCode::Div),
            Instruction::simple(OpCode::Print),
        ]);
        assert_eq!(run(&bytecode, "").unwrap(), "Infinity\nNaN\n");
    }

    #[test]
    fn test_unset_variable_reads_zero() {
        let bytecode = program(vec![
            Instruction::with_name(OpCode::LoadVar, "ghost"),
            Instruction::simple(OpCode::Print),
        ]);
        assert_eq!(run(&bytecode, "").unwrap(), "0.0\n");
    }

    #[test]
    fn test_store_and_load() {
        let bytecode = program(vec![
            Instruction::push_const(7.5),
            Instruction::with_name(OpCode::StoreVar, "x"),
            Instruction::with_name(OpCode::LoadVar, "x"),
            Instruction::simple(OpCode::Print),
        ]);
        let mut vm = Vm::new();
        let mut output = Vec::new();
        vm.execute(&bytecode, Cursor::new(""), &mut output).unwrap();
        assert_eq!(output, b"7.5\n");
        assert_eq!(vm.get("x"), Some(7.5));
        assert_eq!(vm.get("y"), None);
    }

    #[test]
    fn test_input_prompts_and_reads() {
        let bytecode = program(vec![
            Instruction::with_name(OpCode::Input, "a"),
            Instruction::with_name(OpCode::Input, "b"),
            Instruction::with_name(OpCode::LoadVar, "a"),
            Instruction::with_name(OpCode::LoadVar, "b"),
            Instruction::simple(OpCode::Add),
            Instruction::simple(OpCode::Print),
        ]);
        assert_eq!(run(&bytecode, "2 3.5\n").unwrap(), "a = b = 5.5\n");
    }

    #[test]
    fn test_input_exhausted() {
        let bytecode = program(vec![Instruction::with_name(OpCode::Input, "n")]);
        let err = run(&bytecode, "   \n").unwrap_err();
        assert!(matches!(err, RuntimeError::InputExhausted { ref name } if name == "n"));
    }

    #[test]
    fn test_input_not_a_number() {
        let bytecode = program(vec![Instruction::with_name(OpCode::Input, "n")]);
        let err = run(&bytecode, "twelve").unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::InvalidInput { ref name, ref text } if name == "n" && text == "twelve"
        ));
    }

    #[test]
    fn test_conditional_jump() {
        // if (0) print 1; print 2;
        let bytecode = program(vec![
            Instruction::push_const(0.0),
            Instruction::jump_to(OpCode::JmpIfFalse, 4),
            Instruction::push_const(1.0),
            Instruction::simple(OpCode::Print),
            Instruction::push_const(2.0),
            Instruction::simple(OpCode::Print),
        ]);
        assert_eq!(run(&bytecode, "").unwrap(), "2.0\n");
    }

    #[test]
    fn test_jump_to_end_halts() {
        let bytecode = program(vec![
            Instruction::jump_to(OpCode::Jmp, 3),
            Instruction::push_const(1.0),
            Instruction::simple(OpCode::Print),
        ]);
        assert_eq!(run(&bytecode, "").unwrap(), "");
    }

    #[test]
    fn test_stack_underflow() {
        let bytecode = program(vec![
            Instruction::push_const(1.0),
            Instruction::simple(OpCode::Add),
        ]);
        let err = run(&bytecode, "").unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::StackUnderflow { opcode: OpCode::Add, pc: 1 }
        ));
    }

    #[test]
    fn test_malformed_instructions() {
        let missing_value = program(vec![Instruction::simple(OpCode::PushConst)]);
        assert!(matches!(
            run(&missing_value, ""),
            Err(RuntimeError::MissingOperand { opcode: OpCode::PushConst, pc: 0 })
        ));

        let unresolved = program(vec![Instruction::jump(OpCode::Jmp)]);
        assert!(matches!(
            run(&unresolved, ""),
            Err(RuntimeError::MissingOperand { opcode: OpCode::Jmp, pc: 0 })
        ));

        let far = program(vec![Instruction::jump_to(OpCode::Jmp, 5)]);
        assert!(matches!(
            run(&far, ""),
            Err(RuntimeError::JumpOutOfRange { target: 5, pc: 0 })
        ));
    }

    #[test]
    fn test_variables_persist_across_runs() {
        let mut vm = Vm::new();
        let store = program(vec![
            Instruction::push_const(3.0),
            Instruction::with_name(OpCode::StoreVar, "x"),
        ]);
        let print = program(vec![
            Instruction::with_name(OpCode::LoadVar, "x"),
            Instruction::simple(OpCode::Print),
        ]);

        vm.execute(&store, Cursor::new(""), std::io::sink()).unwrap();
        let mut output = Vec::new();
        vm.execute(&print, Cursor::new(""), &mut output).unwrap();
        assert_eq!(output, b"3.0\n");

        vm.reset();
        assert!(vm.variables().is_empty());
    }
}
