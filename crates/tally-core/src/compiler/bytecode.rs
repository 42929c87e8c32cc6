// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bytecode definitions.

use std::fmt;

/// A compiled program: a flat instruction sequence addressed by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bytecode {
    /// The instructions
    pub instructions: Vec<Instruction>,
}

impl Bytecode {
    /// Creates a new empty bytecode chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an instruction and returns its index.
    pub fn emit(&mut self, instruction: Instruction) -> usize {
        let index = self.instructions.len();
        self.instructions.push(instruction);
        index
    }

    /// Resolves the jump at `index` to `target`.
    ///
    /// Returns false, leaving the bytecode untouched, if there is no jump
    /// instruction at `index`.
    #[must_use]
    pub fn patch_jump(&mut self, index: usize, target: usize) -> bool {
        match self.instructions.get_mut(index) {
            Some(instruction) if instruction.opcode.is_jump() => {
                instruction.target = Some(target);
                true
            }
            _ => false,
        }
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if there are no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Index of the first jump whose target was never resolved.
    pub fn first_unresolved_jump(&self) -> Option<usize> {
        self.instructions
            .iter()
            .position(|instr| instr.opcode.is_jump() && instr.target.is_none())
    }
}

/// One line per instruction: `index: OPCODE [operand]`.
impl fmt::Display for Bytecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{}: {}", index, instruction)?;
        }
        Ok(())
    }
}

/// A single bytecode instruction.
///
/// Which operand field is meaningful depends on the opcode: `value` for
/// `PUSH_CONST`, `name` for the variable opcodes, `target` for jumps.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The operation code
    pub opcode: OpCode,
    /// Variable operand
    pub name: Option<String>,
    /// Constant operand
    pub value: Option<f64>,
    /// Jump target, `None` until patched
    pub target: Option<usize>,
}

impl Instruction {
    /// Creates a new instruction with no operand.
    pub fn simple(opcode: OpCode) -> Self {
        Self {
            opcode,
            name: None,
            value: None,
            target: None,
        }
    }

    /// `PUSH_CONST value`.
    pub fn push_const(value: f64) -> Self {
        Self {
            value: Some(value),
            ..Self::simple(OpCode::PushConst)
        }
    }

    /// An instruction naming a variable (`LOAD_VAR`, `STORE_VAR`, `INPUT`).
    pub fn with_name(opcode: OpCode, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::simple(opcode)
        }
    }

    /// A jump whose target is filled in later with [`Bytecode::patch_jump`].
    pub fn jump(opcode: OpCode) -> Self {
        Self::simple(opcode)
    }

    /// A jump to a known target.
    pub fn jump_to(opcode: OpCode, target: usize) -> Self {
        Self {
            target: Some(target),
            ..Self::simple(opcode)
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        match self.opcode {
            OpCode::PushConst => {
                if let Some(value) = self.value {
                    write!(f, " {}", crate::format_number(value))?;
                }
            }
            OpCode::LoadVar | OpCode::StoreVar | OpCode::Input => {
                if let Some(name) = &self.name {
                    write!(f, " {}", name)?;
                }
            }
            OpCode::Jmp | OpCode::JmpIfFalse => match self.target {
                Some(target) => write!(f, " -> {}", target)?,
                None => f.write_str(" -> ?")?,
            },
            _ => {}
        }
        Ok(())
    }
}

/// Operation codes for the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    // Stack and variables
    /// Push a constant
    PushConst,
    /// Push a variable's value (0.0 if never written)
    LoadVar,
    /// Pop into a variable
    StoreVar,
    /// Discard the top of the stack
    Pop,

    // Arithmetic
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Division
    Div,

    // Comparison, pushing 1.0 or 0.0
    /// `==`
    CmpEq,
    /// `!=`
    CmpNeq,
    /// `>`
    CmpGt,
    /// `>=`
    CmpGte,
    /// `<`
    CmpLt,
    /// `<=`
    CmpLte,

    // I/O
    /// Pop and write a line
    Print,
    /// Prompt, read a number, store it
    Input,

    // Control flow
    /// Unconditional jump
    Jmp,
    /// Pop, jump if 0.0
    JmpIfFalse,
}

impl OpCode {
    /// Returns true for `JMP` and `JMP_IF_FALSE`.
    pub fn is_jump(&self) -> bool {
        matches!(self, OpCode::Jmp | OpCode::JmpIfFalse)
    }

    /// The listing mnemonic.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpCode::PushConst => "PUSH_CONST",
            OpCode::LoadVar => "LOAD_VAR",
            OpCode::StoreVar => "STORE_VAR",
            OpCode::Pop => "POP",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::CmpEq => "CMP_EQ",
            OpCode::CmpNeq => "CMP_NEQ",
            OpCode::CmpGt => "CMP_GT",
            OpCode::CmpGte => "CMP_GTE",
            OpCode::CmpLt => "CMP_LT",
            OpCode::CmpLte => "CMP_LTE",
            OpCode::Print => "PRINT",
            OpCode::Input => "INPUT",
            OpCode::Jmp => "JMP",
            OpCode::JmpIfFalse => "JMP_IF_FALSE",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
