// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # tally-core
//!
//! The compiler and virtual machine for tally, a small imperative language
//! with typed declarations, `print`, `input`, `if`/`else` and `while`.
//!
//! ## Overview
//!
//! Source goes through five stages, each of which consumes its whole input
//! and stops at the first error:
//! - [`lexer`]: source text to tokens
//! - [`parser`]: tokens to an [`ast::Program`]
//! - [`semantic`]: declare-before-use checking
//! - [`compiler`]: AST to flat bytecode with backpatched jumps
//! - [`vm`]: a stack machine that runs the bytecode
//!
//! ## Quick Start
//!
//! ```rust
//! use std::io::Cursor;
//!
//! let mut output = Vec::new();
//! tally_core::run(
//!     "int x; x = 0; while (x < 3) { print x; x = x + 1; }",
//!     Cursor::new(""),
//!     &mut output,
//! )
//! .unwrap();
//! assert_eq!(String::from_utf8(output).unwrap(), "0.0\n1.0\n2.0\n");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod vm;

use std::io::{BufRead, Write};

use tracing::debug;

pub use compiler::{Bytecode, Instruction, OpCode};
pub use error::{CompileError, Error, LexError, Result, RuntimeError, SemanticError, SyntaxError};
pub use lexer::{Token, TokenKind};
pub use semantic::Analyzer;
pub use vm::Vm;

/// Scans source text into tokens ending in exactly one `Eof`.
pub fn tokenize(source: &str) -> std::result::Result<Vec<Token>, LexError> {
    lexer::Scanner::new(source).tokenize()
}

/// Parses, analyzes and generates bytecode for a token sequence.
pub fn compile(tokens: &[Token]) -> std::result::Result<Bytecode, CompileError> {
    compile_with(&mut Analyzer::new(), tokens)
}

fn compile_with(
    analyzer: &mut Analyzer,
    tokens: &[Token],
) -> std::result::Result<Bytecode, CompileError> {
    let program = parser::Parser::new(tokens).parse_program()?;
    analyzer.analyze(&program)?;
    compiler::Compiler::new().generate(&program)
}

/// Runs bytecode on a fresh VM.
pub fn execute<R: BufRead, W: Write>(
    bytecode: &Bytecode,
    input: R,
    output: W,
) -> std::result::Result<(), RuntimeError> {
    Vm::new().execute(bytecode, input, output)
}

/// Tokenizes, compiles and executes `source` in one go.
///
/// No output is produced unless compilation succeeds.
pub fn run<R: BufRead, W: Write>(source: &str, input: R, output: W) -> Result<()> {
    let tokens = tokenize(source)?;
    let bytecode = compile(&tokens)?;
    execute(&bytecode, input, output)?;
    Ok(())
}

/// A compile-and-run session whose declarations and variable values
/// carry over from one piece of source to the next.
///
/// ```rust
/// use std::io::Cursor;
/// use tally_core::Engine;
///
/// let mut engine = Engine::new();
/// let mut output = Vec::new();
/// engine.eval("int x; x = 4;", Cursor::new(""), &mut output).unwrap();
/// engine.eval("print x * 2;", Cursor::new(""), &mut output).unwrap();
/// assert_eq!(output, b"8.0\n");
/// ```
#[derive(Debug, Default)]
pub struct Engine {
    analyzer: Analyzer,
    vm: Vm,
}

impl Engine {
    /// Creates a session with nothing declared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `source` against the declarations made so far.
    ///
    /// A source that fails to compile declares nothing.
    pub fn compile(&mut self, source: &str) -> Result<Bytecode> {
        let tokens = tokenize(source)?;
        let bytecode = compile_with(&mut self.analyzer, &tokens)?;
        debug!(instructions = bytecode.len(), "compiled entry");
        Ok(bytecode)
    }

    /// Runs bytecode against the session's variables.
    pub fn execute<R: BufRead, W: Write>(
        &mut self,
        bytecode: &Bytecode,
        input: R,
        output: W,
    ) -> std::result::Result<(), RuntimeError> {
        self.vm.execute(bytecode, input, output)
    }

    /// Compiles and runs `source`, returning the bytecode that was run.
    pub fn eval<R: BufRead, W: Write>(
        &mut self,
        source: &str,
        input: R,
        output: W,
    ) -> Result<Bytecode> {
        let bytecode = self.compile(source)?;
        self.execute(&bytecode, input, output)?;
        Ok(bytecode)
    }

    /// The session's analyzer, for inspecting declared symbols.
    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// The session's VM, for inspecting variable values.
    pub fn vm(&self) -> &Vm {
        &self.vm
    }

    /// Forgets every declaration and value.
    pub fn reset(&mut self) {
        self.analyzer.clear();
        self.vm.reset();
    }
}

/// Renders a number the way `PRINT` and bytecode listings show it.
///
/// Integral values keep one decimal (`2.0`), others use their shortest
/// round-trip form (`0.5`). Magnitudes outside `[1e-3, 1e7)` use scientific
/// notation (`1.0E7`, `2.5E-4`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let magnitude = value.abs();
    if (1e-3..1e7).contains(&magnitude) {
        return format!("{:?}", value);
    }

    let sci = format!("{:e}", value);
    match sci.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{}E{}", mantissa, exponent),
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => sci,
    }
}
