// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Parser for tally source code.
//!
//! Transforms a token sequence into an Abstract Syntax Tree (AST). The first
//! syntax error aborts parsing; there is no recovery. Nesting deeper than
//! [`MAX_DEPTH`] is a syntax error rather than a stack overflow.
//!
//! ## Structure
//!
//! - `parser` - The `Parser` type and its token cursor
//! - `statements` - Declarations, statements and blocks
//! - `expressions` - The precedence-climbing expression grammar
//!
//! ## Usage
//!
//! ```rust
//! use tally_core::lexer::Scanner;
//! use tally_core::parser::Parser;
//!
//! let tokens = Scanner::new("int x; x = 1 + 2;").tokenize().unwrap();
//! let program = Parser::new(&tokens).parse_program().expect("Should parse");
//! assert_eq!(program.body.len(), 2);
//! ```

mod expressions;
#[allow(clippy::module_inception)]
mod parser;
mod statements;

pub use parser::{MAX_DEPTH, Parser};
