// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Lexical analysis (tokenization) for tally source code.
//!
//! The lexer transforms source text into a vector of tokens that the parser
//! consumes. Every token sequence ends in exactly one `Eof` token.
//!
//! ## Structure
//!
//! - `scanner.rs` - Main `Scanner` struct that produces tokens
//! - `token.rs` - `Token` and `TokenKind` definitions
//!
//! ## Usage
//!
//! ```rust
//! use tally_core::lexer::{Scanner, TokenKind};
//!
//! let tokens = Scanner::new("int x; x = 42;").tokenize().unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Int);
//! assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
//! ```

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Span, Token, TokenKind};
