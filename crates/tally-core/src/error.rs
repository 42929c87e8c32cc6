// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for every stage of the pipeline.
//!
//! Each stage has its own error enum so callers can tell a lexical failure
//! from a runtime one without looking at message text. [`Error`] wraps all
//! of them for the convenience entry points.

use thiserror::Error;

use crate::compiler::OpCode;
use crate::lexer::Token;

/// Result type for whole-pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while scanning source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A character that cannot start any token
    #[error("lexical error at position {pos}: unexpected character '{ch}'")]
    UnexpectedChar {
        /// The character
        ch: char,
        /// Its byte offset
        pos: usize,
    },

    /// A two-character operator missing its second character (`!` without `=`)
    #[error("lexical error at position {pos}: '{ch}' must be followed by '='")]
    MalformedOperator {
        /// The character
        ch: char,
        /// Its byte offset
        pos: usize,
    },
}

impl LexError {
    /// Byte offset of the offending character.
    pub fn position(&self) -> usize {
        match self {
            LexError::UnexpectedChar { pos, .. } | LexError::MalformedOperator { pos, .. } => *pos,
        }
    }
}

/// Errors raised by the parser.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    /// The token at the current position is not what the grammar requires
    #[error("syntax error at {}: {expected}", describe(.found))]
    Unexpected {
        /// The token actually found
        found: Token,
        /// What the parser was looking for
        expected: String,
    },

    /// A number lexeme the float parser rejected
    #[error("syntax error at '{lexeme}': invalid number literal")]
    InvalidNumber {
        /// The rejected lexeme
        lexeme: String,
    },

    /// Statements or expressions nested past the parser's depth limit
    #[error("syntax error at {}: nested more than {limit} levels deep", describe(.found))]
    TooDeep {
        /// The token that would have opened one more level
        found: Token,
        /// The depth limit
        limit: usize,
    },
}

fn describe(token: &Token) -> String {
    if token.lexeme.is_empty() {
        "end of input".to_string()
    } else {
        format!("'{}'", token.lexeme)
    }
}

/// Errors raised by the semantic analyzer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// A name declared twice
    #[error("semantic error: variable '{name}' is already declared")]
    Redeclared {
        /// The variable name
        name: String,
    },

    /// A name used, assigned or read into before any declaration
    #[error("semantic error: variable '{name}' is not declared")]
    Undeclared {
        /// The variable name
        name: String,
    },
}

impl SemanticError {
    /// The variable the error is about.
    pub fn name(&self) -> &str {
        match self {
            SemanticError::Redeclared { name } | SemanticError::Undeclared { name } => name,
        }
    }
}

/// Errors raised while turning tokens into bytecode.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The parser rejected the tokens
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// The analyzer rejected the program
    #[error(transparent)]
    Semantic(#[from] SemanticError),

    /// A jump left without a target after generation finished
    #[error("internal compiler error: jump at {index} was never patched")]
    UnresolvedJump {
        /// Index of the jump instruction
        index: usize,
    },
}

/// Errors raised by the virtual machine.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// An opcode needed more operands than the stack held
    #[error("runtime error: stack underflow in {opcode} at {pc}")]
    StackUnderflow {
        /// The instruction that popped
        opcode: OpCode,
        /// Its index
        pc: usize,
    },

    /// An instruction lacks the operand its opcode requires
    #[error("runtime error: {opcode} at {pc} is missing its operand")]
    MissingOperand {
        /// The malformed instruction
        opcode: OpCode,
        /// Its index
        pc: usize,
    },

    /// A jump points past the end of the program
    #[error("runtime error: jump at {pc} targets {target}, outside the program")]
    JumpOutOfRange {
        /// The bad target
        target: usize,
        /// Index of the jump
        pc: usize,
    },

    /// The input source ran dry during `input`
    #[error("runtime error: no input left to read into '{name}'")]
    InputExhausted {
        /// The variable being read
        name: String,
    },

    /// The input token is not a number
    #[error("runtime error: cannot read '{text}' into '{name}': not a number")]
    InvalidInput {
        /// The variable being read
        name: String,
        /// The token that failed to parse
        text: String,
    },

    /// The input source or output sink failed
    #[error("runtime error: {0}")]
    Io(#[from] std::io::Error),
}

/// Any error the pipeline can produce.
#[derive(Error, Debug)]
pub enum Error {
    /// Scanning failed
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Parsing, analysis or generation failed
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Execution failed
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl From<SyntaxError> for Error {
    fn from(err: SyntaxError) -> Self {
        Error::Compile(err.into())
    }
}

impl From<SemanticError> for Error {
    fn from(err: SemanticError) -> Self {
        Error::Compile(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Span, TokenKind};

    #[test]
    fn test_lex_error_message() {
        let err = LexError::UnexpectedChar { ch: '@', pos: 4 };
        assert_eq!(
            err.to_string(),
            "lexical error at position 4: unexpected character '@'"
        );
        assert_eq!(err.position(), 4);
    }

    #[test]
    fn test_syntax_error_names_token() {
        let err = SyntaxError::Unexpected {
            found: Token::new(TokenKind::Semicolon, ";", Span::new(3, 4)),
            expected: "expected expression".into(),
        };
        assert_eq!(err.to_string(), "syntax error at ';': expected expression");
    }

    #[test]
    fn test_syntax_error_at_end_of_input() {
        let err = SyntaxError::Unexpected {
            found: Token::new(TokenKind::Eof, "", Span::new(9, 9)),
            expected: "expected '}' after block".into(),
        };
        assert_eq!(
            err.to_string(),
            "syntax error at end of input: expected '}' after block"
        );
    }

    #[test]
    fn test_semantic_error_name() {
        let err = SemanticError::Undeclared { name: "y".into() };
        assert_eq!(err.name(), "y");
        assert_eq!(err.to_string(), "semantic error: variable 'y' is not declared");
    }

    #[test]
    fn test_conversions_into_error() {
        let err: Error = SemanticError::Redeclared { name: "x".into() }.into();
        assert!(matches!(
            err,
            Error::Compile(CompileError::Semantic(SemanticError::Redeclared { .. }))
        ));
    }
}
