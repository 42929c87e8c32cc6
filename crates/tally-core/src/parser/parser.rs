// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The main parser implementation.

use tracing::debug;

use crate::ast::*;
use crate::error::SyntaxError;
use crate::lexer::{Span, Token, TokenKind};

/// Deepest nesting of statements and expressions the parser accepts.
pub const MAX_DEPTH: usize = 128;

/// A recursive descent parser over a scanned token sequence.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    eof: Token,
}

impl<'t> Parser<'t> {
    /// Creates a new parser for the given tokens.
    ///
    /// The sequence is expected to end in `Eof`; running off the end of a
    /// sequence that does not behaves as if it did.
    pub fn new(tokens: &'t [Token]) -> Self {
        let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
        Self {
            tokens,
            pos: 0,
            depth: 0,
            eof: Token::new(TokenKind::Eof, "", Span::new(end, end)),
        }
    }

    /// Parses the tokens into a Program AST node.
    pub fn parse_program(&mut self) -> Result<Program, SyntaxError> {
        let mut body = Vec::new();

        while !self.is_at_end() {
            body.push(self.parse_declaration_or_statement()?);
        }

        debug!(statements = body.len(), "parsed program");
        Ok(Program { body })
    }

    // ========================================================================
    // Token cursor
    // ========================================================================

    pub(super) fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    pub(super) fn peek_next(&self) -> &Token {
        self.tokens.get(self.pos + 1).unwrap_or(&self.eof)
    }

    pub(super) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.previous()
    }

    pub(super) fn previous(&self) -> &Token {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .unwrap_or(&self.eof)
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Consumes the current token if it has the given kind.
    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<&Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(expected))
        }
    }

    pub(super) fn expect_identifier(&mut self, expected: &str) -> Result<Identifier, SyntaxError> {
        let token = self.expect(TokenKind::Identifier, expected)?;
        Ok(Identifier::new(token.lexeme.clone()))
    }

    pub(super) fn error(&self, expected: &str) -> SyntaxError {
        SyntaxError::Unexpected {
            found: self.current().clone(),
            expected: expected.to_string(),
        }
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.current().is_eof()
    }

    /// Runs `parse` one nesting level deeper, failing once `MAX_DEPTH` is reached.
    pub(super) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        if self.depth >= MAX_DEPTH {
            return Err(SyntaxError::TooDeep {
                found: self.current().clone(),
                limit: MAX_DEPTH,
            });
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }
}
