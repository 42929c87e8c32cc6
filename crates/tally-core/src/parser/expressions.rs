// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Expression parsing.
//!
//! Precedence, lowest to highest. Every binary level is left-associative.
//!
//! | Level          | Operators            |
//! |----------------|----------------------|
//! | equality       | `==` `!=`            |
//! | comparison     | `>` `>=` `<` `<=`    |
//! | additive       | `+` `-`              |
//! | multiplicative | `*` `/`              |
//! | unary          | prefix `-`           |
//! | primary        | number, name, `( )`  |

use super::Parser;
use crate::ast::*;
use crate::error::SyntaxError;
use crate::lexer::TokenKind;

impl<'t> Parser<'t> {
    /// Parses an expression.
    pub fn parse_expression(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_comparison()?;

        loop {
            let operator = match self.current().kind {
                TokenKind::EqualEqual => BinaryOperator::Equal,
                TokenKind::NotEqual => BinaryOperator::NotEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_additive()?;

        loop {
            let operator = match self.current().kind {
                TokenKind::GreaterThan => BinaryOperator::GreaterThan,
                TokenKind::GreaterThanEqual => BinaryOperator::GreaterThanEqual,
                TokenKind::LessThan => BinaryOperator::LessThan,
                TokenKind::LessThanEqual => BinaryOperator::LessThanEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let operator = match self.current().kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_unary()?;

        loop {
            let operator = match self.current().kind {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Slash => BinaryOperator::Divide,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, SyntaxError> {
        if self.eat(TokenKind::Minus) {
            let argument = self.nested(Self::parse_unary)?;
            return Ok(Expression::Unary(UnaryExpression {
                operator: UnaryOperator::Minus,
                argument: Box::new(argument),
            }));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, SyntaxError> {
        match self.current().kind {
            TokenKind::Number => {
                let lexeme = &self.advance().lexeme;
                let value = lexeme
                    .parse::<f64>()
                    .map_err(|_| SyntaxError::InvalidNumber {
                        lexeme: lexeme.clone(),
                    })?;
                Ok(Expression::Literal(value))
            }
            TokenKind::Identifier => {
                let name = self.advance().lexeme.clone();
                Ok(Expression::Identifier(Identifier::new(name)))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.nested(Self::parse_expression)?;
                self.expect(TokenKind::RightParen, "expected ')' after expression")?;
                Ok(Expression::Grouping(Box::new(inner)))
            }
            _ => Err(self.error("expected expression")),
        }
    }
}

fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
    Expression::Binary(BinaryExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    })
}
