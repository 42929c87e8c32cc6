// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Statement parsing.
//!
//! ## Grammar
//!
//! ```text
//! DeclarationOrStatement :
//!     ("int" | "real") IDENT ";"
//!     Statement
//!
//! Statement :
//!     "print" Expression ";"
//!     "input" IDENT ";"
//!     "if" "(" Expression ")" Statement ("else" Statement)?
//!     "while" "(" Expression ")" Statement
//!     "{" DeclarationOrStatement* "}"
//!     IDENT "=" Expression ";"
//!     Expression ";"
//! ```
//!
//! Declarations are only allowed where a `DeclarationOrStatement` is, so
//! `if (c) int x;` is rejected.

use super::Parser;
use crate::ast::*;
use crate::error::SyntaxError;
use crate::lexer::TokenKind;

impl<'t> Parser<'t> {
    /// Parses a declaration if the next token is a type keyword, otherwise a statement.
    pub fn parse_declaration_or_statement(&mut self) -> Result<Statement, SyntaxError> {
        if self.current().kind.is_type() {
            self.parse_variable_declaration()
        } else {
            self.parse_statement()
        }
    }

    /// Parses a single statement.
    pub fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.nested(Self::parse_statement_inner)
    }

    fn parse_statement_inner(&mut self) -> Result<Statement, SyntaxError> {
        match self.current().kind {
            TokenKind::Print => self.parse_print_statement(),
            TokenKind::Input => self.parse_input_statement(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::LeftBrace => self.parse_block_statement(),
            TokenKind::Identifier if self.peek_next().kind == TokenKind::Equal => {
                self.parse_assignment_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_variable_declaration(&mut self) -> Result<Statement, SyntaxError> {
        let ty = match self.advance().kind {
            TokenKind::Real => VariableType::Real,
            _ => VariableType::Int,
        };
        let id = self.expect_identifier("expected variable name after type")?;
        self.expect(TokenKind::Semicolon, "expected ';' after declaration")?;

        Ok(Statement::VariableDeclaration(VariableDeclaration { ty, id }))
    }

    fn parse_assignment_statement(&mut self) -> Result<Statement, SyntaxError> {
        let target = self.expect_identifier("expected variable name in assignment")?;
        self.expect(TokenKind::Equal, "expected '=' in assignment")?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "expected ';' after assignment")?;

        Ok(Statement::Assignment(AssignmentStatement { target, value }))
    }

    fn parse_print_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.advance(); // consume 'print'
        let argument = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "expected ';' after print statement")?;

        Ok(Statement::Print(PrintStatement { argument }))
    }

    fn parse_input_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.advance(); // consume 'input'
        let target = self.expect_identifier("expected variable name after 'input'")?;
        self.expect(TokenKind::Semicolon, "expected ';' after input statement")?;

        Ok(Statement::Input(InputStatement { target }))
    }

    fn parse_if_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.advance(); // consume 'if'
        self.expect(TokenKind::LeftParen, "expected '(' after 'if'")?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after condition")?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
        }))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.advance(); // consume 'while'
        self.expect(TokenKind::LeftParen, "expected '(' after 'while'")?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after condition")?;
        let body = Box::new(self.parse_statement()?);

        Ok(Statement::While(WhileStatement { test, body }))
    }

    fn parse_block_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.advance(); // consume '{'
        let mut body = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            body.push(self.parse_declaration_or_statement()?);
        }

        self.expect(TokenKind::RightBrace, "expected '}' after block")?;
        Ok(Statement::Block(BlockStatement { body }))
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, SyntaxError> {
        let expression = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "expected ';' after expression")?;

        Ok(Statement::Expression(ExpressionStatement { expression }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use crate::parser::MAX_DEPTH;

    fn parse(src: &str) -> Result<Program, SyntaxError> {
        let tokens = Scanner::new(src).tokenize().expect("source should scan");
        Parser::new(&tokens).parse_program()
    }

    fn parse_stmt(src: &str) -> Statement {
        parse(src).unwrap().body.into_iter().next().unwrap()
    }

    fn expected_message(src: &str) -> String {
        match parse(src).unwrap_err() {
            SyntaxError::Unexpected { expected, .. } => expected,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_declarations() {
        assert_eq!(
            parse_stmt("int x;"),
            Statement::VariableDeclaration(VariableDeclaration {
                ty: VariableType::Int,
                id: Identifier::new("x"),
            })
        );
        assert!(matches!(
            parse_stmt("real rate;"),
            Statement::VariableDeclaration(VariableDeclaration { ty: VariableType::Real, .. })
        ));
    }

    #[test]
    fn test_parse_assignment_vs_expression_statement() {
        assert!(matches!(parse_stmt("x = 1;"), Statement::Assignment(_)));
        assert!(matches!(parse_stmt("x == 1;"), Statement::Expression(_)));
        assert!(matches!(parse_stmt("x + 1;"), Statement::Expression(_)));
        assert!(matches!(parse_stmt("x;"), Statement::Expression(_)));
    }

    #[test]
    fn test_parse_print_and_input() {
        assert!(matches!(parse_stmt("print 1 + 2;"), Statement::Print(_)));
        assert_eq!(
            parse_stmt("input n;"),
            Statement::Input(InputStatement {
                target: Identifier::new("n")
            })
        );
    }

    #[test]
    fn test_parse_if_without_else_has_no_alternate() {
        match parse_stmt("if (x > 1) print x;") {
            Statement::If(if_stmt) => assert!(if_stmt.alternate.is_none()),
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_if_else() {
        match parse_stmt("if (x) { print 1; } else { print 0; }") {
            Statement::If(if_stmt) => {
                assert!(matches!(*if_stmt.consequent, Statement::Block(_)));
                assert!(matches!(if_stmt.alternate.as_deref(), Some(Statement::Block(_))));
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_dangling_else_binds_to_nearest_if() {
        match parse_stmt("if (a) if (b) print 1; else print 2;") {
            Statement::If(outer) => {
                assert!(outer.alternate.is_none());
                assert!(matches!(
                    *outer.consequent,
                    Statement::If(IfStatement { alternate: Some(_), .. })
                ));
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_while() {
        match parse_stmt("while (i < 10) { i = i + 1; }") {
            Statement::While(w) => match *w.body {
                Statement::Block(block) => assert_eq!(block.body.len(), 1),
                other => panic!("expected block body, got {other:?}"),
            },
            other => panic!("expected while, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_nested_blocks_with_declarations() {
        let program = parse("{ int a; { real b; b = a; } }").unwrap();
        match &program.body[0] {
            Statement::Block(outer) => {
                assert_eq!(outer.body.len(), 2);
                assert!(matches!(outer.body[1], Statement::Block(_)));
            }
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn test_declaration_not_allowed_as_branch() {
        assert!(parse("if (1) int x;").is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(expected_message("int ;"), "expected variable name after type");
        assert_eq!(expected_message("int x"), "expected ';' after declaration");
        assert_eq!(expected_message("x = 1"), "expected ';' after assignment");
        assert_eq!(expected_message("input 3;"), "expected variable name after 'input'");
        assert_eq!(expected_message("if x > 1) print x;"), "expected '(' after 'if'");
        assert_eq!(expected_message("while (x print x;"), "expected ')' after condition");
        assert_eq!(expected_message("{ print 1;"), "expected '}' after block");
        assert_eq!(expected_message("1 + 2"), "expected ';' after expression");
    }

    #[test]
    fn test_deeply_nested_blocks_are_rejected() {
        let src = format!("{}{}", "{".repeat(10_000), "}".repeat(10_000));
        assert!(matches!(
            parse(&src),
            Err(SyntaxError::TooDeep { limit: MAX_DEPTH, .. })
        ));

        let src = format!("{}{}", "while (1) ".repeat(10_000), "print 1;");
        assert!(matches!(parse(&src), Err(SyntaxError::TooDeep { .. })));
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let src = format!("{}print 1;{}", "{".repeat(50), "}".repeat(50));
        assert!(parse(&src).is_ok());
    }
}
