// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Declare-before-use checking.
//!
//! The analyzer walks a [`Program`] in source order with a single flat symbol
//! table. Blocks do not open scopes: a name declared inside `{ ... }` stays
//! declared for the rest of the program. Declared types are recorded for
//! inspection but never checked against how a variable is used.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ast::*;
use crate::error::SemanticError;

/// Declared variables, keyed by name.
pub type SymbolTable = FxHashMap<String, VariableType>;

/// Checks that every variable is declared once and before it is used.
#[derive(Debug, Default)]
pub struct Analyzer {
    symbols: SymbolTable,
    // Names declared by the analysis in progress, undone if it fails
    pending: Vec<String>,
}

impl Analyzer {
    /// Creates an analyzer with an empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzes a program against the symbols declared so far.
    ///
    /// On success the program's declarations are added to the table. On
    /// failure the table is left exactly as it was before the call, so an
    /// analyzer can be reused after a rejected program.
    pub fn analyze(&mut self, program: &Program) -> Result<(), SemanticError> {
        self.pending.clear();

        let result = program
            .body
            .iter()
            .try_for_each(|stmt| self.visit_statement(stmt));

        match result {
            Ok(()) => {
                debug!(
                    declared = self.pending.len(),
                    symbols = self.symbols.len(),
                    "analyzed program"
                );
                self.pending.clear();
                Ok(())
            }
            Err(err) => {
                for name in self.pending.drain(..) {
                    self.symbols.remove(&name);
                }
                Err(err)
            }
        }
    }

    /// The symbol table.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Returns the declared type of `name`, if it is declared.
    pub fn lookup(&self, name: &str) -> Option<VariableType> {
        self.symbols.get(name).copied()
    }

    /// Forgets every declaration.
    pub fn clear(&mut self) {
        self.symbols.clear();
        self.pending.clear();
    }

    fn declare(&mut self, id: &Identifier, ty: VariableType) -> Result<(), SemanticError> {
        if self.symbols.contains_key(&id.name) {
            return Err(SemanticError::Redeclared {
                name: id.name.clone(),
            });
        }
        self.symbols.insert(id.name.clone(), ty);
        self.pending.push(id.name.clone());
        Ok(())
    }

    fn require(&self, id: &Identifier) -> Result<(), SemanticError> {
        if self.symbols.contains_key(&id.name) {
            Ok(())
        } else {
            Err(SemanticError::Undeclared {
                name: id.name.clone(),
            })
        }
    }

    fn visit_statement(&mut self, stmt: &Statement) -> Result<(), SemanticError> {
        match stmt {
            Statement::VariableDeclaration(decl) => self.declare(&decl.id, decl.ty),
            Statement::Assignment(assign) => {
                self.require(&assign.target)?;
                self.visit_expression(&assign.value)
            }
            Statement::Print(print) => self.visit_expression(&print.argument),
            Statement::Input(input) => self.require(&input.target),
            Statement::Expression(expr) => self.visit_expression(&expr.expression),
            Statement::Block(block) => block
                .body
                .iter()
                .try_for_each(|stmt| self.visit_statement(stmt)),
            Statement::If(if_stmt) => {
                self.visit_expression(&if_stmt.test)?;
                self.visit_statement(&if_stmt.consequent)?;
                if let Some(alternate) = &if_stmt.alternate {
                    self.visit_statement(alternate)?;
                }
                Ok(())
            }
            Statement::While(while_stmt) => {
                self.visit_expression(&while_stmt.test)?;
                self.visit_statement(&while_stmt.body)
            }
        }
    }

    fn visit_expression(&self, expr: &Expression) -> Result<(), SemanticError> {
        match expr {
            Expression::Literal(_) => Ok(()),
            Expression::Identifier(id) => self.require(id),
            Expression::Grouping(inner) => self.visit_expression(inner),
            Expression::Unary(un) => self.visit_expression(&un.argument),
            Expression::Binary(bin) => {
                self.visit_expression(&bin.left)?;
                self.visit_expression(&bin.right)
            }
        }
    }
}
