// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Abstract Syntax Tree (AST) definitions.
//!
//! The tree is plain data. The parser builds it, the analyzer and the code
//! generator walk it by exhaustive `match`, and nothing rewrites it afterwards.

use std::fmt;

/// A complete program: the statements of the implicit outer block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// The statements in the program
    pub body: Vec<Statement>,
}

/// An identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// The name of the identifier
    pub name: String,
}

impl Identifier {
    /// Creates an identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The declared type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    /// `int`
    Int,
    /// `real`
    Real,
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableType::Int => f.write_str("int"),
            VariableType::Real => f.write_str("real"),
        }
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `int x;` or `real x;`
    VariableDeclaration(VariableDeclaration),
    /// `x = expr;`
    Assignment(AssignmentStatement),
    /// `print expr;`
    Print(PrintStatement),
    /// `input x;`
    Input(InputStatement),
    /// `expr;`, evaluated and discarded
    Expression(ExpressionStatement),
    /// `{ ... }`
    Block(BlockStatement),
    /// `if (cond) stmt [else stmt]`
    If(IfStatement),
    /// `while (cond) stmt`
    While(WhileStatement),
}

/// A variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// The declared type
    pub ty: VariableType,
    /// The identifier being declared
    pub id: Identifier,
}

/// An assignment statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStatement {
    /// The assignment target
    pub target: Identifier,
    /// The value being assigned
    pub value: Expression,
}

/// A print statement.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintStatement {
    /// The value to print
    pub argument: Expression,
}

/// An input statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InputStatement {
    /// The variable that receives the value read
    pub target: Identifier,
}

/// An expression statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    /// The expression
    pub expression: Expression,
}

/// A block statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    /// The statements in the block
    pub body: Vec<Statement>,
}

/// An if statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// The condition
    pub test: Expression,
    /// The then branch
    pub consequent: Box<Statement>,
    /// The optional else branch; absent, not an empty block, when there is no `else`
    pub alternate: Option<Box<Statement>>,
}

/// A while statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    /// The loop condition
    pub test: Expression,
    /// The loop body
    pub body: Box<Statement>,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Numeric literal
    Literal(f64),
    /// Variable reference
    Identifier(Identifier),
    /// Parenthesized expression
    Grouping(Box<Expression>),
    /// Prefix operator
    Unary(UnaryExpression),
    /// Infix operator
    Binary(BinaryExpression),
}

/// A unary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    /// The operator
    pub operator: UnaryOperator,
    /// The operand
    pub argument: Box<Expression>,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `-`, arithmetic negation
    Minus,
    /// `+`, identity. The parser never produces it; tools building trees by
    /// hand may.
    Plus,
}

/// A binary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    /// The operator
    pub operator: BinaryOperator,
    /// The left operand
    pub left: Box<Expression>,
    /// The right operand
    pub right: Box<Expression>,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanEqual,
}

impl BinaryOperator {
    /// The operator as written in source.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanEqual => ">=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanEqual => "<=",
        }
    }
}

/// Renders an expression fully parenthesized, so tree shape is visible.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", crate::format_number(*value)),
            Expression::Identifier(id) => f.write_str(&id.name),
            Expression::Grouping(inner) => write!(f, "(group {})", inner),
            Expression::Unary(un) => {
                let op = match un.operator {
                    UnaryOperator::Minus => "-",
                    UnaryOperator::Plus => "+",
                };
                write!(f, "({}{})", op, un.argument)
            }
            Expression::Binary(bin) => {
                write!(f, "({} {} {})", bin.left, bin.operator.as_str(), bin.right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested_binary() {
        let expr = Expression::Binary(BinaryExpression {
            operator: BinaryOperator::Add,
            left: Box::new(Expression::Literal(1.0)),
            right: Box::new(Expression::Binary(BinaryExpression {
                operator: BinaryOperator::Multiply,
                left: Box::new(Expression::Identifier(Identifier::new("x"))),
                right: Box::new(Expression::Literal(2.5)),
            })),
        });
        assert_eq!(expr.to_string(), "(1.0 + (x * 2.5))");
    }

    #[test]
    fn test_display_unary_and_grouping() {
        let expr = Expression::Unary(UnaryExpression {
            operator: UnaryOperator::Minus,
            argument: Box::new(Expression::Grouping(Box::new(Expression::Literal(3.0)))),
        });
        assert_eq!(expr.to_string(), "(-(group 3.0))");
    }

    #[test]
    fn test_variable_type_display() {
        assert_eq!(VariableType::Int.to_string(), "int");
        assert_eq!(VariableType::Real.to_string(), "real");
    }
}
