// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The scanner that produces tokens from source text.

use tracing::debug;

use super::{Span, Token, TokenKind};
use crate::error::LexError;

/// A scanner that tokenizes tally source code.
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    finished: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            finished: false,
        }
    }

    /// Scans the whole source, returning every token followed by exactly one `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        debug!(tokens = tokens.len(), "scanned source");
        Ok(tokens)
    }

    /// Returns the next token from the source.
    ///
    /// Once the end of input is reached every further call returns `Eof` again.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();

        let start = self.current_pos;

        let Some((pos, ch)) = self.advance() else {
            self.finished = true;
            return Ok(Token::new(TokenKind::Eof, "", Span::new(start, start)));
        };

        let kind = match ch {
            // Single-character tokens
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            ';' => TokenKind::Semicolon,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,

            // One or two characters
            '=' => self.scan_equal(),
            '!' => self.scan_bang(pos)?,
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),

            '0'..='9' => self.scan_number(),

            _ if is_id_start(ch) => self.scan_identifier(start),

            _ => return Err(LexError::UnexpectedChar { ch, pos }),
        };

        let span = Span::new(start, self.current_pos);
        Ok(Token::new(kind, &self.source[start..self.current_pos], span))
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = pos + ch.len_utf8();
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, ch)| ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    // Line comment runs up to, not including, the newline
                    while let Some(ch) = self.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_equal(&mut self) -> TokenKind {
        if self.peek() == Some('=') {
            self.advance();
            TokenKind::EqualEqual
        } else {
            TokenKind::Equal
        }
    }

    fn scan_bang(&mut self, pos: usize) -> Result<TokenKind, LexError> {
        if self.peek() == Some('=') {
            self.advance();
            Ok(TokenKind::NotEqual)
        } else {
            Err(LexError::MalformedOperator { ch: '!', pos })
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        if self.peek() == Some('=') {
            self.advance();
            TokenKind::LessThanEqual
        } else {
            TokenKind::LessThan
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        if self.peek() == Some('=') {
            self.advance();
            TokenKind::GreaterThanEqual
        } else {
            TokenKind::GreaterThan
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        let mut seen_dot = false;

        while let Some(ch) = self.peek() {
            match ch {
                '0'..='9' => {
                    self.advance();
                }
                '.' if !seen_dot => {
                    seen_dot = true;
                    self.advance();
                }
                _ => break,
            }
        }

        TokenKind::Number
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::keyword(&self.source[start..self.current_pos]).unwrap_or(TokenKind::Identifier)
    }
}

/// Checks if a character can start an identifier.
fn is_id_start(ch: char) -> bool {
    ch == '_' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Checks if a character can continue an identifier.
fn is_id_continue(ch: char) -> bool {
    ch == '_' || unicode_xid::UnicodeXID::is_xid_continue(ch)
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(token) if token.is_eof() => None,
            Ok(token) => Some(Ok(token)),
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Scanner::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            kinds("{ } ( ) ;"),
            vec![
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_exactly_one_eof() {
        let tokens = Scanner::new("int x;").tokenize().unwrap();
        assert_eq!(tokens.iter().filter(|t| t.is_eof()).count(), 1);
        assert!(tokens.last().unwrap().is_eof());

        let empty = Scanner::new("   ").tokenize().unwrap();
        assert_eq!(empty.len(), 1);
    }

    #[test]
    fn test_numbers_keep_lexeme() {
        let tokens = Scanner::new("42 3.14 7.").tokenize().unwrap();
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].lexeme, "3.14");
        assert_eq!(tokens[2].lexeme, "7.");
        assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::Number));
    }

    #[test]
    fn test_second_dot_ends_number() {
        let err = Scanner::new("1.2.3").tokenize().unwrap_err();
        assert_eq!(err, LexError::UnexpectedChar { ch: '.', pos: 3 });
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("int real if else while print input"),
            vec![
                TokenKind::Int,
                TokenKind::Real,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::Print,
                TokenKind::Input,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        let tokens = Scanner::new("foo _bar x1 Int printer").tokenize().unwrap();
        for (token, name) in tokens.iter().zip(["foo", "_bar", "x1", "Int", "printer"]) {
            assert_eq!(token.kind, TokenKind::Identifier);
            assert_eq!(token.lexeme, name);
        }
    }

    #[test]
    fn test_two_character_operators_are_greedy() {
        assert_eq!(
            kinds("== != >= <= = > <"),
            vec![
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::GreaterThanEqual,
                TokenKind::LessThanEqual,
                TokenKind::Equal,
                TokenKind::GreaterThan,
                TokenKind::LessThan,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a<=b"),
            vec![
                TokenKind::Identifier,
                TokenKind::LessThanEqual,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_single_line_comments() {
        assert_eq!(
            kinds("42 // this is a comment\n43 // trailing"),
            vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn test_division_vs_comment() {
        assert_eq!(
            kinds("6 / 2"),
            vec![
                TokenKind::Number,
                TokenKind::Slash,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_bare_bang_is_an_error() {
        let err = Scanner::new("x ! y").tokenize().unwrap_err();
        assert_eq!(err, LexError::MalformedOperator { ch: '!', pos: 2 });
    }

    #[test]
    fn test_unknown_character_reports_position() {
        let err = Scanner::new("int x;\nx = 3 % 2;").tokenize().unwrap_err();
        assert_eq!(err, LexError::UnexpectedChar { ch: '%', pos: 13 });
    }

    #[test]
    fn test_spans_cover_lexemes() {
        let src = "while (count >= 10)";
        for token in Scanner::new(src).tokenize().unwrap() {
            assert_eq!(&src[token.span.start..token.span.end], token.lexeme);
        }
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut scanner = Scanner::new("1 @ 2");
        assert!(matches!(scanner.next(), Some(Ok(_))));
        assert!(matches!(scanner.next(), Some(Err(_))));
        assert!(scanner.next().is_none());
    }
}
