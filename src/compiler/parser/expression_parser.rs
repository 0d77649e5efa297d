//! # Expression parsing
//!
//! Two precedence levels plus a factor grammar, per §4.4: `expression` folds
//! `+ - > < >= <= == !=` left-associatively at one level, `term` handles
//! `* /` one level down, and `factor` bottoms out at literals, identifiers
//! (with postfix chaining), parenthesized expressions, and array literals.

use super::common::Parser;
use crate::ast::nodes::{BinOp, Expr, Param};
use crate::compiler::error::CompileError;
use crate::compiler::lexer::TokenKind;

impl<'a> Parser<'a> {
    pub fn parse_expression(&mut self) -> Result<Expr, CompileError> {
        let mut node = self.parse_term()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gte => BinOp::Gte,
                TokenKind::Lte => BinOp::Lte,
                TokenKind::Eq => BinOp::Eq,
                TokenKind::Neq => BinOp::Neq,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_term()?;
            node = Expr::Binary {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }

        Ok(node)
    }

    fn parse_term(&mut self) -> Result<Expr, CompileError> {
        let mut node = self.parse_factor()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Asterisk => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_factor()?;
            node = Expr::Binary {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }

        Ok(node)
    }

    fn parse_factor(&mut self) -> Result<Expr, CompileError> {
        match self.current().kind {
            TokenKind::Number => {
                let lexeme = self.advance()?.lexeme;
                let value: f64 = lexeme
                    .parse()
                    .map_err(|_| self.error(format!("invalid numeric literal '{}'", lexeme)))?;
                Ok(Expr::NumberLit(value.into()))
            }
            TokenKind::StringLit => {
                let lexeme = self.advance()?.lexeme;
                Ok(Expr::StringLit(lexeme))
            }
            TokenKind::Identifier => {
                let name = self.advance()?.lexeme;
                let node = Expr::Identifier(name);
                self.parse_postfix(node)
            }
            TokenKind::LParen => {
                self.advance()?; // consume '('
                let node = self.parse_expression()?;
                self.expect(TokenKind::RParen, "expected ')' after expression")?;
                Ok(node)
            }
            TokenKind::LBracket => self.parse_array_literal(),
            _ => Err(self.error("unexpected token in expression")),
        }
    }

    /// Handles chained `.member`, `.method(args)`, and direct `name(args)`
    /// postfix forms. Recursive so `a.b().c.d(e)` parses left-to-right.
    pub(super) fn parse_postfix(&mut self, node: Expr) -> Result<Expr, CompileError> {
        if self.check(TokenKind::Dot) {
            self.advance()?; // consume '.'
            let member = self.expect_identifier("expected identifier after '.'")?;

            let node = if self.check(TokenKind::LParen) {
                self.advance()?; // consume '('
                let args = self.parse_call_args()?;
                Expr::MethodCall {
                    object: Box::new(node),
                    method: member,
                    args,
                }
            } else {
                Expr::MemberAccess {
                    object: Box::new(node),
                    member,
                }
            };

            return self.parse_postfix(node);
        }

        if self.check(TokenKind::LParen) {
            if let Expr::Identifier(name) = &node {
                let name = name.clone();
                self.advance()?; // consume '('
                let args = self.parse_call_args()?;
                return self.parse_postfix(Expr::FuncCall { name, args });
            }
        }

        Ok(node)
    }

    /// Parses a comma-separated argument list up to (and consuming) the
    /// closing `)`. The caller has already consumed the opening `(`.
    pub(super) fn parse_call_args(&mut self) -> Result<Vec<Expr>, CompileError> {
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) {
            args.push(self.parse_expression()?);
            if self.check(TokenKind::Comma) {
                self.advance()?;
            } else if !self.check(TokenKind::RParen) {
                return Err(self.error("expected ',' or ')' in argument list"));
            }
        }
        self.advance()?; // consume ')'
        Ok(args)
    }

    /// Parses a lambda literal whose opening `(` is still the current
    /// token. Only called after [`Parser::is_lambda_lookahead`] has
    /// confirmed the shape.
    pub fn parse_lambda(&mut self) -> Result<Expr, CompileError> {
        self.advance()?; // consume '('

        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let name = self.expect_identifier("expected parameter name in lambda")?;
                self.expect_type_keyword("expected parameter type in lambda")?;
                params.push(Param { name });
                if self.check(TokenKind::Comma) {
                    self.advance()?;
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "expected ')' after lambda parameters")?;
        self.expect(TokenKind::Arrow, "expected '->' after lambda parameters")?;
        let return_type = self.expect_type_keyword("expected return type in lambda")?;
        self.expect(TokenKind::FatArrow, "expected '=>' in lambda")?;
        let body = self.parse_expression()?;

        Ok(Expr::Lambda {
            params,
            return_type,
            body: Box::new(body),
        })
    }

    fn parse_array_literal(&mut self) -> Result<Expr, CompileError> {
        self.advance()?; // consume '['
        let mut elements = Vec::new();

        if !self.check(TokenKind::RBracket) {
            loop {
                elements.push(self.parse_expression()?);
                if self.check(TokenKind::Comma) {
                    self.advance()?;
                } else {
                    break;
                }
            }
        }

        self.expect(TokenKind::RBracket, "expected ']' to close array literal")?;
        Ok(Expr::ArrayLiteral(elements))
    }
}
