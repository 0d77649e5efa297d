//! # Statement parsing
//!
//! Top-level program structure and every statement-dispatch rule in §4.4:
//! function/class/if/for definitions, imports, and the speculative
//! identifier-led forms (assignment, declaration, call, or a plain
//! expression statement — distinguished by one token of lookahead, with a
//! full rollback for the fallback case).

use super::common::Parser;
use crate::ast::nodes::{Expr, ImportKind, Param, Program, Stmt};
use crate::compiler::error::CompileError;
use crate::compiler::lexer::TokenKind;

impl<'a> Parser<'a> {
    /// Entry point: `main` [`;`] statements... [`end`].
    pub fn parse_program(&mut self) -> Result<Program, CompileError> {
        if !(self.check(TokenKind::Identifier) && self.current().lexeme == "main") {
            return Err(self.error("program must start with 'main'"));
        }
        self.advance()?; // consume "main"
        if self.check(TokenKind::Semicolon) {
            self.advance()?;
        }

        let mut statements = Vec::new();
        while !self.is_at_end() && !self.check(TokenKind::End) {
            statements.push(self.parse_statement()?);
            self.skip_statement_separators()?;
        }
        if self.check(TokenKind::End) {
            self.advance()?;
        }

        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Stmt, CompileError> {
        match self.current().kind {
            TokenKind::Func => self.parse_func_def(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Print => {
                self.advance()?; // consume "print"
                self.expect(TokenKind::LParen, "expected '(' after 'print'")?;
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "expected ')' after print expression")?;
                Ok(Stmt::Print(expr))
            }
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Class => self.parse_class_def(),
            TokenKind::Import => {
                self.advance()?; // consume "import"
                let kind = self.expect_identifier("expected module type after import")?;
                let name = self
                    .expect(TokenKind::StringLit, "expected module name string after module type")?
                    .lexeme;
                Ok(Stmt::Import {
                    kind: ImportKind::Module(kind),
                    name,
                })
            }
            TokenKind::Ui => {
                self.advance()?; // consume "ui"
                let name = self
                    .expect(TokenKind::StringLit, "expected string after 'ui'")?
                    .lexeme;
                Ok(Stmt::Import {
                    kind: ImportKind::Ui,
                    name,
                })
            }
            TokenKind::Css => {
                self.advance()?; // consume "css"
                let name = self
                    .expect(TokenKind::StringLit, "expected string after 'css'")?
                    .lexeme;
                Ok(Stmt::Import {
                    kind: ImportKind::Css,
                    name,
                })
            }
            TokenKind::RegisterEvent => {
                self.advance()?; // consume "register_event"
                self.expect(TokenKind::LParen, "expected '(' after register_event")?;
                let args = self.parse_call_args()?;
                Ok(Stmt::FuncCall {
                    name: "register_event".to_string(),
                    args,
                })
            }
            TokenKind::Identifier => self.parse_identifier_led_statement(),
            _ => Ok(Stmt::ExprStmt(self.parse_expression()?)),
        }
    }

    /// Disambiguates the five identifier-led forms in §4.4. Any branch that
    /// turns out not to apply rolls back to the checkpoint taken before the
    /// identifier was consumed and falls through to a plain expression.
    fn parse_identifier_led_statement(&mut self) -> Result<Stmt, CompileError> {
        let checkpoint = self.checkpoint();
        let name = self.advance()?.lexeme; // consume the leading identifier

        if self.check(TokenKind::Dot) {
            self.advance()?; // consume '.'
            let member = self.expect_identifier("expected identifier after '.'")?;

            if self.check(TokenKind::Assign) {
                self.advance()?; // consume '='
                let initializer = self.parse_assignable_rhs()?;
                return Ok(Stmt::VarAssign {
                    name: format!("{}.{}", name, member),
                    initializer,
                });
            }

            let object = Expr::Identifier(name);
            let node = Expr::MemberAccess {
                object: Box::new(object),
                member,
            };
            let node = self.parse_postfix(node)?;
            return Ok(Stmt::ExprStmt(node));
        }

        if self.check(TokenKind::Assign) {
            self.advance()?; // consume '='
            let initializer = self.parse_assignable_rhs()?;
            return Ok(Stmt::VarAssign { name, initializer });
        }

        if self.check_type_keyword() {
            let type_name = self.advance()?.lexeme;
            return Ok(Stmt::VarDecl {
                name,
                type_name,
                initializer: None,
            });
        }

        if self.check(TokenKind::LParen) {
            self.advance()?; // consume '('
            let args = self.parse_call_args()?;
            let node = self.parse_postfix(Expr::FuncCall { name, args })?;
            return Ok(Stmt::ExprStmt(node));
        }

        self.restore(checkpoint);
        Ok(Stmt::ExprStmt(self.parse_expression()?))
    }

    /// The right-hand side of an assignment is a lambda if it begins with
    /// `(` and the lambda lookahead confirms it; otherwise a plain
    /// expression.
    fn parse_assignable_rhs(&mut self) -> Result<Expr, CompileError> {
        if self.check(TokenKind::LParen) && self.is_lambda_lookahead()? {
            self.parse_lambda()
        } else {
            self.parse_expression()
        }
    }

    fn parse_func_def(&mut self) -> Result<Stmt, CompileError> {
        self.advance()?; // consume "func"
        let name = self.expect_identifier("expected function name after 'func'")?;
        self.expect(TokenKind::LParen, "expected '(' after function name")?;

        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) {
            let param_name = self.expect_identifier("expected parameter name in function definition")?;
            params.push(Param {
                name: param_name.clone(),
            });

            if param_name == "self" {
                if self.check(TokenKind::Comma) {
                    self.advance()?;
                    continue;
                } else if !self.check(TokenKind::RParen) {
                    return Err(self.error("expected ',' or ')' after 'self'"));
                }
                continue;
            }

            self.expect_type_keyword("expected parameter type in function definition")?;
            if self.check(TokenKind::Comma) {
                self.advance()?;
            } else if !self.check(TokenKind::RParen) {
                return Err(self.error("expected ',' or ')' in parameter list"));
            }
        }
        self.advance()?; // consume ')'

        let return_type = if self.check(TokenKind::Arrow) {
            self.advance()?;
            self.expect_type_keyword("expected return type after '->'")?
        } else {
            String::new()
        };

        self.skip_statement_separators()?;

        let mut body = Vec::new();
        while !self.check(TokenKind::End) {
            body.push(self.parse_statement()?);
            self.skip_statement_separators()?;
        }
        self.advance()?; // consume "end"

        Ok(Stmt::FuncDef {
            name,
            params,
            return_type,
            body,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, CompileError> {
        self.advance()?; // consume "return"
        Ok(Stmt::Return(self.parse_expression()?))
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, CompileError> {
        self.advance()?; // consume "if"
        let condition = self.parse_expression()?;
        self.skip_statement_separators()?;

        let mut then_branch = Vec::new();
        while !self.check(TokenKind::Else) && !self.check(TokenKind::End) {
            then_branch.push(self.parse_statement()?);
            self.skip_statement_separators()?;
        }

        let mut else_branch = Vec::new();
        if self.check(TokenKind::Else) {
            self.advance()?; // consume "else"
            self.skip_statement_separators()?;
            while !self.check(TokenKind::End) {
                else_branch.push(self.parse_statement()?);
                self.skip_statement_separators()?;
            }
        }

        self.expect(TokenKind::End, "expected 'end' after if statement")?;

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_for_stmt(&mut self) -> Result<Stmt, CompileError> {
        self.advance()?; // consume "for"
        let iterator = self.expect_identifier("expected iterator identifier in for loop")?;
        self.expect(TokenKind::In, "expected 'in' in for loop")?;
        self.expect(TokenKind::Range, "expected 'range' in for loop")?;
        self.expect(TokenKind::LParen, "expected '(' after 'range'")?;

        let first = self.parse_expression()?;
        let (range_start, range_end) = if self.check(TokenKind::Comma) {
            self.advance()?;
            (first, self.parse_expression()?)
        } else {
            (Expr::NumberLit(0.0.into()), first)
        };

        self.expect(TokenKind::RParen, "expected ')' after range arguments")?;
        self.skip_statement_separators()?;

        let mut body = Vec::new();
        while !self.check(TokenKind::End) && !self.is_at_end() {
            body.push(self.parse_statement()?);
            self.skip_statement_separators()?;
        }
        self.expect(TokenKind::End, "expected 'end' to close for loop")?;

        Ok(Stmt::For {
            iterator,
            range_start,
            range_end,
            body,
        })
    }

    fn parse_class_def(&mut self) -> Result<Stmt, CompileError> {
        self.advance()?; // consume "class"
        let name = self.expect_identifier("expected class name")?;
        if self.check(TokenKind::Semicolon) {
            self.advance()?;
        }

        let mut members = Vec::new();
        while !self.check(TokenKind::End) {
            members.push(self.parse_statement()?);
            self.skip_statement_separators()?;
        }
        self.advance()?; // consume "end"

        Ok(Stmt::ClassDef { name, members })
    }

    fn skip_statement_separators(&mut self) -> Result<(), CompileError> {
        while self.check(TokenKind::Semicolon) {
            self.advance()?;
        }
        Ok(())
    }
}
