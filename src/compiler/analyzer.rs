//! # Semantic analyzer
//!
//! A diagnostic-only walk over the AST with a stack of symbol tables (§4.6):
//! redeclaring a name within the same scope is fatal, shadowing an outer
//! scope's name in a nested one is fine, and every expression resolves to an
//! inferred [`Type`] so binary operations can be checked for compatibility.

use crate::ast::nodes::*;
use crate::ast::types::Type;
use crate::compiler::error::CompileError;
use std::collections::HashMap;

pub struct Analyzer {
    scopes: Vec<HashMap<String, Type>>,
    errors: Vec<CompileError>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            errors: Vec::new(),
        }
    }

    /// Entry point: analyzes `ast`, returning the first semantic error found.
    pub fn analyze(ast: &Program) -> Result<(), CompileError> {
        let mut analyzer = Self::new();
        analyzer.visit_program(ast);

        if analyzer.errors.is_empty() {
            Ok(())
        } else {
            Err(analyzer.errors.remove(0))
        }
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declares `name: type` in the current (innermost) scope. Redeclaring a
    /// name already present in that same table is a semantic error;
    /// shadowing a name from an outer scope is not.
    fn declare(&mut self, name: &str, ty: Type) {
        let scope = self.scopes.last_mut().expect("at least one scope always open");
        if scope.contains_key(name) {
            self.errors.push(CompileError::redeclaration(name));
            return;
        }
        scope.insert(name.to_string(), ty);
    }

    /// Looks up `name` from the innermost scope outward.
    fn lookup(&self, name: &str) -> Option<&Type> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn visit_program(&mut self, program: &Program) {
        for statement in &program.statements {
            self.visit_statement(statement);
        }
    }

    fn visit_statement(&mut self, statement: &Stmt) {
        match statement {
            Stmt::VarDecl {
                name, initializer, ..
            } => {
                let ty = initializer
                    .as_ref()
                    .map(|expr| self.visit_expression(expr))
                    .unwrap_or(Type::Unknown);
                self.declare(name, ty);
            }
            Stmt::VarAssign { name, initializer } => {
                let value_type = self.visit_expression(initializer);
                match self.lookup(name).cloned() {
                    Some(existing) => {
                        if !existing.is_compatible_with(&value_type) {
                            self.errors.push(CompileError::type_mismatch(format!(
                                "cannot assign {:?} to '{}' declared as {:?}",
                                value_type, name, existing
                            )));
                        }
                    }
                    None => self.declare(name, value_type),
                }
            }
            Stmt::FuncDef { params, body, .. } => {
                self.push_scope();
                for param in params {
                    self.declare(&param.name, Type::Integer);
                }
                for stmt in body {
                    self.visit_statement(stmt);
                }
                self.pop_scope();
            }
            Stmt::FuncCall { args, .. } => {
                for arg in args {
                    self.visit_expression(arg);
                }
            }
            Stmt::Return(expr) => {
                self.visit_expression(expr);
            }
            Stmt::Print(expr) => {
                self.visit_expression(expr);
            }
            Stmt::ClassDef { members, .. } => {
                self.push_scope();
                for member in members {
                    self.visit_statement(member);
                }
                self.pop_scope();
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.visit_expression(condition);

                self.push_scope();
                for stmt in then_branch {
                    self.visit_statement(stmt);
                }
                self.pop_scope();

                self.push_scope();
                for stmt in else_branch {
                    self.visit_statement(stmt);
                }
                self.pop_scope();
            }
            Stmt::For {
                iterator,
                range_start,
                range_end,
                body,
            } => {
                self.visit_expression(range_start);
                self.visit_expression(range_end);

                self.push_scope();
                self.declare(iterator, Type::Integer);
                for stmt in body {
                    self.visit_statement(stmt);
                }
                self.pop_scope();
            }
            Stmt::Import { .. } => {}
            Stmt::ExprStmt(expr) => {
                self.visit_expression(expr);
            }
        }
    }

    fn visit_expression(&mut self, expression: &Expr) -> Type {
        match expression {
            Expr::NumberLit(value) => {
                if value.0 == value.0.trunc() {
                    Type::Integer
                } else {
                    Type::Float
                }
            }
            Expr::StringLit(_) => Type::String,
            Expr::Identifier(name) => self.lookup(name).cloned().unwrap_or_else(|| {
                self.errors.push(CompileError::undeclared(name));
                Type::Unknown
            }),
            Expr::Lambda {
                params,
                body,
                ..
            } => {
                self.push_scope();
                for param in params {
                    self.declare(&param.name, Type::Integer);
                }
                let result = self.visit_expression(body);
                self.pop_scope();
                result
            }
            Expr::ArrayLiteral(elements) => {
                for element in elements {
                    self.visit_expression(element);
                }
                Type::Unknown
            }
            Expr::FuncCall { name, args } => {
                for arg in args {
                    self.visit_expression(arg);
                }
                builtin_return_type(name)
            }
            Expr::MemberAccess { object, .. } => {
                self.visit_expression(object);
                Type::Unknown
            }
            Expr::MethodCall { object, args, .. } => {
                self.visit_expression(object);
                for arg in args {
                    self.visit_expression(arg);
                }
                Type::Unknown
            }
            Expr::Binary { left, op, right } => {
                let left_type = self.visit_expression(left);
                let right_type = self.visit_expression(right);
                self.binary_result_type(*op, &left_type, &right_type)
            }
        }
    }

    /// Checks operand compatibility, reports a mismatch, and returns the
    /// inferred result type per §4.6's widening rules.
    fn binary_result_type(&mut self, op: BinOp, left: &Type, right: &Type) -> Type {
        let compatible = match op {
            BinOp::Add => {
                matches!(left, Type::String) || matches!(right, Type::String) || left.is_compatible_with(right)
            }
            _ => left.is_compatible_with(right),
        };

        if !compatible {
            self.errors.push(CompileError::type_mismatch(format!(
                "{:?} {:?} {:?}",
                left, op, right
            )));
        }

        if op == BinOp::Add && (matches!(left, Type::String) || matches!(right, Type::String)) {
            return Type::String;
        }
        if matches!(op, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div) {
            return if matches!(left, Type::Float) || matches!(right, Type::Float) {
                Type::Float
            } else {
                Type::Integer
            };
        }

        Type::Integer
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed return types for the handful of built-in calls the language
/// recognizes without a user definition.
fn builtin_return_type(name: &str) -> Type {
    match name {
        "to_str" => Type::String,
        "suma_numpy" => Type::Integer,
        _ => Type::Unknown,
    }
}

pub fn analyze(ast: &Program) -> Result<(), CompileError> {
    Analyzer::analyze(ast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::parser::parse;

    fn analyze_source(source: &str) -> Result<(), CompileError> {
        let ast = parse(source).expect("source should parse");
        analyze(&ast)
    }

    #[test]
    fn redeclaration_in_same_scope_is_fatal() {
        let err = analyze_source("main x: int; x: int; end").unwrap_err();
        assert!(matches!(err, CompileError::SemanticError { .. }));
        assert!(err.to_string().contains('x'));
    }

    #[test]
    fn shadowing_in_nested_scope_is_accepted() {
        assert!(analyze_source(
            "main x: int; func f() x: int; return x end return x end"
        )
        .is_ok());
    }

    #[test]
    fn undeclared_identifier_is_fatal() {
        let err = analyze_source("main print(y) end").unwrap_err();
        assert!(matches!(err, CompileError::SemanticError { .. }));
    }

    #[test]
    fn for_loop_iterator_is_scoped_to_body() {
        assert!(analyze_source("main for i in range(3) print(i) end end").is_ok());
    }

    #[test]
    fn if_then_and_else_use_independent_scopes() {
        assert!(analyze_source(
            "main if 1 x: int; else x: int; end end"
        )
        .is_ok());
    }
}
