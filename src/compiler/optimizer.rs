//! # Constant folding and dead-branch elimination
//!
//! A single recursive pass over the AST (§4.5): binary operations on two
//! numeric literals are evaluated at compile time, and `if` statements whose
//! condition folds to a literal drop the branch that can never run. Anything
//! else is walked structurally with no transformation.

use crate::ast::nodes::{BinOp, Expr, Stmt};
use crate::compiler::error::CompileError;

/// Runs the optimizer over every statement in place.
pub fn optimize(statements: Vec<Stmt>) -> Result<Vec<Stmt>, CompileError> {
    statements.into_iter().map(optimize_stmt).collect()
}

fn optimize_stmt(stmt: Stmt) -> Result<Stmt, CompileError> {
    match stmt {
        Stmt::VarAssign { name, initializer } => Ok(Stmt::VarAssign {
            name,
            initializer: optimize_expr(initializer)?,
        }),
        Stmt::VarDecl {
            name,
            type_name,
            initializer,
        } => Ok(Stmt::VarDecl {
            name,
            type_name,
            initializer: initializer.map(optimize_expr).transpose()?.map(Box::new),
        }),
        Stmt::FuncDef {
            name,
            params,
            return_type,
            body,
        } => Ok(Stmt::FuncDef {
            name,
            params,
            return_type,
            body: optimize(body)?,
        }),
        Stmt::FuncCall { name, args } => Ok(Stmt::FuncCall {
            name,
            args: args.into_iter().map(optimize_expr).collect::<Result<_, _>>()?,
        }),
        Stmt::Return(expr) => Ok(Stmt::Return(optimize_expr(expr)?)),
        Stmt::Print(expr) => Ok(Stmt::Print(optimize_expr(expr)?)),
        Stmt::ClassDef { name, members } => Ok(Stmt::ClassDef {
            name,
            members: optimize(members)?,
        }),
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => optimize_if(condition, then_branch, else_branch),
        Stmt::For {
            iterator,
            range_start,
            range_end,
            body,
        } => Ok(Stmt::For {
            iterator,
            range_start: optimize_expr(range_start)?,
            range_end: optimize_expr(range_end)?,
            body: optimize(body)?,
        }),
        Stmt::Import { .. } => Ok(stmt),
        Stmt::ExprStmt(expr) => Ok(Stmt::ExprStmt(optimize_expr(expr)?)),
    }
}

/// Folds the condition first; if it resolves to a literal, the branch that
/// can never execute is cleared rather than dropping the `If` node itself,
/// matching the simplest conforming strategy the reference optimizer takes.
fn optimize_if(
    condition: Expr,
    then_branch: Vec<Stmt>,
    else_branch: Vec<Stmt>,
) -> Result<Stmt, CompileError> {
    let condition = optimize_expr(condition)?;

    if let Expr::NumberLit(value) = &condition {
        return if value.0 != 0.0 {
            Ok(Stmt::If {
                condition,
                then_branch: optimize(then_branch)?,
                else_branch: Vec::new(),
            })
        } else {
            Ok(Stmt::If {
                condition,
                then_branch: Vec::new(),
                else_branch: optimize(else_branch)?,
            })
        };
    }

    Ok(Stmt::If {
        condition,
        then_branch: optimize(then_branch)?,
        else_branch: optimize(else_branch)?,
    })
}

fn optimize_expr(expr: Expr) -> Result<Expr, CompileError> {
    match expr {
        Expr::Binary { left, op, right } => optimize_binary(*left, op, *right),
        Expr::Lambda {
            params,
            return_type,
            body,
        } => Ok(Expr::Lambda {
            params,
            return_type,
            body: Box::new(optimize_expr(*body)?),
        }),
        Expr::ArrayLiteral(elements) => Ok(Expr::ArrayLiteral(
            elements.into_iter().map(optimize_expr).collect::<Result<_, _>>()?,
        )),
        Expr::FuncCall { name, args } => Ok(Expr::FuncCall {
            name,
            args: args.into_iter().map(optimize_expr).collect::<Result<_, _>>()?,
        }),
        Expr::MemberAccess { object, member } => Ok(Expr::MemberAccess {
            object: Box::new(optimize_expr(*object)?),
            member,
        }),
        Expr::MethodCall {
            object,
            method,
            args,
        } => Ok(Expr::MethodCall {
            object: Box::new(optimize_expr(*object)?),
            method,
            args: args.into_iter().map(optimize_expr).collect::<Result<_, _>>()?,
        }),
        Expr::NumberLit(_) | Expr::StringLit(_) | Expr::Identifier(_) => Ok(expr),
    }
}

fn optimize_binary(left: Expr, op: BinOp, right: Expr) -> Result<Expr, CompileError> {
    let left = optimize_expr(left)?;
    let right = optimize_expr(right)?;

    if !op.is_foldable_arithmetic() {
        return Ok(Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        });
    }

    if let (Expr::NumberLit(l), Expr::NumberLit(r)) = (&left, &right) {
        let (l, r) = (l.0, r.0);
        let result = match op {
            BinOp::Add => l + r,
            BinOp::Sub => l - r,
            BinOp::Mul => l * r,
            BinOp::Div => {
                if r == 0.0 {
                    return Err(CompileError::DivisionByZero);
                }
                l / r
            }
            _ => unreachable!("is_foldable_arithmetic restricts op to Add/Sub/Mul/Div"),
        };
        return Ok(Expr::NumberLit(result.into()));
    }

    Ok(Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::nodes::OrderedF64;

    fn num(value: f64) -> Expr {
        Expr::NumberLit(OrderedF64(value))
    }

    #[test]
    fn folds_nested_arithmetic_to_one_literal() {
        let expr = Expr::Binary {
            left: Box::new(Expr::Binary {
                left: Box::new(num(2.0)),
                op: BinOp::Add,
                right: Box::new(num(3.0)),
            }),
            op: BinOp::Mul,
            right: Box::new(num(4.0)),
        };
        assert_eq!(optimize_expr(expr).unwrap(), num(20.0));
    }

    #[test]
    fn division_by_zero_in_constant_folding_is_fatal() {
        let expr = Expr::Binary {
            left: Box::new(num(1.0)),
            op: BinOp::Div,
            right: Box::new(num(0.0)),
        };
        assert!(matches!(
            optimize_expr(expr),
            Err(CompileError::DivisionByZero)
        ));
    }

    #[test]
    fn comparison_operators_are_not_folded() {
        let expr = Expr::Binary {
            left: Box::new(num(1.0)),
            op: BinOp::Gt,
            right: Box::new(num(2.0)),
        };
        assert!(matches!(optimize_expr(expr).unwrap(), Expr::Binary { .. }));
    }

    #[test]
    fn true_condition_drops_else_branch() {
        let stmt = optimize_if(
            num(1.0),
            vec![Stmt::Print(num(1.0))],
            vec![Stmt::Print(num(2.0))],
        )
        .unwrap();
        match stmt {
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert_eq!(then_branch.len(), 1);
                assert!(else_branch.is_empty());
            }
            _ => panic!("expected If"),
        }
    }

    #[test]
    fn false_condition_drops_then_branch() {
        let stmt = optimize_if(
            num(0.0),
            vec![Stmt::Print(num(1.0))],
            vec![Stmt::Print(num(2.0))],
        )
        .unwrap();
        match stmt {
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert!(then_branch.is_empty());
                assert_eq!(else_branch.len(), 1);
            }
            _ => panic!("expected If"),
        }
    }

    #[test]
    fn non_constant_condition_optimizes_both_branches_unchanged() {
        let stmt = optimize_if(
            Expr::Identifier("flag".into()),
            vec![Stmt::Print(num(1.0))],
            vec![Stmt::Print(num(2.0))],
        )
        .unwrap();
        match stmt {
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert_eq!(then_branch.len(), 1);
                assert_eq!(else_branch.len(), 1);
            }
            _ => panic!("expected If"),
        }
    }

    #[test]
    fn running_twice_is_idempotent() {
        let stmts = vec![Stmt::Print(Expr::Binary {
            left: Box::new(num(2.0)),
            op: BinOp::Add,
            right: Box::new(num(2.0)),
        })];
        let once = optimize(stmts).unwrap();
        let twice = optimize(once.clone()).unwrap();
        assert_eq!(once, twice);
    }
}
