//! Statement checking and definite-return analysis.
//!
//! Every check method reports whether the statement guarantees that a
//! return executes on all paths through it. A function body must
//! guarantee a return to be valid.

use crate::ast::{Stmt, Type};

use super::errors::{TypeError, TypecheckResult};
use super::expressions::Checker;

impl Checker<'_> {
    /// Check every statement in a block. The block guarantees a return if
    /// any statement does; statements after a guaranteed return are still
    /// checked.
    pub fn check_block(
        &self,
        stmts: &[Stmt],
        return_type: &Type,
        in_loop: bool,
    ) -> TypecheckResult<bool> {
        let mut returns = false;
        for stmt in stmts {
            returns |= self.check_stmt(stmt, return_type, in_loop)?;
        }
        Ok(returns)
    }

    pub fn check_stmt(
        &self,
        stmt: &Stmt,
        return_type: &Type,
        in_loop: bool,
    ) -> TypecheckResult<bool> {
        match stmt {
            Stmt::Block(stmts) => self.check_block(stmts, return_type, in_loop),
            Stmt::Assign { place, value } => {
                let place_ty = self.check_place(place)?;
                let value_ty = self.check_expr(value)?;

                if matches!(place_ty, Type::Struct(_) | Type::Fn { .. } | Type::Nil) {
                    return Err(TypeError::new(format!(
                        "invalid type {place_ty} for left-hand side of assignment '{place} = {value}'"
                    )));
                }
                if !place_ty.is_compatible(&value_ty) {
                    return Err(TypeError::new(format!(
                        "incompatible types {place_ty} vs {value_ty} for assignment '{place} = {value}'"
                    )));
                }
                Ok(false)
            }
            Stmt::Call(call) => {
                self.check_call(call)?;
                Ok(false)
            }
            Stmt::If { guard, tt, ff } => {
                let guard_ty = self.check_expr(guard)?;
                if !guard_ty.is_compatible(&Type::Int) {
                    return Err(TypeError::new(format!(
                        "non-int type {guard_ty} for if guard '{guard}'"
                    )));
                }

                let tt_returns = self.check_stmt(tt, return_type, in_loop)?;
                let ff_returns = match ff {
                    Some(stmt) => self.check_stmt(stmt, return_type, in_loop)?,
                    None => false,
                };
                Ok(tt_returns && ff_returns)
            }
            Stmt::While { guard, body } => {
                let guard_ty = self.check_expr(guard)?;
                if !guard_ty.is_compatible(&Type::Int) {
                    return Err(TypeError::new(format!(
                        "non-int type {guard_ty} for while guard '{guard}'"
                    )));
                }

                self.check_stmt(body, return_type, true)?;
                // The guard may be false on entry, so the body never counts.
                Ok(false)
            }
            Stmt::Break => {
                if !in_loop {
                    return Err(TypeError::new("break outside loop"));
                }
                Ok(false)
            }
            Stmt::Continue => {
                if !in_loop {
                    return Err(TypeError::new("continue outside loop"));
                }
                Ok(false)
            }
            Stmt::Return(Some(expr)) => {
                let expr_ty = self.check_expr(expr)?;
                if !expr_ty.is_compatible(return_type) {
                    return Err(TypeError::new(format!(
                        "incompatible return type {expr_ty} for 'return {expr}', should be {return_type}"
                    )));
                }
                Ok(true)
            }
            // An empty return is always rejected, even for int-returning
            // functions.
            Stmt::Return(None) => {
                if !return_type.is_compatible(&Type::Int) {
                    Err(TypeError::new(format!(
                        "missing return expression for non-int function type {return_type}"
                    )))
                } else {
                    Err(TypeError::new(
                        "return statement requires an expression in this function",
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Place};
    use crate::typecheck::environment::{Delta, Gamma};

    fn id(name: &str) -> Expr {
        Expr::Value(Place::Identifier(name.to_string()))
    }

    fn ret(expr: Expr) -> Stmt {
        Stmt::Return(Some(expr))
    }

    fn check(stmts: &[Stmt]) -> TypecheckResult<bool> {
        let mut gamma = Gamma::new();
        gamma.insert("x".to_string(), Type::Int);
        gamma.insert("p".to_string(), Type::Ptr(Box::new(Type::Int)));
        let delta = Delta::new();
        let checker = Checker {
            gamma: &gamma,
            delta: &delta,
        };
        checker.check_block(stmts, &Type::Int, false)
    }

    #[test]
    fn test_assignment() {
        let ok = Stmt::Assign {
            place: Place::Identifier("x".to_string()),
            value: Expr::Number(1),
        };
        assert_eq!(check(&[ok]).unwrap(), false);

        let nil_rhs = Stmt::Assign {
            place: Place::Identifier("p".to_string()),
            value: Expr::Nil,
        };
        assert_eq!(check(&[nil_rhs]).unwrap(), false);

        let mismatch = Stmt::Assign {
            place: Place::Identifier("x".to_string()),
            value: id("p"),
        };
        let err = check(&[mismatch]).unwrap_err();
        assert!(err.message.contains("incompatible types Int vs Ptr(Int) for assignment"));
    }

    #[test]
    fn test_assignment_to_nil_typed_place_fails() {
        let mut gamma = Gamma::new();
        gamma.insert("n".to_string(), Type::Nil);
        let delta = Delta::new();
        let checker = Checker {
            gamma: &gamma,
            delta: &delta,
        };
        let stmt = Stmt::Assign {
            place: Place::Identifier("n".to_string()),
            value: Expr::Nil,
        };
        let err = checker.check_stmt(&stmt, &Type::Int, false).unwrap_err();
        assert!(err.message.contains("invalid type Nil for left-hand side"));
    }

    #[test]
    fn test_return_with_expression_guarantees() {
        assert_eq!(check(&[ret(Expr::Number(0))]).unwrap(), true);
    }

    #[test]
    fn test_return_type_mismatch() {
        let err = check(&[ret(id("p"))]).unwrap_err();
        assert!(err.message.contains("incompatible return type Ptr(Int)"));
        assert!(err.message.contains("should be Int"));
    }

    #[test]
    fn test_empty_return_always_fails() {
        let err = check(&[Stmt::Return(None)]).unwrap_err();
        assert_eq!(
            err.message,
            "return statement requires an expression in this function"
        );
    }

    #[test]
    fn test_empty_return_for_non_int_function() {
        let gamma = Gamma::new();
        let delta = Delta::new();
        let checker = Checker {
            gamma: &gamma,
            delta: &delta,
        };
        let ret_ty = Type::Ptr(Box::new(Type::Int));
        let err = checker
            .check_stmt(&Stmt::Return(None), &ret_ty, false)
            .unwrap_err();
        assert_eq!(
            err.message,
            "missing return expression for non-int function type Ptr(Int)"
        );
    }

    #[test]
    fn test_if_without_else_does_not_guarantee() {
        let stmt = Stmt::If {
            guard: Expr::Number(1),
            tt: Box::new(ret(Expr::Number(0))),
            ff: None,
        };
        assert_eq!(check(&[stmt]).unwrap(), false);
    }

    #[test]
    fn test_if_with_both_branches_returning_guarantees() {
        let stmt = Stmt::If {
            guard: Expr::Number(1),
            tt: Box::new(ret(Expr::Number(0))),
            ff: Some(Box::new(ret(Expr::Number(1)))),
        };
        assert_eq!(check(&[stmt]).unwrap(), true);
    }

    #[test]
    fn test_if_guard_must_be_int() {
        let stmt = Stmt::If {
            guard: Expr::Nil,
            tt: Box::new(Stmt::Block(vec![])),
            ff: None,
        };
        let err = check(&[stmt]).unwrap_err();
        assert!(err.message.contains("non-int type Nil for if guard"));
    }

    #[test]
    fn test_while_never_guarantees_return() {
        let stmt = Stmt::While {
            guard: Expr::Number(1),
            body: Box::new(ret(Expr::Number(0))),
        };
        assert_eq!(check(&[stmt]).unwrap(), false);
    }

    #[test]
    fn test_while_guard_must_be_int() {
        let stmt = Stmt::While {
            guard: id("p"),
            body: Box::new(Stmt::Block(vec![])),
        };
        let err = check(&[stmt]).unwrap_err();
        assert!(err.message.contains("non-int type Ptr(Int) for while guard"));
    }

    #[test]
    fn test_break_and_continue_inside_loop() {
        let stmt = Stmt::While {
            guard: Expr::Number(1),
            body: Box::new(Stmt::Block(vec![Stmt::Break, Stmt::Continue])),
        };
        assert_eq!(check(&[stmt]).unwrap(), false);
    }

    #[test]
    fn test_break_outside_loop_fails() {
        let err = check(&[Stmt::Break]).unwrap_err();
        assert_eq!(err.message, "break outside loop");
    }

    #[test]
    fn test_continue_outside_loop_fails_even_under_if() {
        // Being nested in a conditional does not make a loop.
        let stmt = Stmt::If {
            guard: Expr::Number(1),
            tt: Box::new(Stmt::Block(vec![Stmt::Continue])),
            ff: None,
        };
        let err = check(&[stmt]).unwrap_err();
        assert_eq!(err.message, "continue outside loop");
    }

    #[test]
    fn test_statements_after_return_are_still_checked() {
        let stmts = vec![ret(Expr::Number(0)), Stmt::Break];
        let err = check(&stmts).unwrap_err();
        assert_eq!(err.message, "break outside loop");
    }

    #[test]
    fn test_block_accumulates_returns() {
        let stmts = vec![
            Stmt::Assign {
                place: Place::Identifier("x".to_string()),
                value: Expr::Number(1),
            },
            ret(Expr::Number(0)),
        ];
        assert_eq!(check(&stmts).unwrap(), true);
    }
}
