//! Expression and place type checking.

use crate::ast::{Expr, FunctionCall, Place, Type, pick_non_nil};

use super::ENTRY_POINT;
use super::environment::{Delta, Gamma};
use super::errors::{TypeError, TypecheckResult};

/// The recursive checker. Holds the read-only environments; every check
/// method is a pure function of the node and these.
pub struct Checker<'a> {
    pub gamma: &'a Gamma,
    pub delta: &'a Delta,
}

impl Checker<'_> {
    /// Assign a type to an expression, or fail with the first violation.
    pub fn check_expr(&self, expr: &Expr) -> TypecheckResult<Type> {
        match expr {
            Expr::Value(place) => self.check_place(place),
            Expr::Number(_) => Ok(Type::Int),
            Expr::Nil => Ok(Type::Nil),
            Expr::Select { guard, tt, ff } => {
                let guard_ty = self.check_expr(guard)?;
                if !guard_ty.is_compatible(&Type::Int) {
                    return Err(TypeError::new(format!(
                        "non-int type {guard_ty} for select guard '{guard}'"
                    )));
                }

                let tt_ty = self.check_expr(tt)?;
                let ff_ty = self.check_expr(ff)?;
                if !tt_ty.is_compatible(&ff_ty) {
                    return Err(TypeError::new(format!(
                        "incompatible types {tt_ty} vs {ff_ty} in select branches '{tt}' vs '{ff}'"
                    )));
                }

                // Nil-as-bottom: a nil branch takes the other branch's type.
                Ok(pick_non_nil(tt_ty, ff_ty))
            }
            Expr::Unary { operand, .. } => {
                let operand_ty = self.check_expr(operand)?;
                if !operand_ty.is_compatible(&Type::Int) {
                    return Err(TypeError::new(format!(
                        "non-int operand type {operand_ty} in unary op '{expr}'"
                    )));
                }
                Ok(Type::Int)
            }
            Expr::Binary { op, left, right } => {
                let left_ty = self.check_expr(left)?;
                let right_ty = self.check_expr(right)?;

                if op.is_equality() {
                    if !left_ty.is_compatible(&right_ty) {
                        return Err(TypeError::new(format!(
                            "incompatible types {left_ty} vs {right_ty} in binary op '{expr}'"
                        )));
                    }
                    // Structs and functions carry no equality.
                    for ty in [&left_ty, &right_ty] {
                        if matches!(ty, Type::Struct(_) | Type::Fn { .. }) {
                            return Err(TypeError::new(format!(
                                "invalid type {ty} used in binary op '{expr}'"
                            )));
                        }
                    }
                } else {
                    if !left_ty.is_compatible(&Type::Int) {
                        return Err(TypeError::new(format!(
                            "non-int type {left_ty} for left operand of binary op '{expr}'"
                        )));
                    }
                    if !right_ty.is_compatible(&Type::Int) {
                        return Err(TypeError::new(format!(
                            "right operand of binary op '{expr}' has type {right_ty}, should be int"
                        )));
                    }
                }

                Ok(Type::Int)
            }
            Expr::NewSingle(ty) => {
                if matches!(ty, Type::Nil | Type::Fn { .. }) {
                    return Err(TypeError::new(format!(
                        "invalid type used for allocation '{expr}'"
                    )));
                }
                Ok(Type::Ptr(Box::new(ty.clone())))
            }
            Expr::NewArray { element, size } => {
                let size_ty = self.check_expr(size)?;
                if !size_ty.is_compatible(&Type::Int) {
                    return Err(TypeError::new(format!(
                        "non-int type {size_ty} used for second argument of allocation '{expr}'"
                    )));
                }
                if matches!(element, Type::Nil | Type::Fn { .. } | Type::Struct(_)) {
                    return Err(TypeError::new(format!(
                        "invalid type used for first argument of allocation '{expr}'"
                    )));
                }
                Ok(Type::Array(Box::new(element.clone())))
            }
            Expr::Call(call) => self.check_call(call),
        }
    }

    /// Assign a type to a place.
    pub fn check_place(&self, place: &Place) -> TypecheckResult<Type> {
        match place {
            Place::Identifier(name) => match self.gamma.get(name) {
                Some(ty) => Ok(ty.clone()),
                None => Err(TypeError::new(format!(
                    "id {name} does not exist in this scope"
                ))),
            },
            Place::Dereference(expr) => {
                let ty = self.check_expr(expr)?;
                // Nil carries no pointee, so it cannot be dereferenced.
                match ty {
                    Type::Ptr(pointee) => Ok(*pointee),
                    other => Err(TypeError::new(format!(
                        "non-pointer type {other} for dereference '{expr}.*'"
                    ))),
                }
            }
            Place::ArrayAccess { array, index } => {
                let array_ty = self.check_expr(array)?;
                let index_ty = self.check_expr(index)?;

                if !index_ty.is_compatible(&Type::Int) {
                    return Err(TypeError::new(format!(
                        "non-int index type {index_ty} for array access '{array}'"
                    )));
                }

                // A nil array is rejected too: its element type is unknown.
                match array_ty {
                    Type::Array(element) => Ok(*element),
                    other => Err(TypeError::new(format!(
                        "non-array type {other} for array access '{array}'"
                    ))),
                }
            }
            Place::FieldAccess { base, field } => {
                let base_ty = self.check_expr(base)?;

                let Type::Ptr(pointee) = &base_ty else {
                    return Err(TypeError::new(format!(
                        "<{base_ty}> is not a struct pointer type in field access '{place}'"
                    )));
                };
                let Type::Struct(struct_name) = pointee.as_ref() else {
                    return Err(TypeError::new(format!(
                        "pointer type <{base_ty}> does not point to a struct in field access '{place}'"
                    )));
                };

                let Some(fields) = self.delta.get(struct_name) else {
                    return Err(TypeError::new(format!(
                        "non-existent struct type {struct_name} in field access '{place}'"
                    )));
                };
                match fields.get(field) {
                    Some(ty) => Ok(ty.clone()),
                    None => Err(TypeError::new(format!(
                        "non-existent field {struct_name}::{field} in field access '{place}'"
                    ))),
                }
            }
        }
    }

    /// Check a call and produce the callee's declared return type.
    pub fn check_call(&self, call: &FunctionCall) -> TypecheckResult<Type> {
        // The entry point may never be called, not even through a value
        // wrapper around its bare name.
        if let Expr::Value(Place::Identifier(name)) = call.callee.as_ref()
            && name == ENTRY_POINT
        {
            return Err(TypeError::new(format!("trying to call '{ENTRY_POINT}'")));
        }

        let callee_ty = self.check_expr(&call.callee)?;
        let signature = match &callee_ty {
            Type::Fn { params, ret } => Some((params, ret)),
            Type::Ptr(pointee) => match pointee.as_ref() {
                Type::Fn { params, ret } => Some((params, ret)),
                _ => None,
            },
            _ => None,
        };
        let Some((params, ret)) = signature else {
            return Err(TypeError::new(format!(
                "trying to call type {callee_ty} as function pointer in call '{call}'"
            )));
        };

        if call.args.len() != params.len() {
            return Err(TypeError::new(format!(
                "incorrect number of arguments ({} vs {}) in call '{call}'",
                call.args.len(),
                params.len()
            )));
        }

        for (arg, param_ty) in call.args.iter().zip(params) {
            let arg_ty = self.check_expr(arg)?;
            if !arg_ty.is_compatible(param_ty) {
                return Err(TypeError::new(format!(
                    "incompatible argument type {arg_ty} vs parameter type {param_ty} \
                     for argument '{arg}' in call '{call}'"
                )));
            }
        }

        Ok(ret.as_ref().clone())
    }
}
