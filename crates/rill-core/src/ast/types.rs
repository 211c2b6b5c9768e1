//! Type representation for the Rill checker.

use std::fmt;

/// A Rill type. Immutable once built; compared by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Nil,
    /// Nominal struct type; equality is by name only.
    Struct(String),
    Array(Box<Type>),
    Ptr(Box<Type>),
    Fn {
        params: Vec<Type>,
        ret: Box<Type>,
    },
}

impl Type {
    /// Check if two types are compatible under the nil-coercion relation.
    ///
    /// `Nil` unifies with itself and with any array or pointer type, in
    /// either position. Arrays and pointers compare their inner type under
    /// this same relation, so nested nils unify too. Function types require
    /// equal arity with pairwise-compatible parameters and return types.
    pub fn is_compatible(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Int, Type::Int) => true,
            (Type::Nil, Type::Nil) => true,
            (Type::Nil, Type::Array(_)) | (Type::Array(_), Type::Nil) => true,
            (Type::Nil, Type::Ptr(_)) | (Type::Ptr(_), Type::Nil) => true,
            (Type::Struct(a), Type::Struct(b)) => a == b,
            (Type::Array(a), Type::Array(b)) => a.is_compatible(b),
            (Type::Ptr(a), Type::Ptr(b)) => a.is_compatible(b),
            (
                Type::Fn {
                    params: p1,
                    ret: r1,
                },
                Type::Fn {
                    params: p2,
                    ret: r2,
                },
            ) => {
                p1.len() == p2.len()
                    && p1.iter().zip(p2.iter()).all(|(a, b)| a.is_compatible(b))
                    && r1.is_compatible(r2)
            }
            _ => false,
        }
    }

    /// Human-facing rendering: `int`, `nil`, `&int`, `[int]`, `(int) -> int`.
    pub fn pretty(&self) -> String {
        match self {
            Type::Int => "int".to_string(),
            Type::Nil => "nil".to_string(),
            Type::Struct(name) => name.clone(),
            Type::Array(elem) => format!("[{}]", elem.pretty()),
            Type::Ptr(pointee) => format!("&{}", pointee.pretty()),
            Type::Fn { params, ret } => {
                let params = params
                    .iter()
                    .map(Type::pretty)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({}) -> {}", params, ret.pretty())
            }
        }
    }
}

/// Pick whichever of two compatible types is not `Nil`.
///
/// Used to unify select branches: when one branch is the nil literal, the
/// expression takes the concrete type of the other branch.
pub fn pick_non_nil(lhs: Type, rhs: Type) -> Type {
    if lhs == Type::Nil { rhs } else { lhs }
}

impl fmt::Display for Type {
    /// Canonical rendering, mirroring the wire tags: `Ptr(Int)`,
    /// `Struct("p")`, `Fn([Int], Int)`. Used in checker messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Nil => write!(f, "Nil"),
            Type::Struct(name) => write!(f, "Struct(\"{name}\")"),
            Type::Array(elem) => write!(f, "Array({elem})"),
            Type::Ptr(pointee) => write!(f, "Ptr({pointee})"),
            Type::Fn { params, ret } => {
                write!(f, "Fn([")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, "], {ret})")
            }
        }
    }
}
