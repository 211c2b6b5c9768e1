//! Abstract syntax tree definitions for Rill
//!
//! This module defines the node types for expressions, places, statements,
//! and top-level definitions. The type representation lives in the `types`
//! submodule. Every node owns its children; optional children (an else
//! branch, a return expression) are `Option` fields.
//!
//! `Display` implementations reconstruct source-like text for nodes that
//! appear inside checker messages.

use std::fmt;

use serde::Deserialize;

mod types;

pub use types::{Type, pick_non_nil};

/// A typed binding: a parameter, a local, or a struct field.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub ty: Type,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl BinaryOp {
    /// Equality operators accept any comparable pair; everything else is
    /// integer arithmetic/logic.
    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::NotEq)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A place read as a value.
    Value(Place),
    Number(i64),
    Nil,
    /// Ternary selection: `guard` picks between `tt` and `ff`.
    Select {
        guard: Box<Expr>,
        tt: Box<Expr>,
        ff: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Heap allocation of a single cell, yielding a pointer.
    NewSingle(Type),
    /// Heap allocation of an array with a computed size.
    NewArray {
        element: Type,
        size: Box<Expr>,
    },
    Call(FunctionCall),
}

/// An expression form that denotes a storage location.
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    Identifier(String),
    Dereference(Box<Expr>),
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    FieldAccess {
        base: Box<Expr>,
        field: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(Vec<Stmt>),
    Assign {
        place: Place,
        value: Expr,
    },
    Call(FunctionCall),
    If {
        guard: Expr,
        tt: Box<Stmt>,
        ff: Option<Box<Stmt>>,
    },
    While {
        guard: Expr,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Return(Option<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDefinition {
    pub name: String,
    pub fields: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extern {
    pub name: String,
    pub param_types: Vec<Type>,
    pub return_type: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub params: Vec<Declaration>,
    pub return_type: Type,
    pub locals: Vec<Declaration>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub structs: Vec<StructDefinition>,
    pub externs: Vec<Extern>,
    pub functions: Vec<FunctionDefinition>,
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Identifier(name) => write!(f, "Id(\"{name}\")"),
            Place::Dereference(expr) => write!(f, "Deref({expr})"),
            Place::ArrayAccess { array, index } => {
                write!(f, "ArrayAccess {{ array: {array}, index: {index} }}")
            }
            Place::FieldAccess { base, field } => {
                write!(f, "FieldAccess {{ ptr: {base}, field: \"{field}\" }}")
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Value(place) => write!(f, "Val({place})"),
            Expr::Number(value) => write!(f, "{value}"),
            Expr::Nil => write!(f, "Nil"),
            Expr::Select { guard, tt, ff } => {
                write!(f, "Select {{ guard: {guard}, true: {tt}, false: {ff} }}")
            }
            Expr::Unary { op, operand } => {
                let op = match op {
                    UnaryOp::Neg => "- ",
                    UnaryOp::Not => "not ",
                };
                write!(f, "{op}({operand})")
            }
            Expr::Binary { op, left, right } => {
                let op = match op {
                    BinaryOp::Add => " + ",
                    BinaryOp::Sub => " - ",
                    BinaryOp::Mul => " * ",
                    BinaryOp::Div => " / ",
                    BinaryOp::And => " and ",
                    BinaryOp::Or => " or ",
                    BinaryOp::Eq => " == ",
                    BinaryOp::NotEq => " != ",
                    BinaryOp::Lt => " < ",
                    BinaryOp::Lte => " <= ",
                    BinaryOp::Gt => " > ",
                    BinaryOp::Gte => " >= ",
                };
                // A select on the right reads ambiguously without parens.
                if matches!(**right, Expr::Select { .. }) {
                    write!(f, "{left}{op}({right})")
                } else {
                    write!(f, "{left}{op}{right}")
                }
            }
            Expr::NewSingle(ty) => write!(f, "new {ty}"),
            Expr::NewArray { element, size } => write!(f, "NewArray({element}, {size})"),
            Expr::Call(call) => write!(f, "{call}"),
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.callee)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Expr {
        Expr::Value(Place::Identifier(name.to_string()))
    }

    #[test]
    fn test_place_display() {
        assert_eq!(Place::Identifier("x".to_string()).to_string(), "Id(\"x\")");
        assert_eq!(
            Place::Dereference(Box::new(id("p"))).to_string(),
            "Deref(Val(Id(\"p\")))"
        );
        assert_eq!(
            Place::FieldAccess {
                base: Box::new(id("p")),
                field: "x".to_string(),
            }
            .to_string(),
            "FieldAccess { ptr: Val(Id(\"p\")), field: \"x\" }"
        );
    }

    #[test]
    fn test_expr_display() {
        let sum = Expr::Binary {
            op: BinaryOp::Add,
            left: Box::new(id("x")),
            right: Box::new(Expr::Number(1)),
        };
        assert_eq!(sum.to_string(), "Val(Id(\"x\")) + 1");

        let not = Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::Number(0)),
        };
        assert_eq!(not.to_string(), "not (0)");

        assert_eq!(
            Expr::NewSingle(Type::Struct("p".to_string())).to_string(),
            "new Struct(\"p\")"
        );
    }

    #[test]
    fn test_select_on_rhs_is_parenthesized() {
        let select = Expr::Select {
            guard: Box::new(Expr::Number(1)),
            tt: Box::new(Expr::Number(2)),
            ff: Box::new(Expr::Number(3)),
        };
        let sum = Expr::Binary {
            op: BinaryOp::Add,
            left: Box::new(Expr::Number(1)),
            right: Box::new(select),
        };
        assert_eq!(
            sum.to_string(),
            "1 + (Select { guard: 1, true: 2, false: 3 })"
        );
    }

    #[test]
    fn test_call_display() {
        let call = FunctionCall {
            callee: Box::new(id("f")),
            args: vec![Expr::Number(1), Expr::Nil],
        };
        assert_eq!(call.to_string(), "Val(Id(\"f\"))(1, Nil)");
    }
}
