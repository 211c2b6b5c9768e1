//! Decoding of the JSON tree document into the syntax tree.
//!
//! The input program arrives as a tagged JSON document. Decoding is
//! purely schema-driven: every shape violation is a [`DecodeError`],
//! raised strictly before any type checking happens. Operator tags are deserialized straight into the
//! [`UnaryOp`]/[`BinaryOp`] enums via serde.

use std::fmt;

use serde_json::Value;

use crate::ast::{
    BinaryOp, Declaration, Expr, Extern, FunctionCall, FunctionDefinition, Place, Program, Stmt,
    StructDefinition, Type, UnaryOp,
};

/// A malformed-input failure: the document does not match the expected
/// tree schema.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        DecodeError {
            message: message.into(),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DecodeError {}

type DecodeResult<T> = Result<T, DecodeError>;

/// Get the single `tag: content` entry of a tagged object.
fn single_entry<'a>(value: &'a Value, what: &str) -> DecodeResult<(&'a str, &'a Value)> {
    let object = value
        .as_object()
        .filter(|o| !o.is_empty())
        .ok_or_else(|| DecodeError::new(format!("invalid document for {what}: must be a non-empty object, got {value}")))?;
    if object.len() != 1 {
        return Err(DecodeError::new(format!(
            "invalid document for {what}: expected a single-key tagged object, got {value}"
        )));
    }
    let (key, content) = object.iter().next().expect("object is non-empty");
    Ok((key.as_str(), content))
}

fn string_field<'a>(value: &'a Value, key: &str, what: &str) -> DecodeResult<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::new(format!("invalid document for {what}: missing string '{key}'")))
}

pub fn decode_type(value: &Value) -> DecodeResult<Type> {
    if let Some(kind) = value.as_str() {
        return match kind {
            "Int" => Ok(Type::Int),
            "Nil" => Ok(Type::Nil),
            _ => Err(DecodeError::new(format!("unknown simple type string: {kind}"))),
        };
    }

    if let Some(object) = value.as_object() {
        if let Some(name) = object.get("Struct") {
            let name = name
                .as_str()
                .ok_or_else(|| DecodeError::new("invalid document for Struct type: name must be a string"))?;
            return Ok(Type::Struct(name.to_string()));
        }

        if let Some(pointee) = object.get("Ptr") {
            return Ok(Type::Ptr(Box::new(decode_type(pointee)?)));
        }

        if let Some(element) = object.get("Array") {
            return Ok(Type::Array(Box::new(decode_type(element)?)));
        }

        if let Some(signature) = object.get("Fn") {
            let parts = signature
                .as_array()
                .filter(|parts| parts.len() == 2)
                .ok_or_else(|| DecodeError::new("invalid document for Fn type: expected [[params], return]"))?;
            let params = parts[0]
                .as_array()
                .ok_or_else(|| DecodeError::new("invalid document for Fn type: parameter list must be an array"))?
                .iter()
                .map(decode_type)
                .collect::<DecodeResult<Vec<_>>>()?;
            let ret = decode_type(&parts[1])?;
            return Ok(Type::Fn {
                params,
                ret: Box::new(ret),
            });
        }

        // Legacy object encoding of the simple types.
        if let Some(kind) = object.get("kind").and_then(Value::as_str) {
            match kind {
                "Int" => return Ok(Type::Int),
                "Nil" => return Ok(Type::Nil),
                _ => {}
            }
        }
    }

    Err(DecodeError::new(format!("invalid document for Type: {value}")))
}

pub fn decode_declaration(value: &Value) -> DecodeResult<Declaration> {
    let name = string_field(value, "name", "Decl")?.to_string();
    let typ = value
        .get("typ")
        .ok_or_else(|| DecodeError::new("invalid document for Decl: missing 'typ'"))?;
    Ok(Declaration {
        name,
        ty: decode_type(typ)?,
    })
}

pub fn decode_place(value: &Value) -> DecodeResult<Place> {
    let (key, content) = single_entry(value, "Place")?;

    match key {
        "Id" => {
            let name = content
                .as_str()
                .ok_or_else(|| DecodeError::new("invalid document for Id: name must be a string"))?;
            Ok(Place::Identifier(name.to_string()))
        }
        "Deref" => Ok(Place::Dereference(Box::new(decode_expr(content)?))),
        "ArrayAccess" => {
            let array = content
                .get("array")
                .ok_or_else(|| DecodeError::new("invalid document for ArrayAccess: missing 'array'"))?;
            let index = content
                .get("idx")
                .ok_or_else(|| DecodeError::new("invalid document for ArrayAccess: missing 'idx'"))?;
            Ok(Place::ArrayAccess {
                array: Box::new(decode_expr(array)?),
                index: Box::new(decode_expr(index)?),
            })
        }
        "FieldAccess" => {
            let base = content
                .get("ptr")
                .ok_or_else(|| DecodeError::new("invalid document for FieldAccess: missing 'ptr'"))?;
            let field = string_field(content, "field", "FieldAccess")?.to_string();
            Ok(Place::FieldAccess {
                base: Box::new(decode_expr(base)?),
                field,
            })
        }
        _ => Err(DecodeError::new(format!("unknown place kind: {key}"))),
    }
}

pub fn decode_expr(value: &Value) -> DecodeResult<Expr> {
    // The nil literal may appear as a bare string.
    if value.as_str() == Some("Nil") {
        return Ok(Expr::Nil);
    }

    let (key, content) = single_entry(value, "Exp")?;

    match key {
        // A bare place in expression position reads the place as a value.
        "Id" | "Deref" | "ArrayAccess" | "FieldAccess" => Ok(Expr::Value(decode_place(value)?)),
        "Num" => {
            let number = content
                .as_i64()
                .ok_or_else(|| DecodeError::new("invalid document for Num: expected an integer"))?;
            Ok(Expr::Number(number))
        }
        "Nil" => Ok(Expr::Nil),
        "Select" => {
            let guard = content
                .get("guard")
                .ok_or_else(|| DecodeError::new("invalid document for Select: missing 'guard'"))?;
            let tt = content
                .get("tt")
                .ok_or_else(|| DecodeError::new("invalid document for Select: missing 'tt'"))?;
            let ff = content
                .get("ff")
                .ok_or_else(|| DecodeError::new("invalid document for Select: missing 'ff'"))?;
            Ok(Expr::Select {
                guard: Box::new(decode_expr(guard)?),
                tt: Box::new(decode_expr(tt)?),
                ff: Box::new(decode_expr(ff)?),
            })
        }
        "UnOp" => {
            let parts = content
                .as_array()
                .filter(|parts| parts.len() == 2)
                .ok_or_else(|| DecodeError::new("invalid document for UnOp: expected [op, exp]"))?;
            let op: UnaryOp = serde_json::from_value(parts[0].clone())
                .map_err(|_| DecodeError::new(format!("unknown unary operator: {}", parts[0])))?;
            Ok(Expr::Unary {
                op,
                operand: Box::new(decode_expr(&parts[1])?),
            })
        }
        "BinOp" => {
            let op = content
                .get("op")
                .ok_or_else(|| DecodeError::new("invalid document for BinOp: missing 'op'"))?;
            let op: BinaryOp = serde_json::from_value(op.clone())
                .map_err(|_| DecodeError::new(format!("unknown binary operator: {op}")))?;
            let left = content
                .get("left")
                .ok_or_else(|| DecodeError::new("invalid document for BinOp: missing 'left'"))?;
            let right = content
                .get("right")
                .ok_or_else(|| DecodeError::new("invalid document for BinOp: missing 'right'"))?;
            Ok(Expr::Binary {
                op,
                left: Box::new(decode_expr(left)?),
                right: Box::new(decode_expr(right)?),
            })
        }
        "NewSingle" => Ok(Expr::NewSingle(decode_type(content)?)),
        "NewArray" => {
            let parts = content
                .as_array()
                .filter(|parts| parts.len() == 2)
                .ok_or_else(|| DecodeError::new("invalid document for NewArray: expected [Type, exp]"))?;
            Ok(Expr::NewArray {
                element: decode_type(&parts[0])?,
                size: Box::new(decode_expr(&parts[1])?),
            })
        }
        "Call" => Ok(Expr::Call(decode_call(content)?)),
        "Val" => Ok(Expr::Value(decode_place(content)?)),
        _ => Err(DecodeError::new(format!("unknown expression kind: {key}"))),
    }
}

pub fn decode_call(value: &Value) -> DecodeResult<FunctionCall> {
    let callee = value
        .get("callee")
        .ok_or_else(|| DecodeError::new("invalid document for Call: missing 'callee'"))?;
    let args = value
        .get("args")
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::new("invalid document for Call: 'args' must be an array"))?;
    Ok(FunctionCall {
        callee: Box::new(decode_expr(callee)?),
        args: args.iter().map(decode_expr).collect::<DecodeResult<_>>()?,
    })
}

pub fn decode_stmt(value: &Value) -> DecodeResult<Stmt> {
    // A bare array is a sequential block.
    if let Some(items) = value.as_array() {
        let stmts = items.iter().map(decode_stmt).collect::<DecodeResult<_>>()?;
        return Ok(Stmt::Block(stmts));
    }

    if let Some(kind) = value.as_str() {
        return match kind {
            "Break" => Ok(Stmt::Break),
            "Continue" => Ok(Stmt::Continue),
            _ => Err(DecodeError::new(format!("unknown simple statement: {kind}"))),
        };
    }

    let (key, content) = single_entry(value, "Stmt")?;

    match key {
        "Assign" => {
            let parts = content
                .as_array()
                .filter(|parts| parts.len() == 2)
                .ok_or_else(|| DecodeError::new("invalid document for Assign: expected [Place, exp]"))?;
            Ok(Stmt::Assign {
                place: decode_place(&parts[0])?,
                value: decode_expr(&parts[1])?,
            })
        }
        "Call" => Ok(Stmt::Call(decode_call(content)?)),
        "If" => {
            let guard = content
                .get("guard")
                .ok_or_else(|| DecodeError::new("invalid document for If: missing 'guard'"))?;
            let tt = content
                .get("tt")
                .ok_or_else(|| DecodeError::new("invalid document for If: missing 'tt'"))?;
            // A missing, null, or empty-array else branch means no else.
            let ff = match content.get("ff") {
                None | Some(Value::Null) => None,
                Some(Value::Array(items)) if items.is_empty() => None,
                Some(ff) => Some(Box::new(decode_stmt(ff)?)),
            };
            Ok(Stmt::If {
                guard: decode_expr(guard)?,
                tt: Box::new(decode_stmt(tt)?),
                ff,
            })
        }
        "While" => {
            let parts = content
                .as_array()
                .filter(|parts| parts.len() == 2)
                .ok_or_else(|| DecodeError::new("invalid document for While: expected [guard, body]"))?;
            Ok(Stmt::While {
                guard: decode_expr(&parts[0])?,
                body: Box::new(decode_stmt(&parts[1])?),
            })
        }
        "Return" => {
            let expr = match content {
                Value::Null => None,
                other => Some(decode_expr(other)?),
            };
            Ok(Stmt::Return(expr))
        }
        "Stmts" => {
            let items = content
                .as_array()
                .ok_or_else(|| DecodeError::new("invalid document for Stmts: expected an array"))?;
            let stmts = items.iter().map(decode_stmt).collect::<DecodeResult<_>>()?;
            Ok(Stmt::Block(stmts))
        }
        _ => Err(DecodeError::new(format!("unknown statement kind: {key}"))),
    }
}

pub fn decode_struct(value: &Value) -> DecodeResult<StructDefinition> {
    let name = string_field(value, "name", "Struct definition")?.to_string();
    let fields = value
        .get("fields")
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::new("invalid document for Struct definition: 'fields' must be an array"))?;
    Ok(StructDefinition {
        name,
        fields: fields
            .iter()
            .map(decode_declaration)
            .collect::<DecodeResult<_>>()?,
    })
}

pub fn decode_extern(value: &Value) -> DecodeResult<Extern> {
    let name = string_field(value, "name", "Extern definition")?.to_string();
    let typ = value
        .get("typ")
        .ok_or_else(|| DecodeError::new("invalid document for Extern definition: missing 'typ'"))?;
    match decode_type(typ)? {
        Type::Fn { params, ret } => Ok(Extern {
            name,
            param_types: params,
            return_type: *ret,
        }),
        other => Err(DecodeError::new(format!(
            "invalid document for Extern definition: 'typ' is {other}, not a function type"
        ))),
    }
}

pub fn decode_function(value: &Value) -> DecodeResult<FunctionDefinition> {
    let name = string_field(value, "name", "Function definition")?.to_string();
    let params = value
        .get("prms")
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::new("invalid document for Function definition: 'prms' must be an array"))?;
    let return_type = value
        .get("rettyp")
        .ok_or_else(|| DecodeError::new("invalid document for Function definition: missing 'rettyp'"))?;
    let locals = value
        .get("locals")
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::new("invalid document for Function definition: 'locals' must be an array"))?;
    let stmts = value
        .get("stmts")
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::new("invalid document for Function definition: 'stmts' must be an array"))?;

    Ok(FunctionDefinition {
        name,
        params: params
            .iter()
            .map(decode_declaration)
            .collect::<DecodeResult<_>>()?,
        return_type: decode_type(return_type)?,
        locals: locals
            .iter()
            .map(decode_declaration)
            .collect::<DecodeResult<_>>()?,
        body: stmts.iter().map(decode_stmt).collect::<DecodeResult<_>>()?,
    })
}

/// Decode a whole program document: a root object with `structs`,
/// `externs`, and `functions` arrays.
pub fn decode_program(value: &Value) -> DecodeResult<Program> {
    let structs = value
        .get("structs")
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::new("invalid document for Program: 'structs' must be an array"))?;
    let externs = value
        .get("externs")
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::new("invalid document for Program: 'externs' must be an array"))?;
    let functions = value
        .get("functions")
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::new("invalid document for Program: 'functions' must be an array"))?;

    Ok(Program {
        structs: structs.iter().map(decode_struct).collect::<DecodeResult<_>>()?,
        externs: externs.iter().map(decode_extern).collect::<DecodeResult<_>>()?,
        functions: functions
            .iter()
            .map(decode_function)
            .collect::<DecodeResult<_>>()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_simple_types() {
        assert_eq!(decode_type(&json!("Int")).unwrap(), Type::Int);
        assert_eq!(decode_type(&json!("Nil")).unwrap(), Type::Nil);
        assert_eq!(
            decode_type(&json!({"kind": "Int"})).unwrap(),
            Type::Int
        );
        assert!(decode_type(&json!("Bool")).is_err());
    }

    #[test]
    fn test_decode_compound_types() {
        assert_eq!(
            decode_type(&json!({"Struct": "p"})).unwrap(),
            Type::Struct("p".to_string())
        );
        assert_eq!(
            decode_type(&json!({"Ptr": "Int"})).unwrap(),
            Type::Ptr(Box::new(Type::Int))
        );
        assert_eq!(
            decode_type(&json!({"Array": {"Ptr": "Int"}})).unwrap(),
            Type::Array(Box::new(Type::Ptr(Box::new(Type::Int))))
        );
        assert_eq!(
            decode_type(&json!({"Fn": [["Int"], "Nil"]})).unwrap(),
            Type::Fn {
                params: vec![Type::Int],
                ret: Box::new(Type::Nil),
            }
        );
    }

    #[test]
    fn test_decode_malformed_fn_type() {
        assert!(decode_type(&json!({"Fn": ["Int", "Nil"]})).is_err());
        assert!(decode_type(&json!({"Fn": [["Int"]]})).is_err());
    }

    #[test]
    fn test_decode_places() {
        assert_eq!(
            decode_place(&json!({"Id": "x"})).unwrap(),
            Place::Identifier("x".to_string())
        );
        let access = decode_place(&json!({"ArrayAccess": {"array": {"Id": "a"}, "idx": {"Num": 0}}}))
            .unwrap();
        assert!(matches!(access, Place::ArrayAccess { .. }));
        assert!(decode_place(&json!({"ArrayAccess": {"array": {"Id": "a"}}})).is_err());
    }

    #[test]
    fn test_decode_nil_forms() {
        assert_eq!(decode_expr(&json!("Nil")).unwrap(), Expr::Nil);
        assert_eq!(decode_expr(&json!({"Nil": null})).unwrap(), Expr::Nil);
    }

    #[test]
    fn test_place_in_expression_position_wraps_into_value() {
        let expr = decode_expr(&json!({"Id": "x"})).unwrap();
        assert_eq!(expr, Expr::Value(Place::Identifier("x".to_string())));
        let expr = decode_expr(&json!({"Val": {"Id": "x"}})).unwrap();
        assert_eq!(expr, Expr::Value(Place::Identifier("x".to_string())));
    }

    #[test]
    fn test_decode_operators() {
        let neg = decode_expr(&json!({"UnOp": ["Neg", {"Num": 1}]})).unwrap();
        assert!(matches!(
            neg,
            Expr::Unary {
                op: UnaryOp::Neg,
                ..
            }
        ));
        let cmp =
            decode_expr(&json!({"BinOp": {"op": "NotEq", "left": {"Num": 1}, "right": "Nil"}}))
                .unwrap();
        assert!(matches!(
            cmp,
            Expr::Binary {
                op: BinaryOp::NotEq,
                ..
            }
        ));
        assert!(decode_expr(&json!({"UnOp": ["Minus", {"Num": 1}]})).is_err());
        assert!(
            decode_expr(&json!({"BinOp": {"op": "Xor", "left": {"Num": 1}, "right": {"Num": 2}}}))
                .is_err()
        );
    }

    #[test]
    fn test_decode_statement_forms() {
        assert_eq!(decode_stmt(&json!("Break")).unwrap(), Stmt::Break);
        assert_eq!(decode_stmt(&json!("Continue")).unwrap(), Stmt::Continue);
        assert!(decode_stmt(&json!("Halt")).is_err());

        let block = decode_stmt(&json!(["Break", "Continue"])).unwrap();
        assert_eq!(block, Stmt::Block(vec![Stmt::Break, Stmt::Continue]));

        let nested = decode_stmt(&json!({"Stmts": ["Break"]})).unwrap();
        assert_eq!(nested, Stmt::Block(vec![Stmt::Break]));
    }

    #[test]
    fn test_decode_if_else_forms() {
        let bare = decode_stmt(&json!({"If": {"guard": {"Num": 1}, "tt": ["Break"]}})).unwrap();
        assert!(matches!(bare, Stmt::If { ff: None, .. }));

        let null_ff =
            decode_stmt(&json!({"If": {"guard": {"Num": 1}, "tt": ["Break"], "ff": null}}))
                .unwrap();
        assert!(matches!(null_ff, Stmt::If { ff: None, .. }));

        let empty_ff = decode_stmt(&json!({"If": {"guard": {"Num": 1}, "tt": ["Break"], "ff": []}}))
            .unwrap();
        assert!(matches!(empty_ff, Stmt::If { ff: None, .. }));

        let with_ff =
            decode_stmt(&json!({"If": {"guard": {"Num": 1}, "tt": ["Break"], "ff": ["Continue"]}}))
                .unwrap();
        assert!(matches!(with_ff, Stmt::If { ff: Some(_), .. }));
    }

    #[test]
    fn test_decode_return_forms() {
        assert_eq!(decode_stmt(&json!({"Return": null})).unwrap(), Stmt::Return(None));
        assert_eq!(
            decode_stmt(&json!({"Return": {"Num": 0}})).unwrap(),
            Stmt::Return(Some(Expr::Number(0)))
        );
    }

    #[test]
    fn test_decode_extern_requires_fn_type() {
        let ok = decode_extern(&json!({"name": "getc", "typ": {"Fn": [[], "Int"]}})).unwrap();
        assert_eq!(ok.name, "getc");
        assert_eq!(ok.return_type, Type::Int);
        assert!(decode_extern(&json!({"name": "getc", "typ": "Int"})).is_err());
    }

    #[test]
    fn test_decode_program_requires_all_sections() {
        let ok = decode_program(&json!({"structs": [], "externs": [], "functions": []})).unwrap();
        assert!(ok.structs.is_empty() && ok.externs.is_empty() && ok.functions.is_empty());
        assert!(decode_program(&json!({"structs": [], "externs": []})).is_err());
        assert!(decode_program(&json!([])).is_err());
    }

    #[test]
    fn test_decode_function_definition() {
        let f = decode_function(&json!({
            "name": "main",
            "prms": [],
            "rettyp": "Int",
            "locals": [{"name": "x", "typ": "Int"}],
            "stmts": [{"Return": {"Num": 0}}],
        }))
        .unwrap();
        assert_eq!(f.name, "main");
        assert_eq!(f.locals.len(), 1);
        assert_eq!(f.body.len(), 1);
        assert!(decode_function(&json!({"name": "main"})).is_err());
    }
}
