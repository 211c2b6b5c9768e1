//! The Rill type checker.
//!
//! Validation runs in two phases. First the top-level definitions are
//! scanned: names must be unique, an entry point with the right signature
//! must exist, and the environments Γ (names to types) and Δ (struct
//! fields) are built. Then each struct and function body is checked
//! against those environments. Checking is fail-fast and reports the
//! first violation found.

mod environment;
mod errors;
mod expressions;
mod statements;

use std::collections::HashSet;

use crate::ast::{Declaration, FunctionDefinition, Program, StructDefinition, Type};

pub use environment::{Delta, Gamma, build_delta, build_gamma};
pub use errors::{TypeError, TypecheckResult};
pub use expressions::Checker;

/// Name of the program entry point. It is excluded from Γ and may never
/// be called or referenced.
pub(crate) const ENTRY_POINT: &str = "main";

/// Validate a whole program. `Ok(())` means the program is well typed.
pub fn typecheck_program(program: &Program) -> TypecheckResult<()> {
    check_top_level_names(program)?;
    check_entry_point(&program.functions)?;

    let gamma = build_gamma(&program.externs, &program.functions);
    let delta = build_delta(&program.structs);

    for def in &program.structs {
        check_struct(def)?;
    }
    for func in &program.functions {
        check_function(func, &gamma, &delta)?;
    }

    Ok(())
}

/// Struct, extern, and function names share one namespace. The entry
/// point is exempt so a struct or extern named `main` cannot collide
/// with it.
fn check_top_level_names(program: &Program) -> TypecheckResult<()> {
    let mut seen = HashSet::new();

    let struct_names = program.structs.iter().map(|def| &def.name);
    let extern_names = program.externs.iter().map(|ext| &ext.name);
    let function_names = program
        .functions
        .iter()
        .map(|func| &func.name)
        .filter(|name| name.as_str() != ENTRY_POINT);

    for name in struct_names.chain(extern_names).chain(function_names) {
        if !seen.insert(name) {
            return Err(TypeError::new(format!("Duplicate name: {name}")));
        }
    }

    Ok(())
}

fn check_entry_point(functions: &[FunctionDefinition]) -> TypecheckResult<()> {
    // Every function named `main` must conform, not just the first one
    // encountered.
    let mut found = false;
    for func in functions {
        if func.name == ENTRY_POINT {
            if !func.params.is_empty() || !func.return_type.is_compatible(&Type::Int) {
                return Err(TypeError::new(format!(
                    "function '{ENTRY_POINT}' exists but has wrong type, should be '() -> int'"
                )));
            }
            found = true;
        }
    }
    if found {
        Ok(())
    } else {
        Err(TypeError::new(format!(
            "no '{ENTRY_POINT}' function with type '() -> int' exists"
        )))
    }
}

/// A struct needs at least one field, and fields hold only storable
/// types. Nil, bare structs, and bare function types cannot be stored.
fn check_struct(def: &StructDefinition) -> TypecheckResult<()> {
    if def.fields.is_empty() {
        return Err(TypeError::new(format!("empty struct {}", def.name)));
    }

    let mut seen = HashSet::new();
    for field in &def.fields {
        if matches!(field.ty, Type::Nil | Type::Struct(_) | Type::Fn { .. }) {
            return Err(TypeError::new(format!(
                "invalid type {} for struct field {}::{}",
                field.ty, def.name, field.name
            )));
        }
        if !seen.insert(&field.name) {
            return Err(TypeError::new(format!(
                "Duplicate field name '{}' in struct '{}'",
                field.name, def.name
            )));
        }
    }

    Ok(())
}

fn check_function(func: &FunctionDefinition, gamma: &Gamma, delta: &Delta) -> TypecheckResult<()> {
    // Parameters and locals extend a per-function copy of Γ and may
    // shadow top-level names.
    let mut gamma = gamma.clone();
    let mut seen: HashSet<&str> = HashSet::new();

    let bindings: Vec<&Declaration> = func.params.iter().chain(func.locals.iter()).collect();
    for binding in bindings {
        if matches!(binding.ty, Type::Nil | Type::Struct(_) | Type::Fn { .. }) {
            return Err(TypeError::new(format!(
                "invalid type {} for variable {} in function {}",
                binding.ty, binding.name, func.name
            )));
        }
        if !seen.insert(&binding.name) {
            return Err(TypeError::new(format!(
                "Duplicate parameter/local name '{}' in function '{}'",
                binding.name, func.name
            )));
        }
        gamma.insert(binding.name.clone(), binding.ty.clone());
    }

    if func.body.is_empty() {
        return Err(TypeError::new(format!(
            "function {} has an empty body",
            func.name
        )));
    }

    let checker = Checker {
        gamma: &gamma,
        delta,
    };
    let returns = checker.check_block(&func.body, &func.return_type, false)?;
    if !returns {
        return Err(TypeError::new(format!(
            "function {} may not execute a return",
            func.name
        )));
    }

    Ok(())
}
