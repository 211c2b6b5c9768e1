//! The checking environments Γ and Δ.
//!
//! Both are built once per validation run from the top-level definitions
//! and stay read-only while the checker walks the tree.

use std::collections::HashMap;

use crate::ast::{Extern, FunctionDefinition, StructDefinition, Type};

use super::ENTRY_POINT;

/// Γ: name → type, for identifier resolution.
pub type Gamma = HashMap<String, Type>;

/// Δ: struct name → field name → type, for field resolution.
pub type Delta = HashMap<String, HashMap<String, Type>>;

/// Build Γ from the externs and function definitions.
///
/// Externs map to their function type directly. Function definitions other
/// than the entry point map to a pointer to their function type, so a
/// function designator used as a value decays to a function pointer.
/// Duplicate keys silently overwrite; duplicate-name rejection is the
/// program check's job.
pub fn build_gamma(externs: &[Extern], functions: &[FunctionDefinition]) -> Gamma {
    let mut gamma = Gamma::new();

    for ext in externs {
        gamma.insert(
            ext.name.clone(),
            Type::Fn {
                params: ext.param_types.clone(),
                ret: Box::new(ext.return_type.clone()),
            },
        );
    }

    for func in functions {
        if func.name != ENTRY_POINT {
            let signature = Type::Fn {
                params: func.params.iter().map(|p| p.ty.clone()).collect(),
                ret: Box::new(func.return_type.clone()),
            };
            gamma.insert(func.name.clone(), Type::Ptr(Box::new(signature)));
        }
    }

    gamma
}

/// Build Δ from the struct definitions. Field order carries no meaning.
pub fn build_delta(structs: &[StructDefinition]) -> Delta {
    let mut delta = Delta::new();

    for def in structs {
        let fields = def
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.ty.clone()))
            .collect();
        delta.insert(def.name.clone(), fields);
    }

    delta
}
