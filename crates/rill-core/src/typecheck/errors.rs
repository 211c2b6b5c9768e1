//! Type checking error types and result types.

use std::fmt;

/// A type error with a descriptive message.
///
/// Messages quote the offending construct in reconstructed source-like
/// form along with the canonical names of the conflicting types.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub message: String,
}

impl TypeError {
    pub fn new(message: impl Into<String>) -> Self {
        TypeError {
            message: message.into(),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TypeError {}

/// Result type for type checking operations. Checking is fail-fast: the
/// first violation aborts the run.
pub type TypecheckResult<T> = Result<T, TypeError>;
