//! Unified pipeline for validating Rill programs
//!
//! This module provides a `Pipeline` abstraction that encapsulates the
//! complete workflow of decoding a JSON program document and type-checking
//! it.
//!
//! ## Usage
//!
//! ```no_run
//! # use rill_core::pipeline::Pipeline;
//! let pipeline = Pipeline::new(
//!     r#"{"structs": [], "externs": [], "functions": []}"#.to_string(),
//!     "example.astj".to_string(),
//! );
//!
//! match pipeline.check_all() {
//!     Ok(()) => println!("valid"),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```
//!
//! ## Individual Stages
//!
//! You can also run individual stages:
//!
//! ```no_run
//! # use rill_core::pipeline::Pipeline;
//! # let pipeline = Pipeline::new("{}".to_string(), "example.astj".to_string());
//! let program = pipeline.decode()?;
//! pipeline.typecheck(&program)?;
//! # Ok::<(), rill_core::pipeline::PipelineError>(())
//! ```

use std::fmt;

use crate::ast::Program;
use crate::decode::{self, DecodeError};
use crate::typecheck::{self, TypeError};

/// Errors that can occur during pipeline execution
#[derive(Debug)]
pub enum PipelineError {
    /// The document is not valid JSON or does not match the tree schema
    Malformed(DecodeError),
    /// The program decoded but is not well typed
    Type(TypeError),
}

impl PipelineError {
    /// Whether this failure should be reported as a verdict on the program
    /// rather than a problem with the input document.
    pub fn is_type_error(&self) -> bool {
        matches!(self, PipelineError::Type(_))
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Malformed(err) => write!(f, "{err}"),
            PipelineError::Type(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<DecodeError> for PipelineError {
    fn from(error: DecodeError) -> Self {
        PipelineError::Malformed(error)
    }
}

impl From<TypeError> for PipelineError {
    fn from(error: TypeError) -> Self {
        PipelineError::Type(error)
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Unified pipeline for decoding and type-checking a Rill program document
pub struct Pipeline {
    /// Program document text
    source: String,
    /// Filename for error reporting
    filename: String,
}

impl Pipeline {
    /// Create a new pipeline with document text and filename
    pub fn new(source: String, filename: String) -> Self {
        Pipeline { source, filename }
    }

    /// Decode the document into a program tree
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Malformed` if the text is not valid JSON or
    /// does not match the tree schema
    pub fn decode(&self) -> PipelineResult<Program> {
        let value: serde_json::Value = serde_json::from_str(&self.source)
            .map_err(|err| DecodeError::new(format!("{}: {err}", self.filename)))?;
        decode::decode_program(&value).map_err(PipelineError::Malformed)
    }

    /// Type-check a decoded program
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Type` with the first violation found
    pub fn typecheck(&self, program: &Program) -> PipelineResult<()> {
        typecheck::typecheck_program(program).map_err(PipelineError::Type)
    }

    /// Execute the complete pipeline: decode → typecheck
    pub fn check_all(&self) -> PipelineResult<()> {
        let program = self.decode()?;
        self.typecheck(&program)
    }
}
