//! `check` subcommand handler

use crate::utils::read_source;
use rill_core::pipeline::{Pipeline, PipelineError};
use std::process;

/// Typecheck a program document and print a verdict.
///
/// The verdict goes to stdout: `valid` for a well-typed program,
/// `invalid: <message>` with the first violation otherwise. Unreadable or
/// malformed input is not a verdict and goes to stderr with a failure
/// exit code.
pub fn handle_check(file: &str) {
    let source = match read_source(file) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Error reading file '{file}': {err}");
            process::exit(1);
        }
    };

    let pipeline = Pipeline::new(source, file.to_string());

    match pipeline.check_all() {
        Ok(()) => println!("valid"),
        Err(PipelineError::Type(err)) => println!("invalid: {err}"),
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}
