//! Debug subcommand: `ast`

use crate::utils::read_source;
use rill_core::pipeline::Pipeline;
use std::process;

/// Print the decoded syntax tree for debugging
pub fn handle_ast(file: &str) {
    let source = match read_source(file) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Error reading file '{file}': {err}");
            process::exit(1);
        }
    };

    let pipeline = Pipeline::new(source, file.to_string());
    let program = match pipeline.decode() {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    println!("{program:#?}");
}
