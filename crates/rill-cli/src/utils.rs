//! Shared CLI utilities for reading input

use std::fs;
use std::io::{self, Read};

/// Read a program document from a file or stdin.
/// If `file` is "-", reads from stdin. Otherwise reads from the specified file.
pub fn read_source(file: &str) -> io::Result<String> {
    if file == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        fs::read_to_string(file)
    }
}
