use clap::{CommandFactory, Parser, Subcommand};

mod check;
mod debug;
mod utils;


use check::handle_check;
use debug::handle_ast;

/// Get the version string including git revision
fn version() -> &'static str {
    concat!(env!("CARGO_PKG_VERSION"), " (git:", env!("GIT_HASH"), ")")
}

#[derive(Parser)]
#[command(
    author,
    version = version(),
    about = "Rill teaching language type checker",
    long_about = None,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// The program document to check (default if no subcommand)
    file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Typecheck a program document and report a verdict
    Check {
        /// The file to typecheck, or "-" for stdin
        file: String,
    },
    /// Print the decoded syntax tree (debug)
    #[command(hide = true)]
    Ast {
        /// The file to decode
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Check { file }) => {
            handle_check(file);
        }
        Some(Commands::Ast { file }) => {
            handle_ast(file);
        }
        None => {
            // Default: check the file if provided, otherwise print help
            let file = match &cli.file {
                Some(f) => f,
                None => {
                    // No file and no subcommand - print help
                    Cli::command().print_help().unwrap();
                    println!();
                    std::process::exit(0);
                }
            };
            handle_check(file);
        }
    }
}
