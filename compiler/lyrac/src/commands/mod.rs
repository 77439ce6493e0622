//! Command handlers for the Lyra CLI.
//!
//! Each submodule implements one CLI command; the shared `read_file`
//! helper lives in the module root.

mod name;
mod parse;
mod tokens;

pub use name::explain_name;
pub use parse::{parse_cli_options, parse_file, ParseCliOptions};
pub use tokens::tokens_file;

/// Read a source file, exiting with a friendly message when it cannot
/// be read.
pub(super) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) => {
            match error.kind() {
                std::io::ErrorKind::NotFound => eprintln!("error: cannot find '{path}'"),
                std::io::ErrorKind::InvalidData => {
                    eprintln!("error: '{path}' is not valid UTF-8");
                }
                _ => eprintln!("error: cannot read '{path}': {error}"),
            }
            std::process::exit(1);
        }
    }
}
