//! The `parse` command: run the parser over a file and report
//! diagnostics.

use lyra_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use lyra_diagnostic::{DiagnosticConfig, Severity};
use lyra_parse::{parse_source_with, ParserOptions};

use super::read_file;

/// Command-line options for `lyra parse`.
#[derive(Debug)]
pub struct ParseCliOptions {
    /// Maximum number of errors to report (0 = unlimited).
    pub error_limit: usize,
    /// Color mode for diagnostic output.
    pub color: ColorMode,
}

impl Default for ParseCliOptions {
    fn default() -> Self {
        ParseCliOptions {
            error_limit: DiagnosticConfig::default().error_limit,
            color: ColorMode::Auto,
        }
    }
}

/// Parse flags of the form `--error-limit=<n>` and `--color=<mode>`.
pub fn parse_cli_options(args: &[String]) -> ParseCliOptions {
    let mut options = ParseCliOptions::default();

    for arg in args {
        if let Some(limit) = arg.strip_prefix("--error-limit=") {
            match limit.parse::<usize>() {
                Ok(limit) => options.error_limit = limit,
                Err(_) => eprintln!("warning: invalid error limit '{limit}', using default"),
            }
        } else if let Some(mode) = arg.strip_prefix("--color=") {
            match mode {
                "auto" => options.color = ColorMode::Auto,
                "always" => options.color = ColorMode::Always,
                "never" => options.color = ColorMode::Never,
                _ => {
                    eprintln!("warning: unknown color mode '{mode}', options: auto, always, never");
                }
            }
        } else {
            eprintln!("warning: unknown option '{arg}'");
        }
    }

    options
}

/// Parse a file and report every diagnostic on stderr.
///
/// Exits with code 1 when the parse produced errors; otherwise prints a
/// one-line summary and the interface hash.
pub fn parse_file(path: &str, options: &ParseCliOptions) {
    let content = read_file(path);
    let output = parse_source_with(
        &content,
        ParserOptions {
            error_limit: options.error_limit,
            ..ParserOptions::default()
        },
    );

    let is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let mut emitter = TerminalEmitter::stderr(options.color, is_tty);
    emitter.emit_all(&output.diagnostics);
    emitter.flush();

    // List recovery can clear the status error bit while the diagnostic
    // stays queued, so both sides are checked.
    let has_errors = !output.status.is_success()
        || output
            .diagnostics
            .iter()
            .any(|diag| diag.severity == Severity::Error);
    if has_errors {
        std::process::exit(1);
    }

    println!(
        "OK: {path} ({} top-level items, {} declarations, {} expressions)",
        output.file.items.len(),
        output.decls.len(),
        output.exprs.len()
    );
    if let Some(hash) = output.interface_hash {
        println!("interface hash: {hash:016x}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| (*arg).to_string()).collect()
    }

    #[test]
    fn error_limit_flag_overrides_the_default() {
        let options = parse_cli_options(&args(&["--error-limit=3"]));
        assert_eq!(options.error_limit, 3);
    }

    #[test]
    fn zero_error_limit_means_unlimited() {
        let options = parse_cli_options(&args(&["--error-limit=0"]));
        assert_eq!(options.error_limit, 0);
    }

    #[test]
    fn invalid_error_limit_keeps_the_default() {
        let options = parse_cli_options(&args(&["--error-limit=lots"]));
        assert_eq!(options.error_limit, DiagnosticConfig::default().error_limit);
    }

    #[test]
    fn color_modes_parse() {
        assert_eq!(
            parse_cli_options(&args(&["--color=never"])).color,
            ColorMode::Never
        );
        assert_eq!(
            parse_cli_options(&args(&["--color=always"])).color,
            ColorMode::Always
        );
        assert_eq!(
            parse_cli_options(&args(&["--color=purple"])).color,
            ColorMode::Auto
        );
    }
}
