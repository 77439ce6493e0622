//! Diagnostic system for rich error reporting.
//!
//! Every diagnostic carries:
//! - An error code for searchability
//! - A clear message (what went wrong)
//! - A primary span (where it went wrong)
//! - Context labels (why it's wrong)
//! - Suggestions (how to fix)
//!
//! # Error Guarantees
//!
//! The `ErrorGuaranteed` type provides type-level proof that at least one
//! error was emitted. This prevents "forgotten" error conditions where code
//! fails silently without reporting an error.
//!
//! # Transactions
//!
//! The parser speculates: it tries a parse, and if the attempt does not pan
//! out it rewinds. Diagnostics emitted inside an abandoned attempt must not
//! reach the user, so [`queue::DiagnosticQueue`] supports marking a restore
//! point and truncating back to it.

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;
pub mod span_utils;

pub use diagnostic::{
    expected_declaration, expected_expression, expected_identifier, expected_integer_literal,
    expected_separator, expected_type, keyword_as_identifier, nesting_too_deep, unclosed_delimiter,
    unexpected_separator, unexpected_token, Applicability, Diagnostic, Label, Severity,
    Substitution, Suggestion,
};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue, QueueMark};
