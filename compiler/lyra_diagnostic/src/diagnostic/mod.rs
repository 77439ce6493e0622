//! Core diagnostic types for structured error reporting.
//!
//! Defines [`Diagnostic`], [`Label`], [`Severity`], and [`Suggestion`], the
//! building blocks the lexer and parser use to report errors and warnings.

use lyra_ir::Span;
use std::fmt;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Help => write!(f, "help"),
        }
    }
}

/// Applicability level for code suggestions.
///
/// Indicates how confident we are that a suggestion is correct, enabling
/// tooling to safely auto-apply machine-applicable fixes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Applicability {
    /// The suggestion is definitely correct and can be auto-applied.
    /// Used for simple fixes like stray separators or missing delimiters.
    MachineApplicable,

    /// The suggestion might be correct but requires human verification.
    MaybeIncorrect,

    /// The suggestion contains placeholders that need user input.
    HasPlaceholders,

    /// We don't know how confident the suggestion is.
    #[default]
    Unspecified,
}

impl Applicability {
    /// Check if this suggestion can be safely auto-applied.
    pub fn is_machine_applicable(&self) -> bool {
        matches!(self, Applicability::MachineApplicable)
    }
}

/// A text substitution for a code fix.
///
/// An empty `snippet` deletes the spanned text; a zero-width `span`
/// inserts the snippet at that point.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Substitution {
    /// The span to replace.
    pub span: Span,
    /// The replacement text.
    pub snippet: String,
}

impl Substitution {
    /// Create a new substitution.
    pub fn new(span: Span, snippet: impl Into<String>) -> Self {
        Substitution {
            span,
            snippet: snippet.into(),
        }
    }
}

/// A structured suggestion with substitutions and applicability.
///
/// Supports two forms:
/// - **Text-only**: a human-readable message with no code substitutions.
/// - **Span-bearing**: a message with exact code substitutions for tooling.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Suggestion {
    /// Human-readable message describing the fix.
    pub message: String,
    /// The text substitutions to make (empty for text-only suggestions).
    pub substitutions: Vec<Substitution>,
    /// How confident we are in this suggestion.
    pub applicability: Applicability,
}

impl Suggestion {
    /// Create a new suggestion with a single substitution.
    pub fn new(
        message: impl Into<String>,
        span: Span,
        snippet: impl Into<String>,
        applicability: Applicability,
    ) -> Self {
        Suggestion {
            message: message.into(),
            substitutions: vec![Substitution::new(span, snippet)],
            applicability,
        }
    }

    /// Create a text-only suggestion (no code substitution).
    pub fn text(message: impl Into<String>) -> Self {
        Suggestion {
            message: message.into(),
            substitutions: Vec::new(),
            applicability: Applicability::Unspecified,
        }
    }

    /// Create a machine-applicable suggestion (safe to auto-apply).
    pub fn machine_applicable(
        message: impl Into<String>,
        span: Span,
        snippet: impl Into<String>,
    ) -> Self {
        Self::new(message, span, snippet, Applicability::MachineApplicable)
    }

    /// Create a suggestion that might be incorrect.
    pub fn maybe_incorrect(
        message: impl Into<String>,
        span: Span,
        snippet: impl Into<String>,
    ) -> Self {
        Self::new(message, span, snippet, Applicability::MaybeIncorrect)
    }

    /// Add another substitution to this suggestion.
    #[must_use]
    pub fn with_substitution(mut self, span: Span, snippet: impl Into<String>) -> Self {
        self.substitutions.push(Substitution::new(span, snippet));
        self
    }

    /// Check if this is a text-only suggestion (no code substitutions).
    pub fn is_text_only(&self) -> bool {
        self.substitutions.is_empty()
    }
}

/// A labeled span with a message.
///
/// Labels highlight specific locations in the source buffer and attach
/// explanatory messages.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    /// The source location to highlight.
    pub span: Span,
    /// The label text explaining this location.
    pub message: String,
    /// Whether this is the primary error location.
    pub is_primary: bool,
}

impl Label {
    /// Create a primary label (the main error location).
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label (related context).
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A rich diagnostic with all context needed for great error messages.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    /// Severity level.
    pub severity: Severity,
    /// Main error message.
    pub message: String,
    /// Labeled spans showing where the error occurred.
    pub labels: Vec<Label>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
}

impl Diagnostic {
    /// Create a new diagnostic with the given severity.
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label at the error location.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestions.push(suggestion);
        self
    }

    /// Add a machine-applicable suggestion (safe to auto-apply).
    pub fn with_fix(
        mut self,
        message: impl Into<String>,
        span: Span,
        snippet: impl Into<String>,
    ) -> Self {
        self.suggestions
            .push(Suggestion::machine_applicable(message, span, snippet));
        self
    }

    /// Get the primary span (first primary label's span).
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.span)
    }

    /// Check if this is an error (vs warning/note).
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;

        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {} {:?}: {}", marker, label.span, label.message)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        for suggestion in &self.suggestions {
            write!(f, "\n  = help: {}", suggestion.message)?;
        }

        Ok(())
    }
}

/// Create an "unexpected token" diagnostic.
pub fn unexpected_token(span: Span, expected: &str, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1001)
        .with_message(format!(
            "unexpected token: expected {expected}, found `{found}`"
        ))
        .with_label(span, format!("expected {expected}"))
}

/// Create an "expected expression" diagnostic.
pub fn expected_expression(span: Span, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1002)
        .with_message(format!("expected expression, found `{found}`"))
        .with_label(span, "expected expression here")
}

/// Create an "unclosed delimiter" diagnostic.
///
/// `close_span` is where the matching closer should have appeared;
/// `open_span` is the delimiter left unclosed.
pub fn unclosed_delimiter(open_span: Span, close_span: Span, delimiter: char) -> Diagnostic {
    let expected = match delimiter {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        _ => delimiter,
    };
    Diagnostic::error(ErrorCode::E1003)
        .with_message(format!("unclosed delimiter `{delimiter}`"))
        .with_label(close_span, format!("expected `{expected}`"))
        .with_secondary_label(open_span, "unclosed delimiter opened here")
}

/// Create an "expected identifier" diagnostic.
pub fn expected_identifier(span: Span, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1004)
        .with_message(format!("expected identifier, found `{found}`"))
        .with_label(span, "expected identifier here")
}

/// Create an "expected type" diagnostic.
pub fn expected_type(span: Span, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1005)
        .with_message(format!("expected type, found `{found}`"))
        .with_label(span, "expected type here")
}

/// Create a "keyword cannot be used as identifier" diagnostic.
///
/// Comes with a machine-applicable fix that escapes the keyword in
/// backticks.
pub fn keyword_as_identifier(span: Span, keyword: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1006)
        .with_message(format!("keyword `{keyword}` cannot be used as identifier"))
        .with_label(span, "keyword not allowed here")
        .with_fix(
            "escape the keyword with backticks",
            span,
            format!("`{keyword}`"),
        )
}

/// Create an "unexpected separator" diagnostic with a removal fix.
pub fn unexpected_separator(span: Span, separator: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1007)
        .with_message(format!("unexpected `{separator}` separator"))
        .with_label(span, format!("remove this `{separator}`"))
        .with_fix(format!("remove the `{separator}`"), span, "")
}

/// Create an "expected separator" diagnostic with an insertion fix.
///
/// `at` should be a zero-width span immediately after the element that
/// is missing its trailing separator.
pub fn expected_separator(at: Span, separator: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1008)
        .with_message(format!("expected `{separator}` separator"))
        .with_label(at, format!("insert `{separator}` here"))
        .with_fix(format!("insert `{separator}`"), at, separator)
}

/// Create a "nesting too deep" diagnostic.
pub fn nesting_too_deep(span: Span, limit: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1009)
        .with_message(format!(
            "declaration or expression nesting exceeds {limit} levels"
        ))
        .with_label(span, "nesting limit reached here")
        .with_note("the rest of the buffer is skipped")
}

/// Create an "expected integer literal" diagnostic.
pub fn expected_integer_literal(span: Span, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1010)
        .with_message(format!("expected integer literal, found `{found}`"))
        .with_label(span, "expected integer literal here")
}

/// Create an "expected declaration" diagnostic.
pub fn expected_declaration(span: Span, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1011)
        .with_message(format!("expected declaration, found `{found}`"))
        .with_label(span, "expected declaration here")
}
