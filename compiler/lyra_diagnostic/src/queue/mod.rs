//! Diagnostic queue for collecting, sorting, and transactionally
//! discarding diagnostics.
//!
//! Features:
//! - Error limits to prevent overwhelming output
//! - Deduplication of back-to-back identical reports
//! - Restore points so speculative parses can retract their diagnostics
//! - `ErrorGuaranteed` proof that errors were emitted

use lyra_ir::Span;

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors before dropping further ones (0 = unlimited).
    pub error_limit: usize,
    /// Drop an error that repeats the previous one (same code, same start).
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 50,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Restore point for transactional diagnostic emission.
///
/// Obtained from [`DiagnosticQueue::mark`] and given back to
/// [`DiagnosticQueue::truncate`] to drop everything emitted in between.
#[derive(Copy, Clone, Debug)]
pub struct QueueMark {
    len: usize,
    error_count: usize,
    last_error: Option<(ErrorCode, u32)>,
}

/// Queue for collecting, sorting, and transactionally discarding
/// diagnostics.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticQueue {
    /// Collected diagnostics.
    diagnostics: Vec<Diagnostic>,
    /// Count of errors (not warnings/notes).
    error_count: usize,
    /// Last error's (code, primary start) for dedup.
    last_error: Option<(ErrorCode, u32)>,
    /// Configuration.
    config: DiagnosticConfig,
}

impl Default for DiagnosticQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            error_count: 0,
            last_error: None,
            config,
        }
    }

    /// Add a diagnostic to the queue.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it was
    /// filtered by the error limit or deduplication.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();

        // Check error limit
        if is_error && self.config.error_limit > 0 && self.error_count >= self.config.error_limit {
            return false;
        }

        // Deduplicate against the previous error
        let key = (diag.code, diag.primary_span().map_or(0, |s| s.start));
        if is_error && self.config.deduplicate && self.last_error == Some(key) {
            return false;
        }

        if is_error {
            self.last_error = Some(key);
            self.error_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    /// Emit an error diagnostic and get proof it was emitted.
    ///
    /// The returned `ErrorGuaranteed` can only be obtained by emitting an
    /// error, so callers can hand it on as evidence that the user saw one.
    /// The proof holds even when the queue filtered this particular
    /// diagnostic: filtering only happens once an equivalent or earlier
    /// error is already queued.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error());
        self.add(diag);
        ErrorGuaranteed::new()
    }

    /// Check if any errors were emitted and get proof if so.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        if self.error_count > 0 {
            Some(ErrorGuaranteed::new())
        } else {
            None
        }
    }

    /// Get the number of errors collected.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    /// Number of queued diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take a restore point covering everything queued so far.
    pub fn mark(&self) -> QueueMark {
        QueueMark {
            len: self.diagnostics.len(),
            error_count: self.error_count,
            last_error: self.last_error,
        }
    }

    /// Drop every diagnostic queued after `mark` was taken.
    ///
    /// Counts and dedup state rewind with the queue, so a retracted
    /// error neither shows up in output nor burns the error limit.
    pub fn truncate(&mut self, mark: QueueMark) {
        debug_assert!(mark.len <= self.diagnostics.len());
        self.diagnostics.truncate(mark.len);
        self.error_count = mark.error_count;
        self.last_error = mark.last_error;
    }

    /// Sort diagnostics by position and return them.
    ///
    /// Clears the queue after flushing. Skips sorting if already in order
    /// (common case for a forward parse).
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let start = |d: &Diagnostic| d.primary_span().map_or(0, |s| s.start);

        let already_sorted = self
            .diagnostics
            .windows(2)
            .all(|w| start(&w[0]) <= start(&w[1]));
        if !already_sorted {
            self.diagnostics.sort_by_key(start);
        }

        let result = std::mem::take(&mut self.diagnostics);
        self.error_count = 0;
        self.last_error = None;
        result
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }
}

/// Create a "too many errors" diagnostic.
#[cold]
pub fn too_many_errors(limit: usize, span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!("aborting due to {limit} previous errors"))
        .with_label(span, "error limit reached here")
        .with_note("use --error-limit to increase the limit")
}
