//! Type-level proof that an error was emitted.

/// Proof that at least one error diagnostic was emitted.
///
/// Can only be constructed inside this crate, by actually emitting an
/// error through [`crate::queue::DiagnosticQueue`]. Functions that bail
/// out after reporting can return `Result<T, ErrorGuaranteed>` so the
/// type system enforces that the failure was reported to the user.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    /// Construct the proof token. Crate-private on purpose.
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }
}
