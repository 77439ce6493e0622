//! Parse status propagation.
//!
//! Every parsing function reports how it fared through a [`ParserStatus`]:
//! a small bitset that composes with `|=` as results bubble up the call
//! stack. Three conditions are tracked:
//!
//! - **error**: the production diagnosed a syntax error,
//! - **input incomplete**: the buffer ended before the production could,
//! - **code completion**: an interactive-completion marker was crossed.
//!
//! The completion bit is sticky all the way to the top-level driver, which
//! uses it to stop parsing further declarations.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Composable outcome flags for one parsing function.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct ParserStatus(u8);

impl ParserStatus {
    const ERROR: u8 = 1 << 0;
    const INPUT_INCOMPLETE: u8 = 1 << 1;
    const CODE_COMPLETION: u8 = 1 << 2;

    /// A clean result: no error, input complete, no completion marker.
    pub const SUCCESS: ParserStatus = ParserStatus(0);

    /// Status carrying only the error bit.
    pub fn error() -> ParserStatus {
        ParserStatus(Self::ERROR)
    }

    /// Status carrying only the completion bit.
    pub fn code_completion() -> ParserStatus {
        ParserStatus(Self::CODE_COMPLETION)
    }

    /// Status carrying only the incomplete-input bit.
    pub fn input_incomplete() -> ParserStatus {
        ParserStatus(Self::INPUT_INCOMPLETE)
    }

    #[inline]
    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self.0 & Self::ERROR != 0
    }

    #[inline]
    pub fn is_input_incomplete(self) -> bool {
        self.0 & Self::INPUT_INCOMPLETE != 0
    }

    #[inline]
    pub fn has_code_completion(self) -> bool {
        self.0 & Self::CODE_COMPLETION != 0
    }

    /// Whether recovery should kick in: an error was diagnosed or a
    /// completion marker was crossed.
    #[inline]
    pub fn is_error_or_completion(self) -> bool {
        self.0 & (Self::ERROR | Self::CODE_COMPLETION) != 0
    }

    /// Set the error bit in place.
    pub fn set_is_parse_error(&mut self) {
        self.0 |= Self::ERROR;
    }

    /// Clear the error bit, keeping completion and incomplete-input.
    ///
    /// Used when a list closer is found after recovery: the caller got a
    /// usable parse despite the earlier trouble.
    #[must_use]
    pub fn without_error(self) -> ParserStatus {
        ParserStatus(self.0 & !Self::ERROR)
    }
}

impl BitOr for ParserStatus {
    type Output = ParserStatus;

    fn bitor(self, rhs: ParserStatus) -> ParserStatus {
        ParserStatus(self.0 | rhs.0)
    }
}

impl BitOrAssign for ParserStatus {
    fn bitor_assign(&mut self, rhs: ParserStatus) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ParserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            return write!(f, "success");
        }
        let mut sep = "";
        for (bit, name) in [
            (Self::ERROR, "error"),
            (Self::INPUT_INCOMPLETE, "input-incomplete"),
            (Self::CODE_COMPLETION, "code-completion"),
        ] {
            if self.0 & bit != 0 {
                write!(f, "{sep}{name}")?;
                sep = "+";
            }
        }
        Ok(())
    }
}

/// A status plus the value a parsing function produced, if any.
///
/// `value` is `None` when the production built nothing the caller can use;
/// the status says why. A present value with a non-success status is a
/// partial parse the caller may keep.
#[derive(Debug)]
pub struct ParserResult<T> {
    pub status: ParserStatus,
    pub value: Option<T>,
}

impl<T> ParserResult<T> {
    /// A successful parse of `value`.
    pub fn ok(value: T) -> Self {
        ParserResult {
            status: ParserStatus::SUCCESS,
            value: Some(value),
        }
    }

    /// A failed parse with nothing to show for it.
    pub fn error() -> Self {
        ParserResult {
            status: ParserStatus::error(),
            value: None,
        }
    }

    /// A parse that produced `value` under the given status.
    pub fn new(status: ParserStatus, value: T) -> Self {
        ParserResult {
            status,
            value: Some(value),
        }
    }

    /// A valueless result carrying `status`.
    pub fn empty(status: ParserStatus) -> Self {
        ParserResult {
            status,
            value: None,
        }
    }

    /// Whether the production built nothing.
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}
