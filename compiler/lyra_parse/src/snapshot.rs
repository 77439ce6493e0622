//! Parser snapshots and backtracking scopes.
//!
//! Four tools for looking ahead, from cheapest to most general:
//!
//! 1. **Single-token peek** - `self.peek()`. One token of lookahead,
//!    no state to manage.
//! 2. **Bounded lookahead** - [`Parser::lookahead`]. Run a closure over
//!    the real parser, then rewind unconditionally. Use it to answer a
//!    question ("does a declaration start here?") without committing.
//! 3. **Cancellable speculation** - [`Parser::speculate`]. Try a parse
//!    and decide at the end: [`Speculation::Commit`] keeps the consumed
//!    tokens, the emitted diagnostics, and any partial results;
//!    [`Speculation::Rollback`] rewinds the cursor and retracts the
//!    diagnostics emitted inside the attempt.
//! 4. **Manual snapshots** - [`Parser::snapshot`] / [`Parser::restore`]
//!    for the rare spot where scope discipline does not fit, such as
//!    recording a delayed parse and replaying it later.
//!
//! Scopes nest: positions are absolute, so an inner rollback never moves
//! an outer snapshot, and an outer rollback undoes inner commits.
//!
//! Rolled-back tokens stay in the token record; reconsuming them after a
//! rewind deduplicates by start position. The running token hash is
//! paused for the whole attempt so speculation never double-hashes.

use lyra_ir::Span;
use lyra_lexer::LexerCheckpoint;

use crate::Parser;

/// Everything needed to rewind the parser to an earlier token.
///
/// Captures the lexer checkpoint for the current token and the
/// previous-token span. Diagnostics are transacted separately; see
/// [`Parser::speculate`].
#[derive(Copy, Clone, Debug)]
pub struct ParserSnapshot {
    pub(crate) checkpoint: LexerCheckpoint,
    pub(crate) prev_span: Span,
}

/// Verdict of a [`Parser::speculate`] closure.
pub enum Speculation<T> {
    /// Keep everything the attempt consumed and emitted.
    Commit(T),
    /// Rewind the cursor and retract the attempt's diagnostics.
    Rollback(T),
}

impl<'a> Parser<'a> {
    /// Capture the current parser position.
    pub fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            checkpoint: self.cursor.checkpoint(),
            prev_span: self.cursor.prev_span(),
        }
    }

    /// Rewind to a snapshot taken earlier on this parser.
    ///
    /// Positions are absolute byte offsets, so restoring is insensitive
    /// to any snapshots taken or dropped in between.
    pub fn restore(&mut self, snapshot: ParserSnapshot) {
        self.cursor.restore(snapshot.checkpoint, snapshot.prev_span);
    }

    /// Run `f` and rewind unconditionally, returning its answer.
    ///
    /// Diagnostics emitted inside are retracted; the token hash is
    /// paused. The closure sees the real parser, so it can use the full
    /// grammar to reach its verdict.
    pub fn lookahead<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.speculate(|p| Speculation::Rollback(f(p)))
    }

    /// Run a speculative parse that decides its own fate.
    ///
    /// The closure returns [`Speculation::Commit`] to keep its consumed
    /// tokens and diagnostics, or [`Speculation::Rollback`] to undo both.
    /// Either way the closure's payload is returned.
    ///
    /// Nesting works the way absolute positions suggest: an inner
    /// rollback cannot disturb the outer attempt, and an outer rollback
    /// undoes everything, including inner commits.
    pub fn speculate<T>(&mut self, f: impl FnOnce(&mut Self) -> Speculation<T>) -> T {
        let snapshot = self.snapshot();
        let mark = self.diags.mark();
        let hasher = self.hasher.take();
        let verdict = f(self);
        self.hasher = hasher;
        match verdict {
            Speculation::Commit(value) => value,
            Speculation::Rollback(value) => {
                self.diags.truncate(mark);
                self.restore(snapshot);
                value
            }
        }
    }
}

// ParserSnapshot is copied around freely; keep it small.
#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::ParserSnapshot;
    lyra_ir::static_assert_size!(ParserSnapshot, 16);
}
