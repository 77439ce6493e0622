//! Stack safety utilities for deep recursion.
//!
//! Recursive descent over deeply nested source would overflow the native
//! stack long before it exhausts the heap. Recursion points in the parser
//! wrap themselves in [`ensure_sufficient_stack`], which grows the stack
//! on demand instead of crashing.
//!
//! # Platform Support
//!
//! - **Native targets**: uses the `stacker` crate to grow the stack.
//! - **WASM targets**: no-op passthrough (WASM manages its own stack).
//!
//! # Configuration
//!
//! - **Red zone**: 100KB. If less than this remains, the stack grows.
//! - **Growth size**: 1MB per growth.

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
///
/// If the remaining stack is below the red zone threshold, this allocates
/// additional stack space before calling `f`.
///
/// # Example
///
/// ```text
/// fn parse_expr(&mut self) -> ParserResult<ExprId> {
///     ensure_sufficient_stack(|| {
///         // recursive parsing logic
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_return_value() {
        assert_eq!(ensure_sufficient_stack(|| "ok"), "ok");
    }

    #[test]
    fn survives_deep_recursion() {
        // Deep enough to overflow a typical 8MB stack without growth.
        fn count_down(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { count_down(n - 1) + 1 })
        }

        assert_eq!(count_down(200_000), 200_000);
    }

    #[test]
    fn propagates_results() {
        let result: Result<u32, String> = ensure_sufficient_stack(|| Ok(7));
        assert_eq!(result, Ok(7));
    }
}
