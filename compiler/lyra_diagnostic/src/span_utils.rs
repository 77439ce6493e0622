//! Span utility functions for diagnostic rendering.
//!
//! Provides line and column lookup for byte offsets, used when printing
//! diagnostics against a source buffer.

/// Pre-computed line offset table for efficient line/column lookup.
///
/// Builds a table of byte offsets for each line start, enabling O(log L)
/// binary search lookups instead of O(n) linear scans. Worth it when
/// rendering multiple diagnostics with multiple labels each.
///
/// # Example
///
/// ```
/// use lyra_diagnostic::span_utils::LineOffsetTable;
///
/// let source = "line1\nline2\nline3";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
/// assert_eq!(table.offset_to_line_col(source, 6), (2, 1));
/// assert_eq!(table.offset_to_line_col(source, 14), (3, 3));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// Byte offset of each line start. `offsets[0]` is always 0.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    /// Build a line offset table from source text.
    ///
    /// Scans the source once to find all newlines.
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                offsets.push((i + 1) as u32);
            }
        }
        LineOffsetTable { offsets }
    }

    /// Get the 1-based line number containing a byte offset.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        (line_idx as u32) + 1
    }

    /// Get 1-based (line, column) from a byte offset.
    ///
    /// The column counts characters (not bytes) from the start of the
    /// line.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_idx = (line - 1) as usize;
        let line_start = self.offsets.get(line_idx).copied().unwrap_or(0) as usize;
        let offset = (offset as usize).min(source.len());

        let col = source[line_start..offset].chars().count() as u32 + 1;
        (line, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_line_starts_at_one() {
        let source = "abc";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
        assert_eq!(table.offset_to_line_col(source, 2), (1, 3));
    }

    #[test]
    fn offsets_after_newlines() {
        let source = "ab\ncd\nef";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.line_from_offset(2), 1); // the \n itself
        assert_eq!(table.line_from_offset(3), 2);
        assert_eq!(table.offset_to_line_col(source, 4), (2, 2));
        assert_eq!(table.offset_to_line_col(source, 7), (3, 2));
    }

    #[test]
    fn columns_count_chars_not_bytes() {
        let source = "é é";
        let table = LineOffsetTable::build(source);
        // 'é' is two bytes; the second 'é' starts at byte 3.
        assert_eq!(table.offset_to_line_col(source, 3), (1, 3));
    }

    #[test]
    fn offset_past_end_clamps() {
        let source = "ab";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.offset_to_line_col(source, 99), (1, 3));
    }

    #[test]
    fn empty_source() {
        let table = LineOffsetTable::build("");
        assert_eq!(table.offset_to_line_col("", 0), (1, 1));
    }
}
