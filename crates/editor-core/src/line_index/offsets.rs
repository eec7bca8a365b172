/// Start offset of every logical line, in file order.
///
/// Invariants:
/// - `offsets[0] == 0` and offsets are strictly increasing.
/// - `offsets.len()` is the logical line count: one more than the number of
///   terminators, so an empty file has one (empty) line and a file ending in a
///   terminator has a trailing empty line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineOffsetIndex {
    offsets: Vec<u64>,
    /// Total bytes seen while indexing; bounds the last line.
    byte_len: u64,
}

impl Default for LineOffsetIndex {
    fn default() -> Self {
        Self {
            offsets: vec![0],
            byte_len: 0,
        }
    }
}

/*

====================
===== CREATION =====
====================

*/

impl LineOffsetIndex {
    /// Indexes an in-memory buffer in one pass.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut index = Self::default();

        index.extend_from_block(0, bytes);
        index.byte_len = bytes.len() as u64;

        index
    }

    /// Records the terminators of a block that starts at absolute offset `base`.
    pub(crate) fn extend_from_block(&mut self, base: u64, block: &[u8]) {
        self.offsets.extend(
            memchr::memchr_iter(crate::line_index::LINE_TERMINATOR, block)
                .map(|pos| base + pos as u64 + 1),
        );
    }

    pub(crate) fn set_byte_len(&mut self, byte_len: u64) {
        self.byte_len = byte_len;
    }
}

/*

=====================
====== GETTERS ======
=====================

*/

impl LineOffsetIndex {
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.offsets
    }

    #[inline]
    #[must_use]
    pub fn line_start(&self, line_idx: usize) -> Option<u64> {
        self.offsets.get(line_idx).copied()
    }

    /// Byte range of a line's text, terminator excluded.
    #[must_use]
    pub fn line_range(&self, line_idx: usize) -> Option<std::ops::Range<u64>> {
        let start = self.line_start(line_idx)?;
        let end = match self.offsets.get(line_idx + 1) {
            // The next line starts right after this line's terminator.
            Some(next) => next - 1,
            None => self.byte_len,
        };

        Some(start..end)
    }

    /// Whether the line is followed by a terminator byte in the file.
    #[inline]
    #[must_use]
    pub fn is_terminated(&self, line_idx: usize) -> bool {
        line_idx + 1 < self.offsets.len()
    }

    /// Line containing the byte at `abs_idx`.
    ///
    /// A terminator belongs to the line it ends. `abs_idx == byte_len` maps to
    /// the last line so an end-of-file caret still resolves.
    #[must_use]
    pub fn line_at_offset(&self, abs_idx: u64) -> Option<usize> {
        if abs_idx > self.byte_len {
            return None;
        }

        // offsets[0] == 0, so the partition point is always at least 1.
        Some(self.offsets.partition_point(|&start| start <= abs_idx) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_one_line() {
        let index = LineOffsetIndex::from_bytes(b"");

        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_range(0), Some(0..0));
        assert_eq!(index.line_range(1), None);
    }

    #[test]
    fn test_single_terminator_has_two_empty_lines() {
        let index = LineOffsetIndex::from_bytes(b"\n");

        assert_eq!(index.as_slice(), &[0, 1]);
        assert_eq!(index.line_range(0), Some(0..0));
        assert_eq!(index.line_range(1), Some(1..1));
    }

    #[test]
    fn test_unterminated_last_line() {
        // "Line1\n" (6 bytes), "Line2\n" (6 bytes), "End" (3 bytes)
        let index = LineOffsetIndex::from_bytes(b"Line1\nLine2\nEnd");

        assert_eq!(index.as_slice(), &[0, 6, 12]);
        assert_eq!(index.line_range(2), Some(12..15));
        assert!(index.is_terminated(1));
        assert!(!index.is_terminated(2));
    }

    #[test]
    fn test_line_at_offset() {
        let index = LineOffsetIndex::from_bytes(b"Line1\nLine2\nEnd");

        assert_eq!(index.line_at_offset(0), Some(0));
        assert_eq!(index.line_at_offset(5), Some(0)); // '\n' of line 0
        assert_eq!(index.line_at_offset(6), Some(1));
        assert_eq!(index.line_at_offset(14), Some(2));
        assert_eq!(index.line_at_offset(15), Some(2));
        assert_eq!(index.line_at_offset(16), None);
    }

    #[test]
    fn test_block_wise_matches_whole() {
        let text = b"a\nbb\n\nccc\nd";
        let whole = LineOffsetIndex::from_bytes(text);

        let mut blockwise = LineOffsetIndex::default();
        for (i, block) in text.chunks(3).enumerate() {
            blockwise.extend_from_block((i * 3) as u64, block);
        }
        blockwise.set_byte_len(text.len() as u64);

        assert_eq!(blockwise, whole);
    }
}
