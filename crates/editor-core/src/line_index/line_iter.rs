/// Reads a range of lines from a store one at a time.
///
/// Each line is materialized only when yielded, so scrolling through a long
/// range never holds more than one line's bytes at once.
#[derive(Debug)]
pub struct LineRangeIter<'store, R> {
    pub(crate) store: &'store mut crate::line_index::store::VirtualLineStore<R>,
    pub(crate) current_line_idx: usize,
    pub(crate) end_line_idx: usize,
}

impl<R: std::io::Read + std::io::Seek> Iterator for LineRangeIter<'_, R> {
    type Item = (usize, crate::errors::LoadResult<String>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_line_idx >= self.end_line_idx {
            return None;
        }

        let line_idx = self.current_line_idx;

        self.current_line_idx += 1;

        Some((line_idx, self.store.get_line(line_idx)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end_line_idx.saturating_sub(self.current_line_idx);

        (remaining, Some(remaining))
    }
}

impl<R: std::io::Read + std::io::Seek> ExactSizeIterator for LineRangeIter<'_, R> {}
