use std::io::SeekFrom;

/// Serves single lines of a file on demand from a line-offset index.
///
/// The store exclusively owns its read handle; dropping or [closing](Self::close)
/// the store releases it. Retrieval takes `&mut self`, so at most one read is
/// ever in flight against a store and at most one line's bytes are held in
/// memory by it.
#[derive(Debug)]
pub struct VirtualLineStore<R = std::fs::File> {
    index: crate::line_index::offsets::LineOffsetIndex,
    handle: R,
    /// Handle position after the previous read. Lets sequential retrieval skip the seek.
    position: Option<u64>,
}

/*

====================
===== CREATION =====
====================

*/

impl VirtualLineStore<std::fs::File> {
    /// Opens `path`, indexes it and keeps the handle for later retrieval.
    ///
    /// # Errors
    ///
    /// - Whatever [`LineOffsetIndexer::index`](crate::line_index::indexer::LineOffsetIndexer::index)
    ///   reports, plus [`LoadError::Io`](crate::errors::LoadError::Io) if the
    ///   file cannot be opened. The handle is closed on every error path.
    pub fn open<S>(
        path: impl AsRef<std::path::Path>,
        indexer: &crate::line_index::indexer::LineOffsetIndexer,
        token: &util::cancel::CancellationToken,
        progress: &mut S,
    ) -> crate::errors::LoadResult<Self>
    where
        S: util::event_queue::EventSink<crate::events::LoadEvent> + ?Sized,
    {
        let mut file = std::fs::File::open(path.as_ref())?;
        let index = indexer.index(&mut file, token, progress)?;

        Ok(Self::new(index, file))
    }
}

impl<R> VirtualLineStore<R> {
    /// `handle` must be positioned at the start of the indexed content.
    pub fn new(index: crate::line_index::offsets::LineOffsetIndex, handle: R) -> Self {
        Self {
            index,
            handle,
            position: Some(0),
        }
    }

    /// Releases the read handle.
    pub fn close(self) {
        drop(self);
    }
}

/*

=====================
====== GETTERS ======
=====================

*/

impl<R> VirtualLineStore<R> {
    /// O(1).
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.index.line_count()
    }

    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> u64 {
        self.index.byte_len()
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> &crate::line_index::offsets::LineOffsetIndex {
        &self.index
    }

    #[inline]
    #[must_use]
    pub fn line_at_offset(&self, abs_idx: u64) -> Option<usize> {
        self.index.line_at_offset(abs_idx)
    }
}

impl<R: std::io::Read + std::io::Seek> VirtualLineStore<R> {
    /// Text of line `line_idx`, without its terminator.
    ///
    /// # Panics
    ///
    /// If `line_idx >= self.line_count()`. Asking for a line that does not
    /// exist is a caller bug, not a runtime condition.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Io`](crate::errors::LoadError::Io) if the read fails, or
    ///   with `InvalidData` if the file no longer matches the index.
    /// - [`LoadError::Encoding`](crate::errors::LoadError::Encoding) if the
    ///   line is not valid UTF-8.
    pub fn get_line(&mut self, line_idx: usize) -> crate::errors::LoadResult<String> {
        let Some(range) = self.index.line_range(line_idx) else {
            panic!(
                "line index {line_idx} out of range (line_count={})",
                self.line_count()
            );
        };

        self.read_line(line_idx, range)
    }

    /// Checked variant of [`VirtualLineStore::get_line`]: `None` when out of range.
    pub fn try_get_line(&mut self, line_idx: usize) -> Option<crate::errors::LoadResult<String>> {
        let range = self.index.line_range(line_idx)?;

        Some(self.read_line(line_idx, range))
    }

    /// Iterates `range`, clamped to the existing lines.
    pub fn lines(
        &mut self,
        range: std::ops::Range<usize>,
    ) -> crate::line_index::line_iter::LineRangeIter<'_, R> {
        let end_line_idx = range.end.min(self.line_count());

        crate::line_index::line_iter::LineRangeIter {
            current_line_idx: range.start.min(end_line_idx),
            end_line_idx,
            store: self,
        }
    }

    fn read_line(
        &mut self,
        line_idx: usize,
        range: std::ops::Range<u64>,
    ) -> crate::errors::LoadResult<String> {
        let terminated = self.index.is_terminated(line_idx);
        let text_len = usize::try_from(range.end - range.start).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, "line too long for memory")
        })?;

        if self.position != Some(range.start) {
            // Forget the position first: a failed seek leaves it unknown.
            self.position = None;
            self.handle.seek(SeekFrom::Start(range.start))?;
        }

        // Read the terminator too, to confirm the file still matches the index.
        let mut bytes = vec![0u8; text_len + usize::from(terminated)];

        if let Err(e) = self.handle.read_exact(&mut bytes) {
            self.position = None;
            return Err(e.into());
        }

        self.position = Some(range.start + bytes.len() as u64);

        if terminated && bytes.pop() != Some(crate::line_index::LINE_TERMINATOR) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("file changed since indexing: line {line_idx} lost its terminator"),
            )
            .into());
        }

        String::from_utf8(bytes).map_err(|e| crate::errors::LoadError::Encoding {
            byte_offset: range.start + e.utf8_error().valid_up_to() as u64,
        })
    }
}
