use std::io::{Seek, SeekFrom};
use util::event_queue::EventSink;

/// Builds a [`LineOffsetIndex`](crate::line_index::offsets::LineOffsetIndex)
/// in one forward pass over fixed-size blocks.
///
/// Memory use is one block plus the offsets themselves, independent of file size.
#[derive(Clone, Debug)]
pub struct LineOffsetIndexer {
    block_size: usize,
    validate_utf8: bool,
}

impl Default for LineOffsetIndexer {
    fn default() -> Self {
        Self::new(crate::line_index::DEFAULT_INDEX_BLOCK_SIZE)
    }
}

impl LineOffsetIndexer {
    /// `block_size` is clamped to
    /// [`MIN_INDEX_BLOCK_SIZE`](crate::line_index::MIN_INDEX_BLOCK_SIZE)..=[`MAX_INDEX_BLOCK_SIZE`](crate::line_index::MAX_INDEX_BLOCK_SIZE).
    #[must_use]
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size: block_size.clamp(
                crate::line_index::MIN_INDEX_BLOCK_SIZE,
                crate::line_index::MAX_INDEX_BLOCK_SIZE,
            ),
            validate_utf8: true,
        }
    }

    /// Enables fail-fast UTF-8 validation during the indexing pass.
    #[must_use]
    pub fn validate_utf8(mut self, on: bool) -> Self {
        self.validate_utf8 = on;
        self
    }

    #[inline]
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Indexes `source` from its first byte and rewinds it afterwards.
    ///
    /// Publishes `IndexProgress` events as the percentage changes; the last one
    /// is always 100. Cancellation is checked before every block read.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Io`](crate::errors::LoadError::Io) if reading or seeking fails.
    /// - [`LoadError::Encoding`](crate::errors::LoadError::Encoding) on invalid
    ///   UTF-8 when validation is enabled.
    /// - [`LoadError::Cancelled`](crate::errors::LoadError::Cancelled) if the
    ///   token fires or `progress` is disconnected.
    pub fn index<R, S>(
        &self,
        source: &mut R,
        token: &util::cancel::CancellationToken,
        progress: &mut S,
    ) -> crate::errors::LoadResult<crate::line_index::offsets::LineOffsetIndex>
    where
        R: std::io::Read + std::io::Seek + ?Sized,
        S: EventSink<crate::events::LoadEvent> + ?Sized,
    {
        let total = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;

        let mut index = crate::line_index::offsets::LineOffsetIndex::default();
        let mut decoder = self.validate_utf8.then(io::utf8::Utf8Decoder::new);
        let mut buf = vec![0u8; self.block_size];
        let mut read_so_far = 0u64;
        let mut last_percent = None;

        loop {
            if token.is_cancelled() {
                tracing::debug!(read_so_far, "indexing cancelled");
                return Err(crate::errors::LoadError::Cancelled);
            }

            let n = io::block::fill_block(source, &mut buf)?;

            if n == 0 {
                break;
            }

            let block = &buf[..n];

            if let Some(decoder) = decoder.as_mut() {
                decoder.validate(block)?;
            }

            index.extend_from_block(read_so_far, block);
            read_so_far += n as u64;

            // 100 is reserved for the report after the final block.
            let percent = io::block::percent_of(read_so_far, total).min(99);

            if last_percent != Some(percent) {
                progress.emit(crate::events::LoadEvent::IndexProgress { percent })?;
                last_percent = Some(percent);
            }

            tracing::trace!(read_so_far, total, "indexed block");
        }

        if let Some(decoder) = &decoder {
            decoder.finish()?;
        }

        index.set_byte_len(read_so_far);
        source.seek(SeekFrom::Start(0))?;
        progress.emit(crate::events::LoadEvent::IndexProgress { percent: 100 })?;

        tracing::debug!(
            lines = index.line_count(),
            bytes = read_so_far,
            "line index built"
        );

        Ok(index)
    }
}
