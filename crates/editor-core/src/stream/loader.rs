use util::event_queue::EventSink;

/// Sequential block reader that decodes a file into progress-tagged chunks.
///
/// Blocks are sized by [`adaptive_chunk_size`](crate::stream::adaptive_chunk_size).
/// Decoding carries split UTF-8 sequences across block boundaries, so the
/// concatenated chunk texts always equal the decoded file.
#[derive(Clone, Debug)]
pub struct ChunkedStreamLoader {
    /// Pause between blocks so one load cannot starve other work.
    /// Zero means a plain scheduler yield.
    yield_between_chunks: std::time::Duration,
}

impl Default for ChunkedStreamLoader {
    fn default() -> Self {
        Self::new(std::time::Duration::from_millis(1))
    }
}

impl ChunkedStreamLoader {
    #[must_use]
    pub fn new(yield_between_chunks: std::time::Duration) -> Self {
        Self {
            yield_between_chunks,
        }
    }

    /// Opens `path` and streams it into `sink`. See [`ChunkedStreamLoader::run`].
    ///
    /// # Errors
    ///
    /// - [`LoadError::Io`](crate::errors::LoadError::Io) if the file cannot be
    ///   opened or read, plus everything [`ChunkedStreamLoader::run`] reports.
    pub fn load_path<S>(
        &self,
        path: impl AsRef<std::path::Path>,
        token: &util::cancel::CancellationToken,
        sink: &mut S,
    ) -> crate::errors::LoadResult<u64>
    where
        S: EventSink<crate::events::LoadEvent> + ?Sized,
    {
        let file = std::fs::File::open(path.as_ref())?;
        let total_size = file.metadata()?.len();

        self.run(file, total_size, token, sink)
    }

    /// Reads `source` to the end, emitting one `Chunk` event per block.
    ///
    /// Percentages are `floor(read * 100 / total_size)`, held below 100 until
    /// the final chunk, which reports exactly 100. An empty source produces a
    /// single empty chunk at 100. `source` is consumed and dropped before this
    /// returns, on every path.
    ///
    /// Returns the number of bytes read. Terminal `Completed`/`Failed` events
    /// are left to the caller.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Io`](crate::errors::LoadError::Io) on a read failure.
    /// - [`LoadError::Encoding`](crate::errors::LoadError::Encoding) on invalid
    ///   or truncated UTF-8.
    /// - [`LoadError::Cancelled`](crate::errors::LoadError::Cancelled) if the
    ///   token fires or the sink disconnects. No read is issued after that.
    pub fn run<R, S>(
        &self,
        mut source: R,
        total_size: u64,
        token: &util::cancel::CancellationToken,
        sink: &mut S,
    ) -> crate::errors::LoadResult<u64>
    where
        R: std::io::Read,
        S: EventSink<crate::events::LoadEvent> + ?Sized,
    {
        let chunk_size = crate::stream::adaptive_chunk_size(total_size);
        let mut buf = vec![0u8; chunk_size];
        let mut decoder = io::utf8::Utf8Decoder::new();
        let mut read_so_far = 0u64;
        // Held back one block: only after the next read do we know whether it was the last.
        let mut pending: Option<crate::events::ChunkEvent> = None;

        tracing::debug!(total_size, chunk_size, "streaming load started");

        loop {
            if token.is_cancelled() {
                tracing::debug!(read_so_far, "streaming load cancelled");
                return Err(crate::errors::LoadError::Cancelled);
            }

            let n = io::block::fill_block(&mut source, &mut buf)?;

            if n == 0 {
                break;
            }

            read_so_far += n as u64;

            let chunk = crate::events::ChunkEvent {
                text: decoder.decode(&buf[..n])?,
                percent: io::block::percent_of(read_so_far, total_size).min(99),
            };

            if let Some(prev) = pending.replace(chunk) {
                sink.emit(crate::events::LoadEvent::Chunk(prev))?;
            }

            tracing::trace!(read_so_far, total_size, "streamed block");

            self.pause();
        }

        drop(source);
        decoder.finish()?;

        let mut last = pending.unwrap_or_else(|| crate::events::ChunkEvent {
            text: String::new(),
            percent: 0,
        });

        last.percent = 100;
        sink.emit(crate::events::LoadEvent::Chunk(last))?;

        tracing::debug!(read_so_far, "streaming load finished");

        Ok(read_so_far)
    }

    fn pause(&self) {
        if self.yield_between_chunks.is_zero() {
            std::thread::yield_now();
        } else {
            std::thread::sleep(self.yield_between_chunks);
        }
    }
}
