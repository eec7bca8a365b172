/// Settings recognised by the large-file subsystem.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Files larger than this are opened as a virtualized, indexed view
    /// instead of being buffered in full.
    pub large_file_threshold_bytes: u64,
    pub index_block_size: usize,
    /// Reject invalid UTF-8 while indexing instead of when a line is read.
    pub validate_utf8: bool,
    pub yield_between_chunks_ms: u64,
    pub event_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            large_file_threshold_bytes: 8 * 1024 * 1024,
            index_block_size: editor_core::line_index::DEFAULT_INDEX_BLOCK_SIZE,
            validate_utf8: true,
            yield_between_chunks_ms: 1,
            event_queue_capacity: 64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStrategy {
    /// Line-offset index plus on-demand line reads.
    Indexed,
    /// Chunked sequential read into an editable buffer.
    Streamed,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to write config: {0}")]
    Write(#[from] io::errors::WriteError),
}

impl Config {
    /// Reads a JSON config file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Io`] if the file exists but cannot be read.
    /// - [`ConfigError::Parse`] if it is not valid JSON for this shape.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        match std::fs::read(path.as_ref()) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.as_ref().display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// # Errors
    ///
    /// - [`ConfigError::Write`] if the atomic write fails.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;

        io::write_back::WriteBackWriter::new(path).write(&json)?;

        Ok(())
    }

    #[must_use]
    pub fn strategy_for(&self, file_size: u64) -> LoadStrategy {
        if file_size > self.large_file_threshold_bytes {
            LoadStrategy::Indexed
        } else {
            LoadStrategy::Streamed
        }
    }

    #[must_use]
    pub fn indexer(&self) -> editor_core::line_index::indexer::LineOffsetIndexer {
        editor_core::line_index::indexer::LineOffsetIndexer::new(self.index_block_size)
            .validate_utf8(self.validate_utf8)
    }

    #[must_use]
    pub fn stream_loader(&self) -> editor_core::stream::loader::ChunkedStreamLoader {
        editor_core::stream::loader::ChunkedStreamLoader::new(std::time::Duration::from_millis(
            self.yield_between_chunks_ms,
        ))
    }
}
