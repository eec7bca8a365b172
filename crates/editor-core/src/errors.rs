pub type LoadResult<T> = Result<T, LoadError>;

/// Why a load or a line retrieval did not produce text.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid or truncated UTF-8, located by absolute byte offset in the file.
    #[error("invalid UTF-8 at byte {byte_offset}")]
    Encoding { byte_offset: u64 },
    /// The owner asked the worker to stop. Not a failure.
    #[error("load cancelled")]
    Cancelled,
}

impl LoadError {
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }
}

impl From<io::errors::DecodeError> for LoadError {
    fn from(value: io::errors::DecodeError) -> Self {
        LoadError::Encoding {
            byte_offset: value.byte_offset,
        }
    }
}

// The only way an emit fails is the consumer hanging up, which is a cancellation.
impl From<util::event_queue::Disconnected> for LoadError {
    fn from(_: util::event_queue::Disconnected) -> Self {
        LoadError::Cancelled
    }
}
