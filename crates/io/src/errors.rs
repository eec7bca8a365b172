pub type WriteResult<T> = Result<T, WriteError>;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The temporary file next to the destination could not be created or written.
    #[error("failed to stage write for `{}`: {source}", path.display())]
    Stage {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The staged file could not be renamed over the destination.
    #[error("failed to replace `{}`: {source}", path.display())]
    Replace {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WriteError {
    /// The underlying OS error, whichever stage it came from.
    #[must_use]
    pub fn io_error(&self) -> &std::io::Error {
        match self {
            WriteError::Stage { source, .. } | WriteError::Replace { source, .. } => source,
        }
    }
}

/// An invalid or truncated UTF-8 sequence, located by absolute byte offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid UTF-8 at byte {byte_offset}")]
pub struct DecodeError {
    pub byte_offset: u64,
}
