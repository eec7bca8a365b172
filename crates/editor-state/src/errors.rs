pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {action} while the document is {state:?}")]
    InvalidState {
        state: crate::document::SessionState,
        action: &'static str,
    },
    /// Virtualized documents are views; they have no buffer to edit or save.
    #[error("document is open as a read-only virtualized view")]
    ReadOnly,
    #[error(transparent)]
    Load(#[from] editor_core::errors::LoadError),
    #[error(transparent)]
    Write(#[from] io::errors::WriteError),
    #[error(transparent)]
    Buffer(#[from] crate::buffer::BufferError),
}

impl From<std::io::Error> for SessionError {
    fn from(value: std::io::Error) -> Self {
        SessionError::Load(editor_core::errors::LoadError::Io(value))
    }
}
