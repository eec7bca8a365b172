/// One decoded block of a streamed load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkEvent {
    pub text: String,
    /// `floor(bytes_read * 100 / total)`; exactly 100 on the final chunk.
    pub percent: u8,
}

/// Everything a load worker publishes to the UI loop, in production order.
#[derive(Debug)]
pub enum LoadEvent {
    IndexProgress {
        percent: u8,
    },
    Chunk(ChunkEvent),
    /// The index is complete and the store is ready to serve lines.
    Indexed(crate::line_index::store::VirtualLineStore),
    /// The last chunk has been delivered.
    Completed,
    /// Terminal. No further events follow.
    Failed(crate::errors::LoadError),
}
