pub mod indexer;
pub mod line_iter;
pub mod offsets;
pub mod store;

/// Line terminator. Detection never depends on multi-byte sequences.
pub const LINE_TERMINATOR: u8 = b'\n';

pub const DEFAULT_INDEX_BLOCK_SIZE: usize = 64 * 1024;
pub const MIN_INDEX_BLOCK_SIZE: usize = 4 * 1024;
pub const MAX_INDEX_BLOCK_SIZE: usize = 1024 * 1024;
