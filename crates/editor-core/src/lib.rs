//! Large-file loading: a streaming line-offset indexer with a virtualized
//! line store for files too large to buffer, and an adaptively chunked
//! streaming loader for files that are buffered in full.
pub mod errors;
pub mod events;
pub mod line_index;
pub mod stream;
