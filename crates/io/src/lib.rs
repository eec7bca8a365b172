//! Byte-level file plumbing shared by the loaders: block filling, UTF-8
//! decoding across block boundaries, and atomic write-back.
pub mod block;
pub mod errors;
pub mod utf8;
pub mod write_back;
