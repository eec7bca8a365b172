//! Per-document session state on top of `editor-core`: picks a load strategy
//! by file size, runs the load on a worker thread, drains its events on the
//! UI thread and owns the resulting line store or editable buffer.
pub mod buffer;
pub mod config;
pub mod document;
pub mod errors;
pub mod worker;
