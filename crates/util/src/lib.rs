pub mod cancel;
pub mod event_queue;
