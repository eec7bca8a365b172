//! Bounded single-consumer queue between a background worker and the UI loop.
//!
//! Events are delivered in exactly the order they were sent. The receiver is
//! deliberately not `Clone`, so there is only ever one consumer; dropping it
//! discards whatever is still queued and makes further sends fail, which is
//! how a worker learns that nobody is listening anymore.

/// Returned by [`EventSink::emit`] once the consuming side is gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Disconnected;

impl std::fmt::Display for Disconnected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event receiver disconnected")
    }
}

impl std::error::Error for Disconnected {}

/// Anything a worker can publish events into.
pub trait EventSink<T> {
    /// # Errors
    ///
    /// - [`Disconnected`] if the consumer has gone away.
    fn emit(&mut self, event: T) -> Result<(), Disconnected>;
}

impl<T> EventSink<T> for Vec<T> {
    fn emit(&mut self, event: T) -> Result<(), Disconnected> {
        self.push(event);

        Ok(())
    }
}

#[derive(Debug)]
pub struct EventSender<T> {
    inner: crossbeam_channel::Sender<T>,
}

// Manual impl: cloning the sender must not require `T: Clone`.
impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[derive(Debug)]
pub struct EventReceiver<T> {
    inner: crossbeam_channel::Receiver<T>,
}

/// Creates a queue holding at most `capacity` undelivered events.
///
/// A full queue blocks the sender until the receiver catches up. A capacity of
/// zero is raised to one.
#[must_use]
pub fn bounded<T>(capacity: usize) -> (EventSender<T>, EventReceiver<T>) {
    let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));

    (EventSender { inner: tx }, EventReceiver { inner: rx })
}

impl<T> EventSender<T> {
    /// Blocks while the queue is full.
    ///
    /// # Errors
    ///
    /// - [`Disconnected`] if the receiver was dropped.
    pub fn send(&self, event: T) -> Result<(), Disconnected> {
        self.inner.send(event).map_err(|_| Disconnected)
    }
}

impl<T> EventSink<T> for EventSender<T> {
    fn emit(&mut self, event: T) -> Result<(), Disconnected> {
        self.send(event)
    }
}

impl<T> EventReceiver<T> {
    /// Takes every event queued right now, in production order, without blocking.
    pub fn drain(&self) -> impl Iterator<Item = T> + '_ {
        self.inner.try_iter()
    }

    /// Waits up to `timeout` for the next event.
    ///
    /// Returns `None` on timeout or once all senders are gone and the queue is empty.
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<T> {
        self.inner.recv_timeout(timeout).ok()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
