/// Background thread running one load, plus the means to stop it.
///
/// The worker publishes into an [`EventSender`](util::event_queue::EventSender)
/// and finishes with exactly one terminal event (`Indexed`, `Completed` or
/// `Failed`) unless it was cancelled, in which case it publishes nothing more.
/// Its file handle lives on the worker's stack, so it is released as soon as
/// the thread exits.
#[derive(Debug)]
pub struct LoadWorker {
    token: util::cancel::CancellationToken,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl LoadWorker {
    /// # Errors
    ///
    /// - `std::io::Error` if the OS refuses to spawn the thread.
    pub fn spawn(
        path: std::path::PathBuf,
        strategy: crate::config::LoadStrategy,
        config: &crate::config::Config,
        events: util::event_queue::EventSender<editor_core::events::LoadEvent>,
    ) -> std::io::Result<Self> {
        let token = util::cancel::CancellationToken::new();
        let worker_token = token.clone();
        let indexer = config.indexer();
        let loader = config.stream_loader();

        let thread_name = match path.file_name() {
            Some(name) => format!("load-{}", name.to_string_lossy()),
            None => "load-document".to_string(),
        };

        let handle = std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                let mut events = events;
                let result = match strategy {
                    crate::config::LoadStrategy::Indexed => {
                        editor_core::line_index::store::VirtualLineStore::open(
                            &path,
                            &indexer,
                            &worker_token,
                            &mut events,
                        )
                        .map(editor_core::events::LoadEvent::Indexed)
                    }
                    crate::config::LoadStrategy::Streamed => loader
                        .load_path(&path, &worker_token, &mut events)
                        .map(|_| editor_core::events::LoadEvent::Completed),
                };

                let terminal = match result {
                    Ok(event) => event,
                    Err(e) if e.is_cancelled() => {
                        tracing::debug!(path = %path.display(), "load worker stopped by cancellation");
                        return;
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "load failed");
                        editor_core::events::LoadEvent::Failed(e)
                    }
                };

                // A dropped receiver means the owner lost interest; an undelivered
                // store is dropped here, closing its handle.
                if events.send(terminal).is_err() {
                    tracing::debug!(path = %path.display(), "load finished after receiver hung up");
                }
            })?;

        Ok(Self {
            token,
            handle: Some(handle),
        })
    }

    /// Asks the worker to stop at its next block boundary. Does not wait.
    pub fn request_cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(std::thread::JoinHandle::is_finished)
    }

    /// Waits for the thread to exit.
    ///
    /// The worker may be blocked on a full event queue; drop the receiver
    /// first or this can wait forever.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("load worker panicked");
        }
    }
}

impl Drop for LoadWorker {
    fn drop(&mut self) {
        self.request_cancel();
        self.join();
    }
}
