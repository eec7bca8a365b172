/// Lifecycle of one document slot.
///
/// `Unloaded -> (Indexing | Streaming) -> Ready <-> Editing -> Saving -> Ready`.
/// `Failed` is entered from `Indexing` or `Streaming` and left only through
/// [`Document::reset`]; a failed load is never resumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unloaded,
    Indexing,
    Streaming,
    Ready,
    Editing,
    Saving,
    Failed,
}

impl SessionState {
    #[inline]
    #[must_use]
    pub fn is_loading(self) -> bool {
        matches!(self, SessionState::Indexing | SessionState::Streaming)
    }
}

/// What a loaded document holds, depending on how it was loaded.
#[derive(Debug)]
pub enum Content {
    /// Read-mostly virtualized view over a large file.
    Indexed(editor_core::line_index::store::VirtualLineStore),
    /// Fully buffered, editable text.
    Buffered(crate::buffer::EditableBuffer),
}

/// What the UI needs to react to after [`Document::poll`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionUpdate {
    IndexProgress { percent: u8 },
    Chunk(editor_core::events::ChunkEvent),
    Ready { line_count: usize },
    Failed { reason: String },
}

/// One open document slot: owns at most one running load and its result.
#[derive(Debug)]
pub struct Document {
    config: crate::config::Config,
    state: SessionState,
    path: Option<std::path::PathBuf>,
    strategy: Option<crate::config::LoadStrategy>,
    /// Declared before `worker`: the receiver must be gone before the worker
    /// is joined, or a worker blocked on a full queue never wakes up.
    events: Option<util::event_queue::EventReceiver<editor_core::events::LoadEvent>>,
    worker: Option<crate::worker::LoadWorker>,
    content: Option<Content>,
    /// Chunk text received so far; becomes the buffer on completion.
    assembling: String,
    progress: u8,
    /// Human-readable reason for the last failed load or save.
    last_error: Option<String>,
}

/*

====================
===== CREATION =====
====================

*/

impl Document {
    #[must_use]
    pub fn new(config: crate::config::Config) -> Self {
        Self {
            config,
            state: SessionState::Unloaded,
            path: None,
            strategy: None,
            events: None,
            worker: None,
            content: None,
            assembling: String::new(),
            progress: 0,
            last_error: None,
        }
    }
}

/*

==========================
===== INLINE METHODS =====
==========================

*/

impl Document {
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn strategy(&self) -> Option<crate::config::LoadStrategy> {
        self.strategy
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &crate::config::Config {
        &self.config
    }

    /// Last reported load or index percentage.
    #[inline]
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    #[must_use]
    pub fn buffer(&self) -> Option<&crate::buffer::EditableBuffer> {
        match &self.content {
            Some(Content::Buffered(buffer)) => Some(buffer),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.buffer().is_some_and(crate::buffer::EditableBuffer::is_dirty)
    }

    #[must_use]
    pub fn line_count(&self) -> Option<usize> {
        match &self.content {
            Some(Content::Indexed(store)) => Some(store.line_count()),
            Some(Content::Buffered(buffer)) => Some(buffer.line_count()),
            None => None,
        }
    }
}

/*

=================
===== LOAD ======
=================

*/

impl Document {
    /// Starts loading `path` on a worker thread.
    ///
    /// Files above `large_file_threshold_bytes` are indexed for a virtualized
    /// view; everything else is streamed into an editable buffer.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidState`](crate::errors::SessionError::InvalidState)
    ///   unless the document is `Unloaded`.
    /// - [`SessionError::Load`](crate::errors::SessionError::Load) if the file
    ///   cannot be inspected or the worker cannot be spawned. The document
    ///   stays `Unloaded`.
    pub fn load(
        &mut self,
        path: impl AsRef<std::path::Path>,
    ) -> crate::errors::SessionResult<crate::config::LoadStrategy> {
        self.require(&[SessionState::Unloaded], "load")?;

        let path = path.as_ref().to_path_buf();
        let size = std::fs::metadata(&path)?.len();
        let strategy = self.config.strategy_for(size);
        let (sender, receiver) = util::event_queue::bounded(self.config.event_queue_capacity);
        let worker = crate::worker::LoadWorker::spawn(path.clone(), strategy, &self.config, sender)?;

        tracing::info!(path = %path.display(), size, ?strategy, "load started");

        self.state = match strategy {
            crate::config::LoadStrategy::Indexed => SessionState::Indexing,
            crate::config::LoadStrategy::Streamed => SessionState::Streaming,
        };
        self.path = Some(path);
        self.strategy = Some(strategy);
        self.events = Some(receiver);
        self.worker = Some(worker);
        self.progress = 0;
        self.last_error = None;

        Ok(strategy)
    }

    /// Applies every event the worker has queued so far, in production order.
    ///
    /// Never blocks. Call it from the UI loop's update cycle.
    pub fn poll(&mut self) -> Vec<SessionUpdate> {
        let Some(events) = &self.events else {
            return Vec::new();
        };
        let pending: Vec<_> = events.drain().collect();
        let mut updates = Vec::with_capacity(pending.len());

        for event in pending {
            updates.extend(self.apply(event));
        }

        self.check_worker_exit(&mut updates);

        updates
    }

    /// Blocks until the load finishes or `timeout` elapses, applying events as
    /// they arrive. Meant for headless callers; the UI uses [`Document::poll`].
    pub fn wait_ready(&mut self, timeout: std::time::Duration) -> Vec<SessionUpdate> {
        let deadline = std::time::Instant::now() + timeout;
        let mut updates = self.poll();

        while self.state.is_loading() {
            let now = std::time::Instant::now();

            if now >= deadline {
                break;
            }

            let step = (deadline - now).min(std::time::Duration::from_millis(50));
            let event = self.events.as_ref().and_then(|rx| rx.recv_timeout(step));

            match event {
                Some(event) => updates.extend(self.apply(event)),
                None => self.check_worker_exit(&mut updates),
            }
        }

        updates
    }

    /// Stops a running load and returns the slot to `Unloaded`.
    ///
    /// Queued events that were not applied yet are discarded, and the worker
    /// has exited (so its file handle is closed) by the time this returns.
    /// Returns `false` if no load was running.
    pub fn cancel(&mut self) -> bool {
        if !self.state.is_loading() {
            return false;
        }

        tracing::info!(path = ?self.path, "load cancelled");

        self.stop_worker();
        self.clear();

        true
    }

    /// Releases everything the slot holds, cancelling a running load first.
    pub fn close(&mut self) {
        self.stop_worker();

        if let Some(Content::Indexed(store)) = self.content.take() {
            store.close();
        }

        self.clear();
    }

    /// Discards a failed session so a fresh load can start.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidState`](crate::errors::SessionError::InvalidState)
    ///   unless the document is `Failed`.
    pub fn reset(&mut self) -> crate::errors::SessionResult<()> {
        self.require(&[SessionState::Failed], "reset")?;
        self.clear();

        Ok(())
    }

    fn apply(&mut self, event: editor_core::events::LoadEvent) -> Option<SessionUpdate> {
        // Late events from a load that was already settled are ignored.
        if !self.state.is_loading() {
            return None;
        }

        match event {
            editor_core::events::LoadEvent::IndexProgress { percent } => {
                self.progress = percent;

                Some(SessionUpdate::IndexProgress { percent })
            }
            editor_core::events::LoadEvent::Chunk(chunk) => {
                self.progress = chunk.percent;
                self.assembling.push_str(&chunk.text);

                Some(SessionUpdate::Chunk(chunk))
            }
            editor_core::events::LoadEvent::Indexed(store) => {
                let line_count = store.line_count();

                self.content = Some(Content::Indexed(store));

                Some(self.finish_ready(line_count))
            }
            editor_core::events::LoadEvent::Completed => {
                let buffer =
                    crate::buffer::EditableBuffer::from_text(std::mem::take(&mut self.assembling));
                let line_count = buffer.line_count();

                self.content = Some(Content::Buffered(buffer));

                Some(self.finish_ready(line_count))
            }
            editor_core::events::LoadEvent::Failed(error) => Some(self.finish_failed(error.to_string())),
        }
    }

    fn finish_ready(&mut self, line_count: usize) -> SessionUpdate {
        self.stop_worker();
        self.state = SessionState::Ready;
        self.progress = 100;

        tracing::info!(path = ?self.path, line_count, "document ready");

        SessionUpdate::Ready { line_count }
    }

    /// The slot stays `Failed`, reason in [`Document::last_error`], until
    /// [`Document::reset`] returns it to `Unloaded`.
    fn finish_failed(&mut self, reason: String) -> SessionUpdate {
        self.stop_worker();
        // A partial buffer is never resumed from.
        self.assembling = String::new();
        self.content = None;
        self.state = SessionState::Failed;
        self.last_error = Some(reason.clone());

        tracing::warn!(path = ?self.path, %reason, "document load failed");

        SessionUpdate::Failed { reason }
    }

    /// Fails the load if the worker died without a terminal event.
    fn check_worker_exit(&mut self, updates: &mut Vec<SessionUpdate>) {
        if !self.state.is_loading() || !self.worker.as_ref().is_some_and(crate::worker::LoadWorker::is_finished) {
            return;
        }

        // The worker may have queued its last events just before exiting.
        let late: Vec<_> = self
            .events
            .as_ref()
            .map(|rx| rx.drain().collect())
            .unwrap_or_default();

        for event in late {
            updates.extend(self.apply(event));
        }

        if self.state.is_loading() {
            updates.push(self.finish_failed("load worker exited unexpectedly".to_string()));
        }
    }

    fn stop_worker(&mut self) {
        if let Some(worker) = &self.worker {
            worker.request_cancel();
        }

        // Receiver first, so a worker blocked on a full queue wakes up and exits.
        self.events = None;

        if let Some(mut worker) = self.worker.take() {
            worker.join();
        }
    }

    fn clear(&mut self) {
        self.state = SessionState::Unloaded;
        self.path = None;
        self.strategy = None;
        self.content = None;
        self.assembling = String::new();
        self.progress = 0;
        self.last_error = None;
    }

    fn require(
        &self,
        allowed: &[SessionState],
        action: &'static str,
    ) -> crate::errors::SessionResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(crate::errors::SessionError::InvalidState {
                state: self.state,
                action,
            })
        }
    }
}

/*

=============================
===== LINES AND EDITING =====
=============================

*/

impl Document {
    /// Text of line `line_idx` without its terminator.
    ///
    /// # Panics
    ///
    /// If `line_idx` is not below [`Document::line_count`].
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidState`](crate::errors::SessionError::InvalidState)
    ///   if nothing is loaded.
    /// - [`SessionError::Load`](crate::errors::SessionError::Load) if a
    ///   virtualized read fails.
    pub fn get_line(&mut self, line_idx: usize) -> crate::errors::SessionResult<String> {
        match &mut self.content {
            Some(Content::Indexed(store)) => Ok(store.get_line(line_idx)?),
            Some(Content::Buffered(buffer)) => {
                let line_count = buffer.line_count();
                let Some(line) = buffer.line(line_idx) else {
                    panic!("line index {line_idx} out of range (line_count={line_count})");
                };

                Ok(line.to_owned())
            }
            None => Err(crate::errors::SessionError::InvalidState {
                state: self.state,
                action: "read lines",
            }),
        }
    }

    /// Runs `edit` against the buffer. A change moves the document to `Editing`,
    /// even when `edit` fails after modifying the buffer.
    ///
    /// # Errors
    ///
    /// - [`SessionError::ReadOnly`](crate::errors::SessionError::ReadOnly) for
    ///   virtualized documents.
    /// - [`SessionError::InvalidState`](crate::errors::SessionError::InvalidState)
    ///   unless `Ready` or `Editing`.
    /// - [`SessionError::Buffer`](crate::errors::SessionError::Buffer) from `edit`.
    pub fn edit<T>(
        &mut self,
        edit: impl FnOnce(&mut crate::buffer::EditableBuffer) -> crate::buffer::BufferResult<T>,
    ) -> crate::errors::SessionResult<T> {
        self.require(&[SessionState::Ready, SessionState::Editing], "edit")?;

        let buffer = self.buffer_mut()?;
        let result = edit(buffer);

        if buffer.is_dirty() {
            self.state = SessionState::Editing;
        }

        Ok(result?)
    }

    /// Writes the buffer back to the document's path.
    ///
    /// On failure the buffer is untouched and the document stays in `Editing`
    /// with the reason in [`Document::last_error`], so the save can be retried.
    ///
    /// # Errors
    ///
    /// - [`SessionError::ReadOnly`](crate::errors::SessionError::ReadOnly) for
    ///   virtualized documents.
    /// - [`SessionError::InvalidState`](crate::errors::SessionError::InvalidState)
    ///   unless `Ready` or `Editing`.
    /// - [`SessionError::Write`](crate::errors::SessionError::Write) if the write fails.
    pub fn save(&mut self) -> crate::errors::SessionResult<()> {
        let Some(path) = self.path.clone() else {
            return Err(crate::errors::SessionError::InvalidState {
                state: self.state,
                action: "save",
            });
        };

        self.save_to(path)
    }

    /// Writes the buffer to `path` and makes it the document's path on success.
    ///
    /// # Errors
    ///
    /// Same as [`Document::save`].
    pub fn save_as(&mut self, path: impl AsRef<std::path::Path>) -> crate::errors::SessionResult<()> {
        self.save_to(path.as_ref().to_path_buf())
    }

    fn save_to(&mut self, path: std::path::PathBuf) -> crate::errors::SessionResult<()> {
        self.require(&[SessionState::Ready, SessionState::Editing], "save")?;

        let buffer = match &mut self.content {
            Some(Content::Buffered(buffer)) => buffer,
            Some(Content::Indexed(_)) => return Err(crate::errors::SessionError::ReadOnly),
            None => {
                return Err(crate::errors::SessionError::InvalidState {
                    state: self.state,
                    action: "save",
                });
            }
        };

        self.state = SessionState::Saving;

        match io::write_back::WriteBackWriter::new(&path).write(buffer.as_str()) {
            Ok(()) => {
                buffer.mark_clean();

                tracing::info!(path = %path.display(), "document saved");

                self.path = Some(path);
                self.state = SessionState::Ready;
                self.last_error = None;

                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "save failed");

                self.state = SessionState::Editing;
                self.last_error = Some(e.to_string());

                Err(e.into())
            }
        }
    }

    fn buffer_mut(&mut self) -> crate::errors::SessionResult<&mut crate::buffer::EditableBuffer> {
        match &mut self.content {
            Some(Content::Buffered(buffer)) => Ok(buffer),
            Some(Content::Indexed(_)) => Err(crate::errors::SessionError::ReadOnly),
            None => Err(crate::errors::SessionError::InvalidState {
                state: self.state,
                action: "edit",
            }),
        }
    }
}
