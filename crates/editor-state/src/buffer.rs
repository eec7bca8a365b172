pub type BufferResult<T> = Result<T, BufferError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("byte position {pos} is past the end of the buffer (len={len})")]
    OutOfBounds { pos: usize, len: usize },
    #[error("byte position {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

/// Fully buffered document text, editable in place.
///
/// Positions are byte offsets into the UTF-8 text. The line index is rebuilt
/// after every edit, which is linear in the text but cache-friendly.
#[derive(Clone, Debug, Default)]
pub struct EditableBuffer {
    text: String,
    line_index: editor_core::line_index::offsets::LineOffsetIndex,
    /// Tracks unsaved changes.
    is_dirty: bool,
}

/*

====================
===== CREATION =====
====================

*/

impl EditableBuffer {
    #[must_use]
    pub fn from_text(text: String) -> Self {
        let line_index = editor_core::line_index::offsets::LineOffsetIndex::from_bytes(text.as_bytes());

        Self {
            text,
            line_index,
            is_dirty: false,
        }
    }
}

/*

==========================
===== INLINE METHODS =====
==========================

*/

impl EditableBuffer {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_index.line_count()
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }
}

/*

===========================
========= GETTERS =========
===========================

*/

impl EditableBuffer {
    /// Line text without its terminator; `None` past the last line.
    #[must_use]
    pub fn line(&self, line_idx: usize) -> Option<&str> {
        let range = self.line_index.line_range(line_idx)?;

        // Line boundaries sit next to '\n', which is always a char boundary.
        self.text
            .get(usize::try_from(range.start).ok()?..usize::try_from(range.end).ok()?)
    }

    /// Byte offset where line `line_idx` starts.
    #[must_use]
    pub fn line_start(&self, line_idx: usize) -> Option<usize> {
        usize::try_from(self.line_index.line_start(line_idx)?).ok()
    }

    #[must_use]
    pub fn line_at_offset(&self, pos: usize) -> Option<usize> {
        self.line_index.line_at_offset(pos as u64)
    }
}

/*

========================================
========= INSERTION & DELETION =========
========================================

*/

impl EditableBuffer {
    /// # Errors
    ///
    /// - [`BufferError::OutOfBounds`] if `pos > len`.
    /// - [`BufferError::NotCharBoundary`] if `pos` splits a character.
    pub fn insert(&mut self, pos: usize, text: &str) -> BufferResult<()> {
        self.check_pos(pos)?;

        if text.is_empty() {
            return Ok(());
        }

        self.text.insert_str(pos, text);
        self.after_edit();

        Ok(())
    }

    /// Removes `range` and returns the removed text.
    ///
    /// # Errors
    ///
    /// - [`BufferError::OutOfBounds`] if the range ends past the buffer or is reversed.
    /// - [`BufferError::NotCharBoundary`] if either end splits a character.
    pub fn delete(&mut self, range: std::ops::Range<usize>) -> BufferResult<String> {
        self.check_range(&range)?;

        if range.is_empty() {
            return Ok(String::new());
        }

        let removed: String = self.text.drain(range).collect();

        self.after_edit();

        Ok(removed)
    }

    /// Replaces `range` with `text` as one edit; returns the replaced text.
    ///
    /// # Errors
    ///
    /// Same as [`EditableBuffer::delete`].
    pub fn replace(&mut self, range: std::ops::Range<usize>, text: &str) -> BufferResult<String> {
        self.check_range(&range)?;

        let removed = self.text[range.clone()].to_owned();

        self.text.replace_range(range, text);
        self.after_edit();

        Ok(removed)
    }

    /// Appends `text` at the end.
    pub fn push_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        self.text.push_str(text);
        self.after_edit();
    }

    fn after_edit(&mut self) {
        self.line_index =
            editor_core::line_index::offsets::LineOffsetIndex::from_bytes(self.text.as_bytes());
        self.is_dirty = true;
    }

    fn check_pos(&self, pos: usize) -> BufferResult<()> {
        if pos > self.text.len() {
            return Err(BufferError::OutOfBounds {
                pos,
                len: self.text.len(),
            });
        }

        if !self.text.is_char_boundary(pos) {
            return Err(BufferError::NotCharBoundary(pos));
        }

        Ok(())
    }

    fn check_range(&self, range: &std::ops::Range<usize>) -> BufferResult<()> {
        if range.start > range.end {
            return Err(BufferError::OutOfBounds {
                pos: range.start,
                len: self.text.len(),
            });
        }

        self.check_pos(range.start)?;
        self.check_pos(range.end)
    }
}

impl std::fmt::Display for EditableBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
