use std::io::Write;

/// Persists full document text to a destination path.
///
/// The text is staged in a temporary file inside the destination's own
/// directory and renamed over the destination once it is fully on disk, so
/// readers observe either the old content or the new content, never a mix.
#[derive(Debug, Clone)]
pub struct WriteBackWriter {
    dest: std::path::PathBuf,
}

impl WriteBackWriter {
    pub fn new(dest: impl AsRef<std::path::Path>) -> Self {
        Self {
            dest: dest.as_ref().to_path_buf(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dest(&self) -> &std::path::Path {
        &self.dest
    }

    /// Writes `text` as UTF-8 in one sequential pass and atomically replaces
    /// the destination.
    ///
    /// # Errors
    ///
    /// - [`WriteError::Stage`](crate::errors::WriteError::Stage) if the
    ///   temporary file cannot be created, written or synced. The destination
    ///   is left untouched.
    /// - [`WriteError::Replace`](crate::errors::WriteError::Replace) if the
    ///   final rename fails. The staged file is removed.
    pub fn write(&self, text: &str) -> crate::errors::WriteResult<()> {
        let stage_err = |source| crate::errors::WriteError::Stage {
            path: self.dest.clone(),
            source,
        };

        // Renames are only atomic within one filesystem, so stage next to the target.
        let parent_dir = match self.dest.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => std::path::Path::new("."),
        };
        let mut staged = tempfile::Builder::new()
            .prefix(".save_tmp_")
            .tempfile_in(parent_dir)
            .map_err(stage_err)?;

        staged.write_all(text.as_bytes()).map_err(stage_err)?;
        staged.as_file().sync_all().map_err(stage_err)?;

        if let Ok(meta) = std::fs::metadata(&self.dest) {
            staged
                .as_file()
                .set_permissions(meta.permissions())
                .map_err(stage_err)?;
        }

        // On failure `PersistError` hands the temp file back; dropping it deletes it.
        staged
            .persist(&self.dest)
            .map_err(|e| crate::errors::WriteError::Replace {
                path: self.dest.clone(),
                source: e.error,
            })?;

        tracing::debug!(path = %self.dest.display(), bytes = text.len(), "write-back complete");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WriteError;

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");

        WriteBackWriter::new(&path).write("héllo\nworld").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "héllo\nworld");
    }

    #[test]
    fn test_write_replaces_longer_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("existing.txt");
        std::fs::write(&path, "a much longer original body of text").unwrap();

        WriteBackWriter::new(&path).write("short").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "short");
    }

    #[test]
    fn test_write_leaves_no_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");

        WriteBackWriter::new(&path).write("one").unwrap();
        WriteBackWriter::new(&path).write("two").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("doc.txt")]);
    }

    #[test]
    fn test_missing_directory_is_a_stage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("doc.txt");

        let err = WriteBackWriter::new(&path).write("text").unwrap_err();

        assert!(matches!(err, WriteError::Stage { .. }));
        assert_eq!(err.io_error().kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_rename_over_directory_keeps_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occupied");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("inner.txt"), "keep").unwrap();

        let err = WriteBackWriter::new(&path).write("text").unwrap_err();

        assert!(matches!(err, WriteError::Replace { .. }));
        assert_eq!(std::fs::read_to_string(path.join("inner.txt")).unwrap(), "keep");
        // Only the destination directory remains; the staged file was cleaned up.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
