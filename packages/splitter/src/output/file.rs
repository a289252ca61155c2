//! Atomically published output files.
//!
//! Content goes to a hidden temporary file next to the target. `commit`
//! flushes, syncs and renames it into place; dropping an uncommitted file
//! removes the temporary, so an aborted run never leaves a half-written
//! artifact under its final name.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SplitterError};

/// A file that only appears under its final name once committed.
#[derive(Debug)]
pub struct AtomicFile {
    path: PathBuf,
    temp_path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl AtomicFile {
    /// Start writing a new file at `path`.
    ///
    /// Fails with `ResourceCreation` (kind `AlreadyExists`) when the target
    /// is already present; existing output is never overwritten.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if path.exists() {
            return Err(SplitterError::ResourceCreation {
                source: io::Error::new(io::ErrorKind::AlreadyExists, "output file already exists"),
                path,
            });
        }

        let temp_path = temp_path_for(&path);
        let file = File::create(&temp_path).map_err(|source| SplitterError::ResourceCreation {
            path: temp_path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            temp_path,
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Final location of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, sync and move the file to its final location.
    pub fn commit(mut self) -> Result<PathBuf> {
        let Some(writer) = self.writer.take() else {
            return Err(SplitterError::Io(closed_error()));
        };

        let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        file.sync_all()?;
        drop(file);

        // On Windows, rename fails if the destination already exists
        #[cfg(target_os = "windows")]
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }

        fs::rename(&self.temp_path, &self.path)?;
        Ok(self.path.clone())
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.as_mut().ok_or_else(closed_error)?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.as_mut().ok_or_else(closed_error)?.flush()
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            drop(writer);
            tracing::warn!(
                path = %self.path.display(),
                "Discarding incomplete output"
            );
            if let Err(e) = fs::remove_file(&self.temp_path) {
                tracing::warn!(
                    path = %self.temp_path.display(),
                    error = %e,
                    "Failed to remove temporary file"
                );
            }
        }
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.tmp"))
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "output file already closed")
}
