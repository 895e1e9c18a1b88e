//! Staging area for per-request input copies and intermediate files.
//!
//! Every staged file gets a unique name inside one working directory. The
//! directory is created on demand and removed again once the last staged
//! file is gone.

use crate::error::{MultisumError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            MultisumError::Other(format!(
                "Failed to create staging directory {}: {e}",
                self.dir.display()
            ))
        })
    }

    /// Reserve a uniquely named, empty file with the given extension.
    ///
    /// Another request may remove the directory once its last file is gone,
    /// between our `create_dir_all` and the file creation; the directory is
    /// then recreated and the creation retried.
    pub fn reserve(&self, prefix: &str, extension: &str) -> Result<StagedFile> {
        const ATTEMPTS: usize = 5;

        let suffix = format!(".{extension}");
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(&suffix);

        let mut attempt = 1;
        let file = loop {
            self.ensure_dir()?;
            match builder.tempfile_in(&self.dir) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound && attempt < ATTEMPTS => {
                    tracing::debug!(
                        dir = %self.dir.display(),
                        attempt,
                        "Staging directory vanished"
                    );
                    attempt += 1;
                }
                other => break other?,
            }
        };
        let path = file
            .into_temp_path()
            .keep()
            .map_err(|e| MultisumError::Io(e.error))?;

        tracing::debug!(path = %path.display(), "Staged file reserved");
        Ok(StagedFile::new(path))
    }

    /// Write direct text input to a staged `.txt` file.
    pub fn stage_text(&self, text: &str) -> Result<StagedFile> {
        let staged = self.reserve("input-", "txt")?;
        let mut file = fs::File::create(staged.path())?;
        file.write_all(text.as_bytes())?;
        Ok(staged)
    }

    /// Copy an input file into the staging area, keeping its extension.
    pub fn stage_copy(&self, source: &Path) -> Result<StagedFile> {
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin")
            .to_ascii_lowercase();
        let staged = self.reserve("input-", &extension)?;
        fs::copy(source, staged.path()).map_err(|e| {
            MultisumError::Other(format!("Failed to stage {}: {e}", source.display()))
        })?;
        Ok(staged)
    }

    /// Remove the staging directory if nothing is left in it.
    pub fn remove_if_empty(&self) {
        remove_dir_if_empty(&self.dir);
    }
}

fn remove_dir_if_empty(dir: &Path) {
    let is_empty = fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false);
    if is_empty
        && let Err(e) = fs::remove_dir(dir)
    {
        tracing::debug!(dir = %dir.display(), error = %e, "Staging directory not removed");
    }
}

/// A file inside the staging area, deleted on `close()` or drop.
///
/// Removal is best-effort: failures are logged and never returned as errors.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    removed: bool,
}

impl StagedFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now instead of at drop.
    pub fn close(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;

        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Staged file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove staged file"
                );
            }
        }

        if let Some(parent) = self.path.parent() {
            remove_dir_if_empty(parent);
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        self.remove();
    }
}
