//! Writing generated files.
//!
//! Existing files are left alone unless overwriting was asked for, so hand
//! edits survive a regeneration. Replacements go through a temporary file in
//! the target directory that is renamed over the target, so a reader never
//! sees a half-written file.

use crate::error::{GenerateError, GenerateResult};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The file existed and overwriting is off.
    Skipped,
}

#[derive(Debug, Clone, Copy)]
pub struct ArtifactWriter {
    overwrite: bool,
}

impl ArtifactWriter {
    pub fn new(overwrite: bool) -> Self {
        Self { overwrite }
    }

    #[must_use]
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Write `content` to `path`. Skipping an existing file counts as success.
    pub fn write(&self, path: &Path, content: &str) -> GenerateResult<WriteOutcome> {
        if !self.overwrite && path.exists() {
            debug!(file = %path.display(), "File exists, keeping it");
            return Ok(WriteOutcome::Skipped);
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| GenerateError::io(path, e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|()| tmp.flush())
            .map_err(|e| GenerateError::io(path, e))?;
        set_default_permissions(&tmp, path)?;
        tmp.persist(path)
            .map_err(|e| GenerateError::io(path, e.error))?;

        debug!(file = %path.display(), "Wrote file");
        Ok(WriteOutcome::Written)
    }
}

// Temporary files are private to the owner; generated files should not be.
#[cfg(unix)]
fn set_default_permissions(tmp: &NamedTempFile, path: &Path) -> GenerateResult<()> {
    use std::os::unix::fs::PermissionsExt;

    tmp.as_file()
        .set_permissions(std::fs::Permissions::from_mode(0o644))
        .map_err(|e| GenerateError::io(path, e))
}

#[cfg(not(unix))]
fn set_default_permissions(_tmp: &NamedTempFile, _path: &Path) -> GenerateResult<()> {
    Ok(())
}

#[cfg(test)]
#[path = "writer/writer_tests.rs"]
mod writer_tests;
