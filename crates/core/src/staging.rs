//! Transient on-disk copies of private keys.
//!
//! The provisioner reads its identity from a file, so the key text supplied
//! with a run request is written to a fresh owner-only file for the length of
//! that run. [`StagedCredential`] removes the file on [`StagedCredential::unstage`]
//! or, failing that, when it is dropped.

use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name prefix of staged keys.
const KEY_PREFIX: &str = "ck-key-";

/// Errors that can occur while staging a credential.
#[derive(Error, Debug)]
pub enum StagingError {
    /// The key text was empty after trimming.
    #[error("Private key is empty")]
    Empty,

    /// Failed to create the key file.
    #[error("Failed to create key file in {dir}: {source}")]
    Create {
        dir: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the key text.
    #[error("Failed to write key file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to restrict the key file to its owner.
    #[error("Failed to restrict permissions on {path}: {source}")]
    Permissions {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to detach the key file from its temporary handle.
    #[error("Failed to persist key file {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Writes credentials into a staging directory.
#[derive(Debug, Clone, Default)]
pub struct CredentialStager {
    /// Target directory; the system temp dir when `None`.
    dir: Option<PathBuf>,
}

impl CredentialStager {
    /// Stage into the system temp directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage into a specific directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Write `secret` to a new unique owner-only file.
    ///
    /// The secret is trimmed and terminated with a single newline, which
    /// OpenSSH requires of key files.
    ///
    /// # Errors
    ///
    /// Returns `StagingError` if the secret is empty or the file cannot be
    /// created, written, or restricted. Nothing is left on disk in that case.
    pub fn stage(&self, secret: &str) -> Result<StagedCredential, StagingError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(StagingError::Empty);
        }

        let dir = self.dir();
        let mut file = tempfile::Builder::new()
            .prefix(KEY_PREFIX)
            .rand_bytes(12)
            .tempfile_in(&dir)
            .map_err(|source| StagingError::Create {
                dir: dir.clone(),
                source,
            })?;

        // Errors below drop `file`, which removes it.
        restrict_to_owner(file.path()).map_err(|source| StagingError::Permissions {
            path: file.path().to_path_buf(),
            source,
        })?;

        writeln!(file, "{secret}")
            .and_then(|()| file.as_file().sync_all())
            .map_err(|source| StagingError::Write {
                path: file.path().to_path_buf(),
                source,
            })?;

        let path = file.path().to_path_buf();
        let (_, path) = file.keep().map_err(|e| StagingError::Persist {
            path,
            source: e.error,
        })?;

        tracing::debug!(path = %path.display(), "Staged credential");
        Ok(StagedCredential { path, removed: false })
    }
}

/// A key file that exists for one run.
#[derive(Debug)]
pub struct StagedCredential {
    path: PathBuf,
    removed: bool,
}

impl StagedCredential {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Remove the key file. Later calls are no-ops.
    pub fn unstage(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        unstage(&self.path);
    }
}

impl Drop for StagedCredential {
    fn drop(&mut self) {
        self.unstage();
    }
}

/// Best-effort removal of a staged key file.
///
/// A file that is already gone counts as removed.
pub fn unstage(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed staged credential"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged credential"),
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
