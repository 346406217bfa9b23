//! Base Provisioner trait and supporting types.

use ck_protocol::run_models::InstallKind;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

/// Everything a provisioner needs to build the command for one run.
#[derive(Debug, Clone, Copy)]
pub struct Launch<'a> {
    pub kind: InstallKind,

    /// Inventory reference handed to the provisioner.
    pub inventory: &'a Path,

    /// Remote login user.
    pub username: &'a str,

    /// Staged private key file.
    pub private_key: &'a Path,
}

#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("Provisioner executable '{binary}' not found: {reason}")]
    NotFound { binary: String, reason: String },

    #[error("Failed to spawn provisioner '{program}': {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },

    #[error("Failed to capture provisioner output")]
    MissingPipe,
}

/// Builds the external command for a run.
///
/// Implementations only describe the program, arguments and environment.
/// Piping and process-group placement are applied by the supervisor.
pub trait Provisioner: Send + Sync {
    fn command(&self, launch: &Launch<'_>) -> Result<Command, SpawnError>;
}
