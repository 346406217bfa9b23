//! Error types for supervisor operations.

use crate::inventory::InventoryError;
use crate::staging::StagingError;
use thiserror::Error;

/// Errors returned by [`ProcessSupervisor`](super::ProcessSupervisor) calls.
///
/// Failures that happen after a run has started are reported on its event
/// stream instead.
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// A run is already in progress.
    #[error("A provisioning run is already in progress")]
    Conflict,

    /// Abort was requested with no run in progress.
    #[error("No provisioning run is in progress")]
    NotRunning,

    /// The private key could not be staged; nothing was started.
    #[error(transparent)]
    Staging(#[from] StagingError),

    /// The inventory could not be resolved; nothing was started.
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Type alias for Result with SupervisorError.
pub type SupervisorResult<T> = Result<T, SupervisorError>;
