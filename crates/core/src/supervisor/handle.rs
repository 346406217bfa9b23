//! Run slot state machine.
//!
//! [`RunHandle`] is the only mutable state shared between the request path
//! and the run worker. It lives behind one exclusive lock owned by the
//! supervisor; every method here is a short, non-blocking transition meant to
//! be called while that lock is held.

use crate::supervisor::error::{SupervisorError, SupervisorResult};
use chrono::{DateTime, Utc};
use ck_protocol::run_models::{InstallKind, RunSnapshot, RunStatus};
use std::path::PathBuf;
use uuid::Uuid;

/// State of the supervisor's single run slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunHandle {
    pub run_id: Option<Uuid>,
    pub kind: Option<InstallKind>,

    /// Pid of the provisioner, which also leads its process group.
    ///
    /// Cleared as soon as the process is reaped.
    pub process_id: Option<u32>,

    pub staged_credential: Option<PathBuf>,
    pub status: RunStatus,
    pub active_step: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Held from `begin` until the worker settles the run.
    ///
    /// Outlives `running`: an aborted run keeps the slot until its process
    /// has been reaped.
    occupied: bool,
}

impl RunHandle {
    /// Claim the slot for a new run.
    ///
    /// # Returns
    ///
    /// The handle as it was before the claim, for [`RunHandle::restore`].
    ///
    /// # Errors
    ///
    /// `SupervisorError::Conflict` if a run is in progress or an aborted run
    /// has not settled yet; the handle is left untouched.
    pub fn begin(&mut self, run_id: Uuid, kind: InstallKind) -> SupervisorResult<RunHandle> {
        if self.occupied || self.status.is_running() {
            return Err(SupervisorError::Conflict);
        }

        let previous = std::mem::take(self);
        *self = RunHandle {
            run_id: Some(run_id),
            kind: Some(kind),
            status: RunStatus::Running,
            started_at: Some(Utc::now()),
            occupied: true,
            ..RunHandle::default()
        };
        Ok(previous)
    }

    /// Undo a claim that failed before anything was spawned.
    pub fn restore(&mut self, run_id: Uuid, previous: RunHandle) {
        if self.owned_by(run_id) {
            *self = previous;
        }
    }

    /// Whether a run holds the slot, including an aborted one still exiting.
    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Whether the slot currently belongs to `run_id`.
    pub fn owned_by(&self, run_id: Uuid) -> bool {
        self.run_id == Some(run_id)
    }

    pub fn record_credential(&mut self, run_id: Uuid, path: PathBuf) {
        if self.owned_by(run_id) {
            self.staged_credential = Some(path);
        }
    }

    /// Record the spawned process.
    ///
    /// # Returns
    ///
    /// `true` if an abort arrived before the process existed, in which case
    /// the caller must signal the group itself.
    pub fn attach_process(&mut self, run_id: Uuid, pid: Option<u32>) -> bool {
        if !self.owned_by(run_id) {
            return false;
        }
        self.process_id = pid;
        self.status == RunStatus::Aborted
    }

    pub fn set_active_step(&mut self, run_id: Uuid, step: Option<String>) {
        if self.owned_by(run_id) {
            self.active_step = step;
        }
    }

    /// Flip a running run to aborted.
    ///
    /// # Returns
    ///
    /// The process-group id to signal, if the process has been spawned.
    ///
    /// # Errors
    ///
    /// `SupervisorError::NotRunning` unless the status is `running`.
    pub fn request_abort(&mut self) -> SupervisorResult<Option<u32>> {
        if !self.status.is_running() {
            return Err(SupervisorError::NotRunning);
        }
        self.status = RunStatus::Aborted;
        Ok(self.process_id)
    }

    /// Forget the process once it has been reaped.
    pub fn release_process(&mut self, run_id: Uuid) {
        if self.owned_by(run_id) {
            self.process_id = None;
        }
    }

    pub fn clear_credential(&mut self, run_id: Uuid) {
        if self.owned_by(run_id) {
            self.staged_credential = None;
        }
    }

    /// Decide the final status from the process exit.
    ///
    /// An abort recorded earlier always wins over the exit code.
    ///
    /// # Returns
    ///
    /// The settled status, or `None` if `run_id` no longer owns the slot.
    pub fn resolve(&mut self, run_id: Uuid, exit_success: bool) -> Option<RunStatus> {
        if !self.owned_by(run_id) {
            return None;
        }
        if self.status != RunStatus::Aborted {
            self.status = if exit_success {
                RunStatus::Succeeded
            } else {
                RunStatus::Failed
            };
        }
        self.finish();
        Some(self.status)
    }

    /// Mark the run failed unless it already reached a terminal status.
    pub fn fail(&mut self, run_id: Uuid) -> RunStatus {
        if !self.owned_by(run_id) {
            return self.status;
        }
        if self.status.is_running() {
            self.status = RunStatus::Failed;
        }
        self.finish();
        self.status
    }

    fn finish(&mut self) {
        self.process_id = None;
        self.staged_credential = None;
        self.finished_at = Some(Utc::now());
        self.occupied = false;
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            status: self.status,
            kind: self.kind,
            run_id: self.run_id,
            active_step: self.active_step.clone(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}
