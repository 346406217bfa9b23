//! Runtime run state models.
//!
//! This module defines the structures for tracking the single provisioning
//! run a supervisor may own at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

/// Lifecycle status of the supervisor's run slot.
///
/// The status progresses through these states during a run:
/// Idle -> Running -> Succeeded | Failed | Aborted
///
/// A finished status stays current until the next run starts; only
/// `Running` blocks a new start.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// No run has been started yet.
    #[default]
    Idle,

    /// The external process is being prepared or is executing.
    Running,

    /// The external process exited with code zero.
    Succeeded,

    /// The external process exited non-zero or could not be started.
    Failed,

    /// The run was cancelled by an explicit abort request.
    Aborted,
}

impl RunStatus {
    /// Whether a run currently occupies the single-flight slot.
    pub fn is_running(self) -> bool {
        matches!(self, RunStatus::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStatus::Idle => "idle",
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
            RunStatus::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// Which provisioning operation a run performs.
///
/// The kind selects both the step catalog and the playbook handed to the
/// provisioner.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum InstallKind {
    Install,
    Uninstall,
}

impl InstallKind {
    /// All kinds, in catalog file order.
    pub const ALL: [InstallKind; 2] = [InstallKind::Install, InstallKind::Uninstall];

    /// Lowercase name used on the wire and for catalog file names.
    pub fn as_str(self) -> &'static str {
        match self {
            InstallKind::Install => "install",
            InstallKind::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for InstallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstallKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "install" => Ok(InstallKind::Install),
            "uninstall" => Ok(InstallKind::Uninstall),
            other => Err(format!("unknown operation kind '{other}' (expected install or uninstall)")),
        }
    }
}

/// One coarse-grained phase of a run, detected from output text.
///
/// Serialized with the pattern under the `match` key:
/// ```json
/// { "id": "workers", "match": "worker-install", "label": "Joining worker nodes" }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StepDefinition {
    /// Stable identifier carried by step events.
    pub id: String,

    /// Literal substring whose presence in an output line enters this step.
    #[serde(rename = "match")]
    pub match_pattern: String,

    /// Human-readable label for progress display.
    pub label: String,
}

impl StepDefinition {
    pub fn new(
        id: impl Into<String>,
        match_pattern: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            match_pattern: match_pattern.into(),
            label: label.into(),
        }
    }
}

/// Read-only view of the supervisor's run slot.
///
/// Never carries the staged credential location.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, TS)]
pub struct RunSnapshot {
    pub status: RunStatus,

    /// Operation of the current or most recent run.
    pub kind: Option<InstallKind>,

    #[ts(type = "string | null")]
    pub run_id: Option<Uuid>,

    /// Step currently open, if any line has matched the catalog yet.
    pub active_step: Option<String>,

    pub started_at: Option<DateTime<Utc>>,

    pub finished_at: Option<DateTime<Utc>>,
}
