//! Run progress events.
//!
//! This module defines the records a supervisor streams to a client while a
//! provisioning run executes. Every event is self-contained and is written on
//! the wire as one JSON object per line, discriminated by a `type` field:
//!
//! ```json
//! {"type":"step_start","step":"workers"}
//! {"type":"finished","success":true,"aborted":false}
//! ```
//!
//! A stream for one run always ends with exactly one terminal event
//! (`finished` or `error`).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::run_models::StepDefinition;

/// Events sent from a run worker to its single consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The full step catalog for the run, sent before any output is read.
    Steps { steps: Vec<StepDefinition> },

    /// A new step was entered.
    StepStart { step: String },

    /// A step was left, either for the next step or on success.
    StepDone { step: String },

    /// The run failed while this step was open.
    StepFailed { step: String },

    /// The provisioner announced a task.
    Task {
        /// Step open when the task was announced.
        step: Option<String>,
        name: String,
    },

    /// An output line carried a failure marker.
    ///
    /// Advisory only: the run outcome is decided by the exit code.
    TaskWarning { step: Option<String>, line: String },

    /// The run reached a terminal state.
    Finished { success: bool, aborted: bool },

    /// The run could not proceed, e.g. the provisioner failed to spawn.
    Error { message: String },
}

impl Event {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Finished { .. } | Event::Error { .. })
    }

    /// Wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Steps { .. } => "steps",
            Event::StepStart { .. } => "step_start",
            Event::StepDone { .. } => "step_done",
            Event::StepFailed { .. } => "step_failed",
            Event::Task { .. } => "task",
            Event::TaskWarning { .. } => "task_warning",
            Event::Finished { .. } => "finished",
            Event::Error { .. } => "error",
        }
    }

    /// Serialize as one newline-terminated NDJSON record.
    pub fn to_ndjson(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
