//! Event emission for one run.
//!
//! [`EventEmitter`] turns classifications into protocol events and owns the
//! stream invariants: `step_start`/`step_done` pairs never overlap, and
//! nothing is sent after the terminal event.

use crate::classifier::Classification;
use ck_protocol::events::Event;
use ck_protocol::run_models::StepDefinition;
use tokio::sync::mpsc;

/// Sending half of a run's event stream.
#[derive(Debug)]
pub struct EventEmitter {
    tx: mpsc::Sender<Event>,
    open_step: Option<String>,
    terminated: bool,
    detached: bool,
}

impl EventEmitter {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self {
            tx,
            open_step: None,
            terminated: false,
            detached: false,
        }
    }

    /// Step currently open, if any.
    pub fn active_step(&self) -> Option<&str> {
        self.open_step.as_deref()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Announce the catalog for the run.
    pub async fn steps(&mut self, steps: &[StepDefinition]) {
        self.send(Event::Steps {
            steps: steps.to_vec(),
        })
        .await;
    }

    /// Emit the events one classified line produces.
    ///
    /// Order within a line: step transition, then task, then warning.
    pub async fn apply(&mut self, line: &str, classification: &Classification<'_>) {
        if classification.step_changed {
            if let Some(next) = classification.step {
                if let Some(previous) = self.open_step.take() {
                    self.send(Event::StepDone { step: previous }).await;
                }
                self.open_step = Some(next.to_string());
                self.send(Event::StepStart {
                    step: next.to_string(),
                })
                .await;
            }
        }

        if let Some(name) = classification.task {
            self.send(Event::Task {
                step: self.open_step.clone(),
                name: name.to_string(),
            })
            .await;
        }

        if classification.warning {
            self.send(Event::TaskWarning {
                step: self.open_step.clone(),
                line: line.trim().to_string(),
            })
            .await;
        }
    }

    /// Close the open step as done and finish successfully.
    pub async fn succeed(&mut self) {
        if let Some(step) = self.open_step.take() {
            self.send(Event::StepDone { step }).await;
        }
        self.finish(Event::Finished {
            success: true,
            aborted: false,
        })
        .await;
    }

    /// Close the open step as failed and finish unsuccessfully.
    pub async fn fail(&mut self) {
        if let Some(step) = self.open_step.take() {
            self.send(Event::StepFailed { step }).await;
        }
        self.finish(Event::Finished {
            success: false,
            aborted: false,
        })
        .await;
    }

    /// Finish as aborted. The open step is left without a closing event.
    pub async fn aborted(&mut self) {
        self.open_step = None;
        self.finish(Event::Finished {
            success: false,
            aborted: true,
        })
        .await;
    }

    /// Finish with an error.
    pub async fn error(&mut self, message: impl Into<String>) {
        self.open_step = None;
        self.finish(Event::Error {
            message: message.into(),
        })
        .await;
    }

    /// Non-blocking variant of [`EventEmitter::error`] for use from `Drop`.
    ///
    /// Dropped if the channel is full.
    pub fn try_error(&mut self, message: impl Into<String>) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        self.open_step = None;
        let _ = self.tx.try_send(Event::Error {
            message: message.into(),
        });
    }

    async fn finish(&mut self, event: Event) {
        self.send(event).await;
        self.terminated = true;
    }

    async fn send(&mut self, event: Event) {
        if self.terminated {
            tracing::warn!(kind = event.kind(), "Dropping event after terminal event");
            return;
        }
        if self.tx.send(event).await.is_err() && !self.detached {
            self.detached = true;
            tracing::debug!("Event consumer went away, run continues unobserved");
        }
    }
}
