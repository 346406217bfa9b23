//! The per-run worker task.
//!
//! One [`RunWorker`] is spawned per accepted start. It owns the staged
//! credential and the sending half of the event stream, drives the
//! provisioner to completion and settles the run slot.

use crate::catalog::StepCatalog;
use crate::classifier::classify;
use crate::provisioner::executor;
use crate::provisioner::SpawnError;
use crate::signal;
use crate::staging::StagedCredential;
use crate::supervisor::emitter::EventEmitter;
use crate::supervisor::lock;
use crate::supervisor::RunHandle;
use ck_protocol::run_models::RunStatus;
use std::io;
use std::sync::{Arc, Mutex};
use tokio::process::Command;
use tokio_stream::StreamExt;
use uuid::Uuid;

pub(crate) struct RunWorker {
    run_id: Uuid,
    handle: Arc<Mutex<RunHandle>>,
    catalog: StepCatalog,
    credential: StagedCredential,
    emitter: EventEmitter,
}

impl RunWorker {
    pub(crate) fn new(
        run_id: Uuid,
        handle: Arc<Mutex<RunHandle>>,
        catalog: StepCatalog,
        credential: StagedCredential,
        emitter: EventEmitter,
    ) -> Self {
        Self {
            run_id,
            handle,
            catalog,
            credential,
            emitter,
        }
    }

    /// Drive the run from the `steps` announcement to the terminal event.
    pub(crate) async fn run(mut self, command: Result<Command, SpawnError>) {
        tracing::info!(run_id = %self.run_id, kind = %self.catalog.kind(), "Run started");
        self.emitter.steps(self.catalog.steps()).await;

        let mut child = match command.and_then(executor::spawn_in_group) {
            Ok(child) => child,
            Err(e) => return self.spawn_failed(e).await,
        };

        let pid = child.id();
        let abort_pending = lock(&self.handle).attach_process(self.run_id, pid);
        if abort_pending {
            if let Some(pgid) = pid {
                tracing::info!(run_id = %self.run_id, pgid, "Abort requested before spawn completed");
                signal::terminate_group(pgid);
            }
        }

        match executor::output_lines(&mut child) {
            Ok(mut lines) => {
                while let Some(line) = lines.next().await {
                    match line {
                        Ok(line) => self.handle_line(&line).await,
                        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                            tracing::debug!(run_id = %self.run_id, "Skipping non UTF-8 output line");
                        }
                        Err(e) => {
                            tracing::warn!(run_id = %self.run_id, error = %e, "Failed to read provisioner output");
                            break;
                        }
                    }
                }
            }
            Err(e) => tracing::warn!(run_id = %self.run_id, error = %e, "Provisioner output unavailable"),
        }

        let success = match child.wait().await {
            Ok(status) => {
                tracing::debug!(run_id = %self.run_id, ?status, "Provisioner exited");
                status.success()
            }
            Err(e) => {
                tracing::warn!(run_id = %self.run_id, error = %e, "Failed to wait for provisioner");
                false
            }
        };

        self.finish(success).await;
    }

    async fn handle_line(&mut self, line: &str) {
        let classification = classify(line, self.catalog.steps(), self.emitter.active_step());
        if !classification.is_noteworthy() {
            return;
        }
        tracing::debug!(run_id = %self.run_id, ?classification, "Classified output line");

        self.emitter.apply(line, &classification).await;

        if classification.step_changed {
            let step = self.emitter.active_step().map(str::to_string);
            lock(&self.handle).set_active_step(self.run_id, step);
        }
    }

    /// Clean up, settle the slot, then emit the closing events.
    async fn finish(&mut self, exit_success: bool) {
        self.credential.unstage();
        let status = {
            let mut handle = lock(&self.handle);
            handle.release_process(self.run_id);
            handle.clear_credential(self.run_id);
            handle.resolve(self.run_id, exit_success)
        };

        match status {
            Some(RunStatus::Aborted) => {
                tracing::info!(run_id = %self.run_id, "Run aborted");
                self.emitter.aborted().await;
            }
            Some(RunStatus::Succeeded) => {
                tracing::info!(run_id = %self.run_id, "Run succeeded");
                self.emitter.succeed().await;
            }
            Some(status) => {
                tracing::info!(run_id = %self.run_id, %status, "Run failed");
                self.emitter.fail().await;
            }
            None => {
                tracing::warn!(run_id = %self.run_id, "Run slot was taken over before the run settled");
                self.emitter.error("run slot was taken over before the run settled").await;
            }
        }
    }

    async fn spawn_failed(&mut self, error: SpawnError) {
        tracing::error!(run_id = %self.run_id, error = %error, "Failed to start provisioner");
        self.credential.unstage();
        lock(&self.handle).fail(self.run_id);
        self.emitter.error(error.to_string()).await;
    }
}

impl Drop for RunWorker {
    fn drop(&mut self) {
        self.credential.unstage();
        if self.emitter.is_terminated() {
            return;
        }

        let (orphan, status) = {
            let mut handle = lock(&self.handle);
            let orphan = if handle.owned_by(self.run_id) {
                handle.process_id
            } else {
                None
            };
            (orphan, handle.fail(self.run_id))
        };
        if let Some(pgid) = orphan {
            signal::terminate_group(pgid);
        }

        tracing::error!(run_id = %self.run_id, %status, "Run worker stopped before the run finished");
        self.emitter.try_error("run worker stopped before the run finished");
    }
}
