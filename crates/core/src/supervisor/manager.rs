//! Single-flight supervisor for provisioning runs.

use crate::catalog::{CatalogSet, StepCatalog};
use crate::config::AppConfig;
use crate::inventory::{FileInventory, InventoryProvider};
use crate::provisioner::{AnsibleProvisioner, Launch, Provisioner};
use crate::signal;
use crate::staging::CredentialStager;
use crate::supervisor::emitter::EventEmitter;
use crate::supervisor::error::SupervisorResult;
use crate::supervisor::handle::RunHandle;
use crate::supervisor::lock;
use crate::supervisor::worker::RunWorker;
use ck_protocol::events::Event;
use ck_protocol::ipc::Credentials;
use ck_protocol::run_models::{InstallKind, RunSnapshot, RunStatus};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use uuid::Uuid;

/// Events of one run, ending with exactly one terminal event.
pub type EventStream = Pin<Box<dyn Stream<Item = Event> + Send>>;

/// Capacity of a run's event channel.
pub const EVENT_BUFFER: usize = 128;

/// Owns the run slot and starts, observes and aborts provisioning runs.
///
/// At most one run is in progress at any time. All mutable state lives in a
/// single [`RunHandle`] behind a mutex that is never held across an await.
///
/// # Example
///
/// ```rust,no_run
/// use ck_core::config::load_config;
/// use ck_core::supervisor::ProcessSupervisor;
/// use ck_protocol::ipc::Credentials;
/// use ck_protocol::run_models::InstallKind;
/// use tokio_stream::StreamExt;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// let supervisor = ProcessSupervisor::from_config(&config);
///
/// let credentials = Credentials::new("ubuntu", std::fs::read_to_string("id_ed25519")?);
/// let mut events = supervisor.start(InstallKind::Install, credentials).await?;
/// while let Some(event) = events.next().await {
///     println!("{}", event.kind());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ProcessSupervisor {
    handle: Arc<Mutex<RunHandle>>,
    provisioner: Arc<dyn Provisioner>,
    inventory: Arc<dyn InventoryProvider>,
    catalogs: Arc<CatalogSet>,
    stager: CredentialStager,
}

impl ProcessSupervisor {
    /// Create a supervisor from its collaborators.
    ///
    /// # Arguments
    ///
    /// * `provisioner` - Builds the external command for a run
    /// * `inventory` - Resolves the inventory passed to the command
    /// * `catalogs` - Step catalogs per operation kind
    /// * `stager` - Where private keys are written for the duration of a run
    pub fn new(
        provisioner: Arc<dyn Provisioner>,
        inventory: Arc<dyn InventoryProvider>,
        catalogs: CatalogSet,
        stager: CredentialStager,
    ) -> Self {
        Self {
            handle: Arc::new(Mutex::new(RunHandle::default())),
            provisioner,
            inventory,
            catalogs: Arc::new(catalogs),
            stager,
        }
    }

    /// Create a supervisor running `ansible-playbook` against the generated
    /// inventory, as configured.
    pub fn from_config(config: &AppConfig) -> Self {
        let stager = match config.staging_dir() {
            Some(dir) => CredentialStager::in_dir(dir),
            None => CredentialStager::new(),
        };
        Self::new(
            Arc::new(AnsibleProvisioner::from_config(
                &config.global.provisioner,
                &config.root,
            )),
            Arc::new(FileInventory::new(config.inventory_root())),
            config.catalogs.clone(),
            stager,
        )
    }

    /// Start a run.
    ///
    /// # Returns
    ///
    /// The live event stream of the run. Dropping it does not stop the run.
    ///
    /// # Errors
    ///
    /// - `SupervisorError::Conflict` if a run is in progress, including an
    ///   aborted run whose process has not exited yet
    /// - `SupervisorError::Inventory` or `SupervisorError::Staging` if the run
    ///   could not be prepared; the slot is left as it was before the call
    ///
    /// Failures after this point, including a provisioner that cannot be
    /// spawned, are reported on the stream.
    pub async fn start(
        &self,
        kind: InstallKind,
        credentials: Credentials,
    ) -> SupervisorResult<EventStream> {
        let run_id = Uuid::new_v4();
        let previous = self.lock().begin(run_id, kind)?;

        let inventory = match self.inventory.inventory().await {
            Ok(path) => path,
            Err(e) => {
                self.lock().restore(run_id, previous);
                return Err(e.into());
            }
        };

        let credential = match self.stager.stage(&credentials.private_key) {
            Ok(credential) => credential,
            Err(e) => {
                self.lock().restore(run_id, previous);
                return Err(e.into());
            }
        };
        self.lock()
            .record_credential(run_id, credential.path().to_path_buf());

        let command = self.provisioner.command(&Launch {
            kind,
            inventory: &inventory,
            username: &credentials.username,
            private_key: credential.path(),
        });

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let worker = RunWorker::new(
            run_id,
            Arc::clone(&self.handle),
            self.catalogs.get(kind).clone(),
            credential,
            EventEmitter::new(tx),
        );
        tokio::spawn(worker.run(command));

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    /// Request termination of the running run.
    ///
    /// Returns once the request is recorded and the process group signalled;
    /// the run's stream reports the outcome.
    ///
    /// # Errors
    ///
    /// `SupervisorError::NotRunning` unless a run is in progress.
    pub fn abort(&self) -> SupervisorResult<()> {
        let pgid = self.lock().request_abort()?;
        tracing::info!(?pgid, "Abort requested");

        if let Some(pgid) = pgid {
            signal::terminate_group(pgid);
        }
        Ok(())
    }

    /// Status of the current or most recent run.
    pub fn status(&self) -> RunStatus {
        self.lock().status
    }

    /// Full view of the run slot, as served on `/status`.
    pub fn snapshot(&self) -> RunSnapshot {
        self.lock().snapshot()
    }

    /// Catalog a run of `kind` would report.
    pub fn catalog(&self, kind: InstallKind) -> &StepCatalog {
        self.catalogs.get(kind)
    }

    fn lock(&self) -> MutexGuard<'_, RunHandle> {
        lock(&self.handle)
    }
}
