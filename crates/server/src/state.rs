use ck_core::config::AppConfig;
use ck_core::supervisor::ProcessSupervisor;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub supervisor: Arc<ProcessSupervisor>,

    /// Directory `/generate` writes the inventory tree into.
    pub inventory_root: PathBuf,
}

impl AppState {
    pub fn new(supervisor: ProcessSupervisor, inventory_root: impl Into<PathBuf>) -> Self {
        Self {
            supervisor: Arc::new(supervisor),
            inventory_root: inventory_root.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ProcessSupervisor::from_config(config),
            config.inventory_root(),
        )
    }
}
