//! Step catalogs per operation kind.
//!
//! A catalog is the ordered list of coarse phases the provisioner is expected
//! to go through. Order documents the expected sequence only; detection is
//! done by [`classify`](crate::classifier::classify) on substrings.

use ck_protocol::run_models::{InstallKind, StepDefinition};

/// Ordered step definitions for one operation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCatalog {
    kind: InstallKind,
    steps: Vec<StepDefinition>,
}

impl StepCatalog {
    pub fn new(kind: InstallKind, steps: Vec<StepDefinition>) -> Self {
        Self { kind, steps }
    }

    /// Built-in catalog matching the role names of the bundled k3s playbooks.
    pub fn builtin(kind: InstallKind) -> Self {
        let steps = match kind {
            InstallKind::Install => vec![
                StepDefinition::new("prepare", "prepare-hosts", "Preparing hosts"),
                StepDefinition::new("download", "download-k3s", "Downloading k3s"),
                StepDefinition::new("masters", "master-install", "Installing master nodes"),
                StepDefinition::new("workers", "worker-install", "Joining worker nodes"),
                StepDefinition::new("verify", "verify-cluster", "Verifying cluster"),
            ],
            InstallKind::Uninstall => vec![
                StepDefinition::new("workers", "worker-uninstall", "Removing worker nodes"),
                StepDefinition::new("masters", "master-uninstall", "Removing master nodes"),
                StepDefinition::new("cleanup", "cleanup-hosts", "Cleaning up hosts"),
            ],
        };
        Self::new(kind, steps)
    }

    pub fn kind(&self) -> InstallKind {
        self.kind
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    /// Look up a step by id.
    pub fn get(&self, id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|step| step.id == id)
    }
}

/// One catalog per operation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSet {
    install: StepCatalog,
    uninstall: StepCatalog,
}

impl CatalogSet {
    /// Build a set from explicit catalogs.
    ///
    /// Each catalog is filed under its own kind, so argument order does not
    /// matter for well-formed input.
    pub fn new(install: StepCatalog, uninstall: StepCatalog) -> Self {
        Self::default().with(install).with(uninstall)
    }

    /// Replace the catalog for the kind carried by `catalog`.
    pub fn with(mut self, catalog: StepCatalog) -> Self {
        match catalog.kind() {
            InstallKind::Install => self.install = catalog,
            InstallKind::Uninstall => self.uninstall = catalog,
        }
        self
    }

    pub fn get(&self, kind: InstallKind) -> &StepCatalog {
        match kind {
            InstallKind::Install => &self.install,
            InstallKind::Uninstall => &self.uninstall,
        }
    }
}

impl Default for CatalogSet {
    fn default() -> Self {
        Self {
            install: StepCatalog::builtin(InstallKind::Install),
            uninstall: StepCatalog::builtin(InstallKind::Uninstall),
        }
    }
}
