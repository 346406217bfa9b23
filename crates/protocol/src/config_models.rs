//! Global configuration models for `.clusterkit/config.toml`.
//!
//! Every section and field is optional; a missing file yields
//! [`GlobalConfig::default`].
//!
//! # Example
//!
//! ```toml
//! # .clusterkit/config.toml
//! [provisioner]
//! binary = "ansible-playbook"
//! playbook_dir = "playbooks"
//! install_playbook = "k3s-install.yml"
//!
//! [inventory]
//! root = "vm_data"
//!
//! [server]
//! bind = "0.0.0.0:5000"
//!
//! [credentials]
//! staging_dir = "/run/clusterkit"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use ts_rs::TS;

use crate::run_models::InstallKind;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(default)]
pub struct GlobalConfig {
    pub provisioner: ProvisionerConfig,
    pub inventory: InventoryConfig,
    pub server: ServerConfig,
    pub credentials: CredentialConfig,
}

/// How the external provisioning tool is invoked.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct ProvisionerConfig {
    /// Executable name or path, resolved through `PATH`.
    pub binary: String,

    /// Directory holding the playbooks. Relative to the project root.
    pub playbook_dir: PathBuf,

    pub install_playbook: String,

    pub uninstall_playbook: String,

    /// Pass `-v` to the provisioner.
    pub verbose: bool,
}

impl ProvisionerConfig {
    /// Playbook file name for an operation kind.
    pub fn playbook(&self, kind: InstallKind) -> &str {
        match kind {
            InstallKind::Install => &self.install_playbook,
            InstallKind::Uninstall => &self.uninstall_playbook,
        }
    }
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            binary: "ansible-playbook".to_string(),
            playbook_dir: PathBuf::from("."),
            install_playbook: "install.yml".to_string(),
            uninstall_playbook: "uninstall.yml".to_string(),
            verbose: true,
        }
    }
}

/// Where the generated inventory tree lives.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct InventoryConfig {
    /// Directory receiving `all.yaml` and `host_vars/`. Relative to the project root.
    pub root: PathBuf,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("vm_data"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP server listens on.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(default)]
pub struct CredentialConfig {
    /// Directory for transient key files. Defaults to the system temp dir.
    pub staging_dir: Option<PathBuf>,
}
