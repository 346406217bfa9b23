//! `ansible-playbook` provisioner.

use crate::provisioner::base::{Launch, Provisioner, SpawnError};
use ck_protocol::config_models::ProvisionerConfig;
use ck_protocol::run_models::InstallKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Environment overrides applied to every run: no host-key prompts, no
/// colour codes, unbuffered output.
pub const ANSIBLE_ENV: [(&str, &str); 4] = [
    ("ANSIBLE_HOST_KEY_CHECKING", "False"),
    ("ANSIBLE_NOCOLOR", "1"),
    ("ANSIBLE_FORCE_COLOR", "0"),
    ("PYTHONUNBUFFERED", "1"),
];

/// Runs the install or uninstall playbook with `ansible-playbook`.
#[derive(Debug, Clone)]
pub struct AnsibleProvisioner {
    config: ProvisionerConfig,
    playbook_dir: PathBuf,
}

impl AnsibleProvisioner {
    /// Create a provisioner from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The `[provisioner]` section of the global config
    /// * `root` - Project root that a relative `playbook_dir` is resolved against
    pub fn from_config(config: &ProvisionerConfig, root: &Path) -> Self {
        Self {
            config: config.clone(),
            playbook_dir: root.join(&config.playbook_dir),
        }
    }

    /// Full path of the playbook for an operation kind.
    pub fn playbook(&self, kind: InstallKind) -> PathBuf {
        self.playbook_dir.join(self.config.playbook(kind))
    }

    fn resolve_binary(&self) -> Result<PathBuf, SpawnError> {
        which::which(&self.config.binary).map_err(|e| SpawnError::NotFound {
            binary: self.config.binary.clone(),
            reason: e.to_string(),
        })
    }
}

impl Provisioner for AnsibleProvisioner {
    fn command(&self, launch: &Launch<'_>) -> Result<Command, SpawnError> {
        let binary = self.resolve_binary()?;

        let mut cmd = Command::new(binary);
        cmd.arg("-i").arg(launch.inventory);
        cmd.arg(self.playbook(launch.kind));
        cmd.arg("-u").arg(launch.username);
        cmd.arg("--private-key").arg(launch.private_key);
        if self.config.verbose {
            cmd.arg("-v");
        }
        cmd.envs(ANSIBLE_ENV);

        Ok(cmd)
    }
}
