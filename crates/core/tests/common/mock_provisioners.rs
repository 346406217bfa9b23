//! Provisioner and inventory doubles.

use async_trait::async_trait;
use ck_core::inventory::{InventoryError, InventoryProvider};
use ck_core::provisioner::{Launch, Provisioner, SpawnError};
use std::path::PathBuf;
use tokio::process::Command;

/// Runs a shell script instead of a playbook.
///
/// The script sees the staged key path as `$1`, the inventory as `$2` and the
/// user name as `$3`.
pub struct ScriptProvisioner {
    pub script: String,
}

impl ScriptProvisioner {
    pub fn new(script: &str) -> Self {
        Self {
            script: script.to_string(),
        }
    }
}

impl Provisioner for ScriptProvisioner {
    fn command(&self, launch: &Launch<'_>) -> Result<Command, SpawnError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.script)
            .arg("ck-test")
            .arg(launch.private_key)
            .arg(launch.inventory)
            .arg(launch.username);
        Ok(cmd)
    }
}

/// Points at a program that does not exist.
#[allow(dead_code)]
pub struct MissingProvisioner;

impl Provisioner for MissingProvisioner {
    fn command(&self, _launch: &Launch<'_>) -> Result<Command, SpawnError> {
        Ok(Command::new("/nonexistent/ck-provisioner"))
    }
}

/// Always resolves to the same inventory path.
pub struct FixedInventory {
    pub path: PathBuf,
}

#[async_trait]
impl InventoryProvider for FixedInventory {
    async fn inventory(&self) -> Result<PathBuf, InventoryError> {
        Ok(self.path.clone())
    }
}

/// Behaves as if no inventory was ever generated.
#[allow(dead_code)]
pub struct AbsentInventory;

#[async_trait]
impl InventoryProvider for AbsentInventory {
    async fn inventory(&self) -> Result<PathBuf, InventoryError> {
        Err(InventoryError::Missing {
            path: PathBuf::from("/nonexistent/all.yaml"),
        })
    }
}
