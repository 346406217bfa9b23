//! Ansible inventory management.
//!
//! This module provides:
//! - [`InventoryProvider`], the seam the supervisor resolves an inventory through
//! - [`FileInventory`], which serves a generated inventory tree from disk
//! - [`generate_inventory`], which writes that tree from a fleet description

pub mod generator;

pub use generator::{generate_inventory, InventorySummary};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the inventory root inside the inventory directory.
pub const INVENTORY_FILE: &str = "all.yaml";

/// Directory of per-host variable files inside the inventory directory.
pub const HOST_VARS_DIR: &str = "host_vars";

/// Errors that can occur while resolving or generating an inventory.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// No inventory has been generated yet.
    #[error("Inventory not found at {path}; generate it first")]
    Missing { path: PathBuf },

    /// The fleet description was rejected.
    #[error("Invalid inventory request: {reason}")]
    Invalid { reason: String },

    /// Failed to write a file of the inventory tree.
    #[error("Failed to write inventory file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to render YAML.
    #[error("Failed to serialize inventory: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

impl InventoryError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// Resolves the inventory reference handed to the provisioner.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    /// Path of the inventory to run against.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError` if no usable inventory exists.
    async fn inventory(&self) -> Result<PathBuf, InventoryError>;
}

/// Inventory tree generated under a directory.
#[derive(Debug, Clone)]
pub struct FileInventory {
    root: PathBuf,
}

impl FileInventory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl InventoryProvider for FileInventory {
    async fn inventory(&self) -> Result<PathBuf, InventoryError> {
        let path = self.root.join(INVENTORY_FILE);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Ok(path),
            _ => Err(InventoryError::Missing { path }),
        }
    }
}
