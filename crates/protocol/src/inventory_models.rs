//! Fleet description models.
//!
//! The client submits the machines it wants in the cluster; the core turns
//! them into an Ansible inventory tree.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Cluster role of a machine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Master,
    Worker,
}

/// One machine of the fleet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct Node {
    /// Inventory host name; also the `host_vars` file stem.
    pub name: String,

    pub ip: String,

    pub role: NodeRole,
}

/// Body of an inventory generation request.
///
/// ```json
/// {
///   "vms": [
///     { "name": "cp-1", "ip": "10.0.0.10", "role": "master" },
///     { "name": "node-1", "ip": "10.0.0.20", "role": "worker" }
///   ],
///   "primordialMaster": "cp-1"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct InventoryRequest {
    #[serde(default)]
    pub vms: Vec<Node>,

    /// Master that bootstraps the cluster. Defaults to the first master.
    #[serde(default, rename = "primordialMaster", alias = "primordial_master")]
    pub primordial_master: Option<String>,
}
