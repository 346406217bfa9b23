//! Inventory tree generation.
//!
//! Layout written under the inventory directory:
//!
//! ```text
//! all.yaml              all.children.{masters,workers}.hosts.<name>: null
//! host_vars/<name>.yaml server_name, server_ip, var_master | var_worker
//! ```

use crate::inventory::{InventoryError, HOST_VARS_DIR, INVENTORY_FILE};
use ck_protocol::inventory_models::{InventoryRequest, Node, NodeRole};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct InventoryRoot {
    all: Group,
}

#[derive(Serialize)]
struct Group {
    children: Children,
}

#[derive(Serialize)]
struct Children {
    masters: Hosts,
    workers: Hosts,
}

#[derive(Serialize, Default)]
struct Hosts {
    hosts: BTreeMap<String, ()>,
}

#[derive(Serialize)]
struct HostVars<'a> {
    server_name: &'a str,
    server_ip: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    var_master: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    var_worker: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primordial_master: Option<bool>,
}

/// What [`generate_inventory`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySummary {
    pub inventory: PathBuf,
    pub masters: usize,
    pub workers: usize,
    pub primordial_master: String,
}

/// Write the inventory tree for a fleet.
///
/// Existing host files for the same names are overwritten; files of hosts no
/// longer in the fleet are left alone and are not referenced by `all.yaml`.
///
/// # Arguments
///
/// * `root` - Inventory directory; created if missing
/// * `request` - Machines and the optional primordial master
///
/// # Errors
///
/// Returns `InventoryError::Invalid` before touching disk if the fleet has no
/// master, a blank or duplicate name, a blank ip, a name containing a path
/// separator, or a primordial master that is not a master.
pub fn generate_inventory(
    root: &Path,
    request: &InventoryRequest,
) -> Result<InventorySummary, InventoryError> {
    let primordial = validate(request)?;

    let host_vars_dir = root.join(HOST_VARS_DIR);
    std::fs::create_dir_all(&host_vars_dir).map_err(|source| InventoryError::Write {
        path: host_vars_dir.clone(),
        source,
    })?;

    let mut masters = Hosts::default();
    let mut workers = Hosts::default();

    for node in &request.vms {
        let name = node.name.trim();
        let is_master = node.role == NodeRole::Master;
        let vars = HostVars {
            server_name: name,
            server_ip: node.ip.trim(),
            var_master: is_master.then_some(true),
            var_worker: (!is_master).then_some(true),
            primordial_master: (name == primordial).then_some(true),
        };

        write_yaml(&host_vars_dir.join(format!("{name}.yaml")), &vars)?;

        let group = if is_master { &mut masters } else { &mut workers };
        group.hosts.insert(name.to_string(), ());
    }

    let summary = InventorySummary {
        inventory: root.join(INVENTORY_FILE),
        masters: masters.hosts.len(),
        workers: workers.hosts.len(),
        primordial_master: primordial.to_string(),
    };

    let tree = InventoryRoot {
        all: Group {
            children: Children { masters, workers },
        },
    };
    write_yaml(&summary.inventory, &tree)?;

    tracing::info!(
        path = %summary.inventory.display(),
        masters = summary.masters,
        workers = summary.workers,
        "Generated inventory"
    );
    Ok(summary)
}

/// Check the fleet and pick the primordial master.
fn validate(request: &InventoryRequest) -> Result<&str, InventoryError> {
    let mut seen = HashSet::new();
    for node in &request.vms {
        check_node(node)?;
        if !seen.insert(node.name.trim()) {
            return Err(InventoryError::invalid(format!(
                "duplicate machine name '{}'",
                node.name.trim()
            )));
        }
    }

    let mut masters = request
        .vms
        .iter()
        .filter(|n| n.role == NodeRole::Master)
        .map(|n| n.name.trim());

    match request.primordial_master.as_deref().map(str::trim) {
        Some(wanted) if !wanted.is_empty() => masters
            .find(|name| *name == wanted)
            .ok_or_else(|| {
                InventoryError::invalid(format!("primordial master '{wanted}' is not a master"))
            }),
        _ => masters
            .next()
            .ok_or_else(|| InventoryError::invalid("at least one master is required")),
    }
}

fn check_node(node: &Node) -> Result<(), InventoryError> {
    let name = node.name.trim();
    if name.is_empty() {
        return Err(InventoryError::invalid("machine name must not be empty"));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(InventoryError::invalid(format!(
            "machine name '{name}' is not a valid file name"
        )));
    }
    if node.ip.trim().is_empty() {
        return Err(InventoryError::invalid(format!(
            "machine '{name}' has no ip address"
        )));
    }
    Ok(())
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), InventoryError> {
    let content = serde_yaml::to_string(value)?;
    std::fs::write(path, content).map_err(|source| InventoryError::Write {
        path: path.to_path_buf(),
        source,
    })
}
