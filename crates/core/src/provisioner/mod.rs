//! External provisioning tool integration.
//!
//! This module provides:
//! - The [`Provisioner`] trait that builds the command for a run
//! - The `ansible-playbook` implementation
//! - Process-group spawning and merged line streaming

pub mod ansible;
pub mod base;
pub mod executor;

pub use ansible::AnsibleProvisioner;
pub use base::{Launch, Provisioner, SpawnError};
