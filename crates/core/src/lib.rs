//! # ck-core
//!
//! Provisioning run supervision for clusterkit.
//!
//! This crate provides:
//! - Configuration loading from the `.clusterkit/` directory
//! - Step catalogs and classification of provisioner output
//! - Transient credential staging
//! - The single-flight process supervisor and its event stream
//! - Inventory generation and SSH reachability probing
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading
//! - [`catalog`]: Step catalogs per operation kind
//! - [`classifier`]: Output line classification
//! - [`staging`]: Private key staging
//! - [`provisioner`]: External command construction and spawning
//! - [`supervisor`]: Run lifecycle and event emission
//! - [`inventory`]: Inventory resolution and generation
//! - [`reachability`]: TCP reachability probes

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod inventory;
pub mod provisioner;
pub mod reachability;
pub mod signal;
pub mod staging;
pub mod supervisor;
