//! # ck-protocol
//!
//! Core protocol definitions and data models for clusterkit.
//!
//! This crate defines all shared data structures used for:
//! - Configuration file parsing (`.clusterkit/config.toml`)
//! - Run state reporting
//! - The NDJSON event stream consumed by the browser client
//! - Inventory and probe requests
//!
//! ## Modules
//!
//! - [`config_models`]: Global configuration from config.toml
//! - [`events`]: Run progress events
//! - [`inventory_models`]: Fleet description submitted by the client
//! - [`ipc`]: Request and response bodies
//! - [`run_models`]: Run status, operation kinds and step definitions
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, serde_json, ts-rs, uuid and chrono
//! - TypeScript generation: All types derive `TS` for client compatibility
//! - Independent compilation: No dependencies on other clusterkit crates

pub mod config_models;
pub mod events;
pub mod inventory_models;
pub mod ipc;
pub mod run_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use events::*;
pub use inventory_models::*;
pub use ipc::*;
pub use run_models::*;
