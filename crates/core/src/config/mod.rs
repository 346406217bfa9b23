//! Configuration loading.
//!
//! Settings live under `<root>/.clusterkit/`:
//! - `config.toml`: global settings
//! - `catalogs/<kind>.yaml`: step catalog overrides

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::AppConfig;

/// Name of the configuration directory under the project root.
pub const CONFIG_DIR: &str = ".clusterkit";
