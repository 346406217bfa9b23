//! Loaded application configuration.

use crate::catalog::CatalogSet;
use ck_protocol::config_models::GlobalConfig;
use std::path::{Path, PathBuf};

/// Everything loaded from `.clusterkit/`, anchored at the project root.
///
/// Relative paths in [`GlobalConfig`] are resolved against `root` by the
/// accessors below.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Project root the configuration was loaded from.
    pub root: PathBuf,

    /// Settings from `config.toml`.
    pub global: GlobalConfig,

    /// Built-in catalogs with any `catalogs/*.yaml` overrides applied.
    pub catalogs: CatalogSet,
}

impl AppConfig {
    /// Default configuration for a project root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            global: GlobalConfig::default(),
            catalogs: CatalogSet::default(),
        }
    }

    /// Directory holding `all.yaml` and `host_vars/`.
    pub fn inventory_root(&self) -> PathBuf {
        self.resolve(&self.global.inventory.root)
    }

    /// Directory for staged key files, if one is configured.
    pub fn staging_dir(&self) -> Option<PathBuf> {
        self.global
            .credentials
            .staging_dir
            .as_deref()
            .map(|dir| self.resolve(dir))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_resolve_against_root() {
        let config = AppConfig::with_root("/srv/cluster");

        assert_eq!(config.inventory_root(), PathBuf::from("/srv/cluster/vm_data"));
        assert_eq!(config.staging_dir(), None);
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let mut config = AppConfig::with_root("/srv/cluster");
        config.global.inventory.root = PathBuf::from("/var/lib/inventory");
        config.global.credentials.staging_dir = Some(PathBuf::from("keys"));

        assert_eq!(config.inventory_root(), PathBuf::from("/var/lib/inventory"));
        assert_eq!(config.staging_dir(), Some(PathBuf::from("/srv/cluster/keys")));
    }
}
