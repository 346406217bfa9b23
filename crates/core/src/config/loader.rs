//! Configuration file loader for the `.clusterkit/` directory.

use crate::catalog::{CatalogSet, StepCatalog};
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::models::AppConfig;
use crate::config::CONFIG_DIR;
use ck_protocol::config_models::GlobalConfig;
use ck_protocol::run_models::{InstallKind, StepDefinition};
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

/// Loads all configuration from the `.clusterkit/` directory.
///
/// # Arguments
///
/// * `root` - Project root containing the `.clusterkit/` folder
///
/// # Returns
///
/// An `AppConfig` anchored at `root`. Missing files or directories fall back
/// to defaults rather than failing.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - `config.toml` or a catalog file has invalid syntax
/// - A catalog file is named after an unknown kind, is empty, or repeats a step id
///
/// # Example
///
/// ```rust,no_run
/// use ck_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Inventory at {}", config.inventory_root().display());
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let ck_dir = root.join(CONFIG_DIR);

    if !ck_dir.exists() {
        tracing::debug!(root = %root.display(), "No configuration directory, using defaults");
        return Ok(AppConfig::with_root(root));
    }

    let global = load_global_config(&ck_dir)?;
    let catalogs = load_catalogs(&ck_dir)?;

    Ok(AppConfig {
        root: root.to_path_buf(),
        global,
        catalogs,
    })
}

/// Loads global configuration from `config.toml`.
fn load_global_config(ck_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = ck_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })
}

/// Applies catalog overrides from `catalogs/<kind>.yaml` over the built-ins.
fn load_catalogs(ck_dir: &Path) -> ConfigResult<CatalogSet> {
    let catalogs_dir = ck_dir.join("catalogs");
    let mut catalogs = CatalogSet::default();

    if !catalogs_dir.exists() {
        return Ok(catalogs);
    }

    for entry in WalkDir::new(&catalogs_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: catalogs_dir.clone(),
            source,
        })?;

        let path = entry.path();

        let ext = path.extension().and_then(|s| s.to_str());
        if ext != Some("yaml") && ext != Some("yml") {
            continue;
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let kind: InstallKind = stem.parse().map_err(|reason| ConfigError::InvalidConfig {
            path: path.to_path_buf(),
            reason,
        })?;

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let steps: Vec<StepDefinition> =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
                path: path.to_path_buf(),
                source,
            })?;

        validate_steps(path, &steps)?;

        tracing::debug!(%kind, steps = steps.len(), path = %path.display(), "Loaded catalog override");
        catalogs = catalogs.with(StepCatalog::new(kind, steps));
    }

    Ok(catalogs)
}

fn validate_steps(path: &Path, steps: &[StepDefinition]) -> ConfigResult<()> {
    let invalid = |reason: String| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        reason,
    };

    if steps.is_empty() {
        return Err(invalid("catalog has no steps".to_string()));
    }

    let mut ids = HashSet::new();
    for step in steps {
        if step.id.trim().is_empty() {
            return Err(invalid("step id must not be empty".to_string()));
        }
        if step.match_pattern.is_empty() {
            return Err(invalid(format!("step '{}' has an empty match pattern", step.id)));
        }
        if !ids.insert(step.id.as_str()) {
            return Err(invalid(format!("duplicate step id '{}'", step.id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_config_full() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let ck_dir = root.join(CONFIG_DIR);
        fs::create_dir_all(ck_dir.join("catalogs")).unwrap();

        fs::write(
            ck_dir.join("config.toml"),
            r#"
[provisioner]
playbook_dir = "playbooks"
verbose = false

[inventory]
root = "inventory"
"#,
        )
        .unwrap();

        fs::write(
            ck_dir.join("catalogs/install.yaml"),
            r#"
- id: docker
  match: docker-install
  label: Installing Docker
- id: workers
  match: worker-install
  label: Joining workers
"#,
        )
        .unwrap();

        let config = load_config(root).await.unwrap();

        assert!(!config.global.provisioner.verbose);
        assert_eq!(config.global.provisioner.binary, "ansible-playbook");
        assert_eq!(config.inventory_root(), root.join("inventory"));

        let install = config.catalogs.get(InstallKind::Install);
        let ids: Vec<_> = install.steps().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["docker", "workers"]);
        assert_eq!(
            config.catalogs.get(InstallKind::Uninstall),
            &StepCatalog::builtin(InstallKind::Uninstall)
        );
    }

    #[tokio::test]
    async fn test_load_config_empty_directory() {
        let dir = tempdir().unwrap();

        let config = load_config(dir.path()).await.unwrap();

        assert_eq!(config.global, GlobalConfig::default());
        assert_eq!(config.root, dir.path());
        assert_eq!(
            config.catalogs.get(InstallKind::Install),
            &StepCatalog::builtin(InstallKind::Install)
        );
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let ck_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&ck_dir).unwrap();
        fs::write(ck_dir.join("config.toml"), "[provisioner\nbinary = ").unwrap();

        match load_config(dir.path()).await {
            Err(ConfigError::TomlParse { path, .. }) => assert!(path.ends_with("config.toml")),
            other => panic!("Expected TomlParse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_config_unknown_catalog_kind() {
        let dir = tempdir().unwrap();
        let catalogs = dir.path().join(CONFIG_DIR).join("catalogs");
        fs::create_dir_all(&catalogs).unwrap();
        fs::write(
            catalogs.join("upgrade.yaml"),
            "- id: a\n  match: a\n  label: A\n",
        )
        .unwrap();

        match load_config(dir.path()).await {
            Err(ConfigError::InvalidConfig { path, .. }) => assert!(path.ends_with("upgrade.yaml")),
            other => panic!("Expected InvalidConfig error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_config_rejects_bad_catalogs() {
        let cases = [
            "[]\n",
            "- id: a\n  match: x\n  label: A\n- id: a\n  match: y\n  label: B\n",
            "- id: a\n  match: ''\n  label: A\n",
        ];

        for content in cases {
            let dir = tempdir().unwrap();
            let catalogs = dir.path().join(CONFIG_DIR).join("catalogs");
            fs::create_dir_all(&catalogs).unwrap();
            fs::write(catalogs.join("uninstall.yml"), content).unwrap();

            let result = load_config(dir.path()).await;
            assert!(
                matches!(result, Err(ConfigError::InvalidConfig { .. })),
                "accepted catalog {content:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_load_config_invalid_yaml() {
        let dir = tempdir().unwrap();
        let catalogs = dir.path().join(CONFIG_DIR).join("catalogs");
        fs::create_dir_all(&catalogs).unwrap();
        fs::write(catalogs.join("install.yaml"), "- id: a\n  match: [x").unwrap();

        match load_config(dir.path()).await {
            Err(ConfigError::YamlParse { path, .. }) => assert!(path.ends_with("install.yaml")),
            other => panic!("Expected YamlParse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_yaml_files_are_ignored() {
        let dir = tempdir().unwrap();
        let catalogs = dir.path().join(CONFIG_DIR).join("catalogs");
        fs::create_dir_all(&catalogs).unwrap();
        fs::write(catalogs.join("README.md"), "# notes").unwrap();

        let config = load_config(dir.path()).await.unwrap();
        assert_eq!(
            config.catalogs.get(InstallKind::Install),
            &StepCatalog::builtin(InstallKind::Install)
        );
    }
}
