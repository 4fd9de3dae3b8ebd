//! Loading configuration declarations from files.
//!
//! A declaration file is TOML with up to three parts, applied in this order:
//!
//! ```toml
//! unregister = ["legacy"]
//!
//! [update.default]
//! initial_header_level = 2
//!
//! [register.full_page]
//! initial_header_level = 1
//! ```
//!
//! `update` inserts or overwrites, `register` fails on an existing name and
//! `unregister` fails on an unknown one. A failing file leaves the registry as
//! it was before the file was applied.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rstview_config::{Config, DEFAULT_DISCOVERY_FILENAME};
use rstview_engine::Options;
use serde::Deserialize;

use crate::error::DiscoverError;
use crate::registry::ConfigRegistry;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Declaration {
    unregister: Vec<String>,
    update: BTreeMap<String, Options>,
    register: BTreeMap<String, Options>,
}

impl Declaration {
    fn apply(self, registry: &mut ConfigRegistry) -> Result<(), DiscoverError> {
        registry.update(self.update);
        for (name, params) in self.register {
            registry.register(name, params)?;
        }
        for name in &self.unregister {
            registry.unregister(name)?;
        }
        Ok(())
    }
}

/// Where [`autodiscover`] looks for configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySettings {
    /// Configurations seeded before any file is read.
    pub configurations: BTreeMap<String, Options>,
    /// Project-level declaration file.
    pub root_configs: Option<PathBuf>,
    /// Directories searched for `{filename}.toml`, in order.
    pub apps: Vec<PathBuf>,
    /// Declaration file name, without extension.
    pub filename: String,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            configurations: BTreeMap::new(),
            root_configs: None,
            apps: Vec::new(),
            filename: DEFAULT_DISCOVERY_FILENAME.to_owned(),
        }
    }
}

impl DiscoverySettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let discovery = &config.discovery_resolved;
        Self {
            configurations: config.configurations(),
            root_configs: discovery.root_configs.clone(),
            apps: discovery.apps.clone(),
            filename: discovery.filename.clone(),
        }
    }
}

/// Apply `dir/{filename}.toml` to `registry`, if present.
///
/// Returns the path of the applied file, or `None` when `dir` has none.
///
/// # Errors
///
/// Returns [`DiscoverError::MissingModule`] when `dir` does not exist, and
/// the errors of [`discover_file`].
pub fn discover(
    registry: &mut ConfigRegistry,
    dir: &Path,
    filename: &str,
) -> Result<Option<PathBuf>, DiscoverError> {
    if !dir.is_dir() {
        return Err(DiscoverError::MissingModule(dir.to_path_buf()));
    }
    let path = dir.join(format!("{filename}.toml"));
    if !path.is_file() {
        tracing::debug!(dir = %dir.display(), "No configuration declarations");
        return Ok(None);
    }
    discover_file(registry, &path)?;
    Ok(Some(path))
}

/// Apply the declaration file at `path` to `registry`.
///
/// # Errors
///
/// Returns [`DiscoverError::Io`] or [`DiscoverError::Parse`] when the file
/// cannot be loaded and [`DiscoverError::Registry`] when a `register` or
/// `unregister` entry conflicts. On error the registry is left unchanged.
pub fn discover_file(registry: &mut ConfigRegistry, path: &Path) -> Result<(), DiscoverError> {
    let content = std::fs::read_to_string(path).map_err(|source| DiscoverError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let declaration: Declaration =
        toml::from_str(&content).map_err(|source| DiscoverError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let snapshot = registry.snapshot();
    if let Err(e) = declaration.apply(registry) {
        registry.restore(snapshot);
        tracing::warn!(path = %path.display(), error = %e, "Rolled back configuration declarations");
        return Err(e);
    }

    tracing::debug!(path = %path.display(), names = registry.get_names().len(), "Applied configuration declarations");
    Ok(())
}

/// Seed `registry` from `settings`, then apply the root declaration file and
/// every app directory in order.
///
/// Returns the declaration files that were applied.
///
/// # Errors
///
/// Stops at the first failing file; see [`discover`] and [`discover_file`].
pub fn autodiscover(
    registry: &mut ConfigRegistry,
    settings: &DiscoverySettings,
) -> Result<Vec<PathBuf>, DiscoverError> {
    registry.update(settings.configurations.clone());

    let mut loaded = Vec::new();
    if let Some(root) = &settings.root_configs {
        discover_file(registry, root)?;
        loaded.push(root.clone());
    }
    for app in &settings.apps {
        if let Some(path) = discover(registry, app, &settings.filename)? {
            loaded.push(path);
        }
    }

    tracing::info!(
        files = loaded.len(),
        configurations = registry.get_names().len(),
        "Configurations discovered"
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use rstview_engine::Value;
    use tempfile::TempDir;

    use super::*;
    use crate::error::RegistryError;

    fn params(pairs: &[(&str, Value)]) -> Options {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    fn seeded() -> ConfigRegistry {
        let mut registry = ConfigRegistry::new();
        registry
            .register("default", params(&[("initial_header_level", Value::Int(3))]))
            .unwrap();
        registry
            .register("legacy", params(&[("language_code", Value::from("fr"))]))
            .unwrap();
        registry
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nope");
        let err = discover(&mut seeded(), &dir, "rstview_configs").unwrap_err();
        assert!(matches!(err, DiscoverError::MissingModule(path) if path == dir));
    }

    #[test]
    fn test_directory_without_declarations() {
        let temp = TempDir::new().unwrap();
        let mut registry = seeded();
        let loaded = discover(&mut registry, temp.path(), "rstview_configs").unwrap();
        assert_eq!(loaded, None);
        assert_eq!(registry, seeded());
    }

    #[test]
    fn test_applies_update_register_unregister() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("rstview_configs.toml"),
            r#"
unregister = ["legacy"]

[update.default]
initial_header_level = 2

[register.full_page]
initial_header_level = 1
footnote_references = "brackets"
"#,
        )
        .unwrap();

        let mut registry = seeded();
        let loaded = discover(&mut registry, temp.path(), "rstview_configs").unwrap();
        assert_eq!(loaded, Some(temp.path().join("rstview_configs.toml")));
        assert_eq!(registry.get_names(), vec!["default", "full_page"]);
        assert_eq!(
            registry.get_parameters("default").unwrap(),
            &params(&[("initial_header_level", Value::Int(2))])
        );
        assert_eq!(
            registry.get_parameters("full_page").unwrap(),
            &params(&[
                ("footnote_references", Value::from("brackets")),
                ("initial_header_level", Value::Int(1)),
            ])
        );
    }

    #[test]
    fn test_failure_rolls_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("configs.toml");
        fs::write(
            &path,
            r#"
unregister = ["missing"]

[update.default]
initial_header_level = 1

[register.extra]
language_code = "de"
"#,
        )
        .unwrap();

        let mut registry = seeded();
        let err = discover_file(&mut registry, &path).unwrap_err();
        assert!(matches!(
            err,
            DiscoverError::Registry(RegistryError::NotRegistered(ref name)) if name == "missing"
        ));
        assert_eq!(registry, seeded());
    }

    #[test]
    fn test_register_existing_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("configs.toml");
        fs::write(&path, "[register.default]\ninitial_header_level = 1\n").unwrap();

        let mut registry = seeded();
        let err = discover_file(&mut registry, &path).unwrap_err();
        assert!(matches!(
            err,
            DiscoverError::Registry(RegistryError::AlreadyRegistered(_))
        ));
        assert_eq!(registry, seeded());
    }

    #[test]
    fn test_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("configs.toml");
        fs::write(&path, "register = [1, 2]\n").unwrap();

        let err = discover_file(&mut seeded(), &path).unwrap_err();
        assert!(matches!(err, DiscoverError::Parse { .. }));
        assert!(err.to_string().contains("configs.toml"));
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = discover_file(&mut seeded(), &temp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, DiscoverError::Io { .. }));
    }

    #[test]
    fn test_autodiscover_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root.toml");
        fs::write(&root, "[register.blog]\ninitial_header_level = 2\n").unwrap();

        let blog = temp.path().join("blog");
        fs::create_dir(&blog).unwrap();
        fs::write(
            blog.join("rstview_configs.toml"),
            "[update.blog]\ninitial_header_level = 4\n",
        )
        .unwrap();
        let empty = temp.path().join("empty");
        fs::create_dir(&empty).unwrap();

        let settings = DiscoverySettings {
            configurations: [(
                "default".to_owned(),
                params(&[("initial_header_level", Value::Int(3))]),
            )]
            .into_iter()
            .collect(),
            root_configs: Some(root.clone()),
            apps: vec![blog.clone(), empty],
            ..DiscoverySettings::default()
        };

        let mut registry = ConfigRegistry::new();
        let loaded = autodiscover(&mut registry, &settings).unwrap();
        assert_eq!(loaded, vec![root, blog.join("rstview_configs.toml")]);
        assert_eq!(registry.get_names(), vec!["blog", "default"]);
        assert_eq!(
            registry.get_parameters("blog").unwrap(),
            &params(&[("initial_header_level", Value::Int(4))])
        );
    }

    #[test]
    fn test_settings_from_config() {
        let settings = DiscoverySettings::from_config(&Config::default());
        assert_eq!(settings.filename, "rstview_configs");
        assert_eq!(settings.root_configs, None);
        assert!(settings.apps.is_empty());
        assert_eq!(settings.configurations.keys().collect::<Vec<_>>(), vec!["default"]);
    }
}
