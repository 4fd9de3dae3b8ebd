//! Named parser configurations.
//!
//! A configuration is a parameter set for the engine, stored under a unique
//! name. Entries are template data: consumers clone a parameter set before
//! changing it.

use std::collections::BTreeMap;
use std::sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rstview_engine::Options;

use crate::error::RegistryError;

static GLOBAL: LazyLock<RwLock<ConfigRegistry>> =
    LazyLock::new(|| RwLock::new(ConfigRegistry::new()));

/// Process-wide registry used by discovery and the CLI.
pub fn global_registry() -> &'static RwLock<ConfigRegistry> {
    &GLOBAL
}

/// Read access to the global registry.
pub fn read_global() -> RwLockReadGuard<'static, ConfigRegistry> {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner)
}

/// Write access to the global registry.
pub fn write_global() -> RwLockWriteGuard<'static, ConfigRegistry> {
    GLOBAL.write().unwrap_or_else(PoisonError::into_inner)
}

/// Registry of named configurations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigRegistry {
    entries: BTreeMap<String, Options>,
}

impl ConfigRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with `initial`.
    #[must_use]
    pub fn with_initial(initial: BTreeMap<String, Options>) -> Self {
        Self { entries: initial }
    }

    /// Add a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] when the name is taken.
    pub fn register(&mut self, name: impl Into<String>, params: Options) -> Result<(), RegistryError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        tracing::debug!(name = %name, parameters = params.len(), "Registered configuration");
        self.entries.insert(name, params);
        Ok(())
    }

    /// Remove a configuration, returning its parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotRegistered`] when the name is unknown.
    pub fn unregister(&mut self, name: &str) -> Result<Options, RegistryError> {
        let params = self
            .entries
            .remove(name)
            .ok_or_else(|| RegistryError::NotRegistered(name.to_owned()))?;
        tracing::debug!(name = %name, "Unregistered configuration");
        Ok(params)
    }

    /// Insert or overwrite every configuration of `mapping`.
    pub fn update(&mut self, mapping: impl IntoIterator<Item = (String, Options)>) {
        for (name, params) in mapping {
            self.entries.insert(name, params);
        }
    }

    /// Remove all configurations.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Parameters of a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotRegistered`] when the name is unknown.
    pub fn get_parameters(&self, name: &str) -> Result<&Options, RegistryError> {
        self.entries
            .get(name)
            .ok_or_else(|| RegistryError::NotRegistered(name.to_owned()))
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn get_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub(crate) fn snapshot(&self) -> BTreeMap<String, Options> {
        self.entries.clone()
    }

    pub(crate) fn restore(&mut self, snapshot: BTreeMap<String, Options>) {
        self.entries = snapshot;
    }
}
