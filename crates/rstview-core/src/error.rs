//! Error types for the rendering pipeline.

use std::path::PathBuf;

use rstview_engine::EngineError;

/// Registry lookup or mutation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No configuration with this name.
    #[error("Given name \"{0}\" is not registered as a configuration.")]
    NotRegistered(String),
    /// A configuration with this name already exists.
    #[error("Given name \"{0}\" is already registered as a configuration.")]
    AlreadyRegistered(String),
}

/// Failure of a render call.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The requested configuration does not exist.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The engine rejected the options or stopped parsing.
    #[error("Rendering failed: {0}")]
    Engine(#[from] EngineError),
}

impl RenderError {
    /// Whether this is an internal extension fault of the engine.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Engine(e) if e.is_internal())
    }
}

/// Failure while loading configuration declaration files.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    /// The directory to search does not exist.
    #[error("Discovery directory not found: {}", .0.display())]
    MissingModule(PathBuf),
    /// A declaration file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A declaration file is not valid TOML or has the wrong shape.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Applying a declaration file to the registry failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_messages() {
        assert_eq!(
            RegistryError::NotRegistered("foo".to_owned()).to_string(),
            "Given name \"foo\" is not registered as a configuration."
        );
        assert_eq!(
            RegistryError::AlreadyRegistered("foo".to_owned()).to_string(),
            "Given name \"foo\" is already registered as a configuration."
        );
    }

    #[test]
    fn test_render_error_is_internal() {
        assert!(RenderError::Engine(EngineError::Internal("boom".to_owned())).is_internal());
        assert!(!RenderError::Engine(EngineError::Exit { status: 1 }).is_internal());
        assert!(!RenderError::from(RegistryError::NotRegistered("x".to_owned())).is_internal());
    }
}
