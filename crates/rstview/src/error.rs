//! CLI error types.

use rstview_config::ConfigError;
use rstview_core::{DiscoverError, RegistryError, RenderError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Discover(#[from] DiscoverError),

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Serialize(String),

    #[error("{count} problem(s) found")]
    Invalid { count: usize },
}

impl CliError {
    /// Process exit status for this error.
    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            Self::Invalid { .. } => 1,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Invalid { count: 3 }.exit_code(), 1);
        assert_eq!(CliError::Serialize("bad".to_owned()).exit_code(), 2);
        assert_eq!(
            CliError::Invalid { count: 3 }.to_string(),
            "3 problem(s) found"
        );
    }
}
