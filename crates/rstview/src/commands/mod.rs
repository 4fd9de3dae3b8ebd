//! CLI command implementations.

pub(crate) mod configs;
pub(crate) mod render;
pub(crate) mod validate;

use std::io::Read;
use std::path::{Path, PathBuf};

use rstview_config::{CliSettings, Config};
use rstview_core::{DiscoverySettings, autodiscover, write_global};
use rstview_engine::{Publisher, STRING_SOURCE};

pub(crate) use configs::ConfigsArgs;
pub(crate) use render::RenderArgs;
pub(crate) use validate::ValidateArgs;

use crate::error::CliError;

/// Load the application configuration and fill the global registry.
pub(crate) fn load_registry(
    config_path: Option<&Path>,
    cli_settings: &CliSettings,
) -> Result<Config, CliError> {
    let config = Config::load(config_path, Some(cli_settings))?;
    let settings = DiscoverySettings::from_config(&config);
    autodiscover(&mut write_global(), &settings)?;
    Ok(config)
}

/// A source document read from a file or stdin.
pub(crate) struct Source {
    pub(crate) text: String,
    name: String,
    base_dir: PathBuf,
}

impl Source {
    /// Read `path`, or stdin when it is `-`.
    pub(crate) fn read(path: &Path) -> Result<Self, CliError> {
        if path == Path::new("-") {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            return Ok(Self {
                text,
                name: STRING_SOURCE.to_owned(),
                base_dir: PathBuf::from("."),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let base_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(Self {
            text,
            name: path.display().to_string(),
            base_dir,
        })
    }

    /// Engine publisher resolving includes next to the source.
    pub(crate) fn publisher(&self) -> Publisher {
        Publisher::new()
            .with_source_name(self.name.clone())
            .with_base_dir(self.base_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_read_file_source() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("page.rst");
        std::fs::write(&path, "Lorem **ipsum** salace\n").unwrap();

        let source = Source::read(&path).unwrap();
        assert_eq!(source.text, "Lorem **ipsum** salace\n");
        assert_eq!(source.name, path.display().to_string());
        assert_eq!(source.base_dir, temp.path());
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = Source::read(&temp.path().join("absent.rst")).err().unwrap();
        assert!(matches!(err, CliError::Io(_)));
    }
}
