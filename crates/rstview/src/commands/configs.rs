//! `rstview configs` command implementation.

use std::collections::BTreeMap;
use std::path::Path;

use clap::Args;
use rstview_config::CliSettings;
use rstview_core::{ConfigRegistry, read_global};

use super::load_registry;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the configs command.
#[derive(Args)]
pub(crate) struct ConfigsArgs {
    /// Also print the parameters of each configuration.
    #[arg(short, long)]
    show: bool,
}

impl ConfigsArgs {
    /// Execute the configs command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or discovery fails.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();

        let config = load_registry(config_path, &CliSettings::default())?;
        if let Some(path) = &config.config_path {
            output.info(&format!("Configuration file: {}", path.display()));
        }

        let registry = read_global();
        let text = if self.show {
            describe(&registry)?
        } else {
            registry.get_names().join("\n")
        };
        output.document(&text)?;
        Ok(())
    }
}

/// Every configuration as a TOML table.
fn describe(registry: &ConfigRegistry) -> Result<String, CliError> {
    let mut tables = BTreeMap::new();
    for name in registry.get_names() {
        let params = registry.get_parameters(&name)?.clone();
        tables.insert(name, params);
    }
    toml::to_string(&tables).map_err(|e| CliError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstview_engine::{Options, Value};

    use super::*;

    #[test]
    fn test_describe() {
        let mut registry = ConfigRegistry::new();
        let params: Options = [
            ("initial_header_level".to_owned(), Value::Int(2)),
            ("language_code".to_owned(), Value::from("fr")),
        ]
        .into_iter()
        .collect();
        registry.register("blog", params).unwrap();
        registry.register("default", Options::new()).unwrap();

        let text = describe(&registry).unwrap();
        let parsed: toml::Table = toml::from_str(&text).unwrap();
        assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["blog", "default"]);
        assert_eq!(parsed["blog"]["initial_header_level"].as_integer(), Some(2));
        assert_eq!(parsed["blog"]["language_code"].as_str(), Some("fr"));
    }
}
