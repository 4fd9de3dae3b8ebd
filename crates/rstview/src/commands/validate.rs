//! `rstview validate` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use rstview_config::CliSettings;
use rstview_core::{DEFAULT_CONFIG, Renderer, Validator, read_global};

use super::{Source, load_registry};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the validate command.
#[derive(Args)]
pub(crate) struct ValidateArgs {
    /// Source file, or `-` for stdin.
    file: PathBuf,

    /// Configuration name.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    name: String,

    /// Message template (overrides config), e.g. "Line {lineno} : {message}".
    #[arg(short, long)]
    template: Option<String>,
}

impl ValidateArgs {
    /// Execute the validate command.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Invalid`] when the source has diagnostics, and an
    /// error if configuration loading, reading the source or parsing fails.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();

        let config = load_registry(config_path, &CliSettings::default())?;
        let source = Source::read(&self.file)?;

        let renderer = Renderer::from_config(&config.parser).with_publisher(source.publisher());
        let mut validator = Validator::from_config(&config.parser).with_renderer(renderer);
        if let Some(template) = self.template {
            validator = validator.with_template(template);
        }

        let (valid, messages) = validator.validate(&read_global(), &source.text, &self.name)?;
        if valid {
            output.success(&format!("{}: valid", self.file.display()));
            return Ok(());
        }

        output.highlight(&format!("{}:", self.file.display()));
        for line in validator.formatted_messages() {
            output.warning(&format!("  {line}"));
        }
        Err(CliError::Invalid {
            count: messages.len(),
        })
    }
}
