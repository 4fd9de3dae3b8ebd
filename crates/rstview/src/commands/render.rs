//! `rstview render` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use rstview_config::{CliSettings, WriterKind};
use rstview_core::{DEFAULT_CONFIG, RenderRequest, Rendered, Renderer, read_global};

use super::{Source, load_registry};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Source file, or `-` for stdin.
    file: PathBuf,

    /// Configuration name.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    name: String,

    /// Output the whole document instead of the body fragment.
    #[arg(long)]
    full: bool,

    /// Output JSON (all parts with --full, otherwise the body).
    #[arg(long)]
    json: bool,

    /// Keep diagnostics out of the output and off stderr.
    #[arg(long)]
    silent: bool,

    /// Show diagnostics even if the configuration file enables silent mode.
    #[arg(long, conflicts_with = "silent")]
    no_silent: bool,

    /// Initial header level override (1-6, 0 keeps the configured level).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=6))]
    header_level: Option<u8>,

    /// HTML writer (overrides config).
    #[arg(short, long)]
    writer: Option<WriterKind>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, reading the source or
    /// rendering fails.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            writer: self.writer,
            silent: self.resolve_silent(),
        };
        let config = load_registry(config_path, &cli_settings)?;
        let source = Source::read(&self.file)?;

        let renderer = Renderer::from_config(&config.parser).with_publisher(source.publisher());
        let request = RenderRequest {
            config: self.name.clone(),
            body_only: !self.full,
            silent: None,
            initial_header_level: self.header_level,
        };
        tracing::info!(
            file = %self.file.display(),
            configuration = %self.name,
            writer = renderer.writer().as_str(),
            "Rendering file"
        );
        let rendered = renderer.render(&read_global(), &source.text, &request)?;

        let text = if self.json {
            to_json(&rendered)?
        } else {
            match &rendered {
                Rendered::Body(body) => body.clone(),
                Rendered::Parts(parts) => parts.whole.clone(),
            }
        };
        output.document(&text)?;
        Ok(())
    }

    /// Resolve silent mode from --silent/--no-silent flags.
    fn resolve_silent(&self) -> Option<bool> {
        self.no_silent
            .then_some(false)
            .or(self.silent.then_some(true))
    }
}

fn to_json(rendered: &Rendered) -> Result<String, CliError> {
    let value = match rendered {
        Rendered::Body(body) => serde_json::json!({ "body": body }),
        Rendered::Parts(parts) => {
            serde_json::to_value(parts).map_err(|e| CliError::Serialize(e.to_string()))?
        }
    };
    serde_json::to_string_pretty(&value).map_err(|e| CliError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstview_engine::Parts;

    use super::*;

    #[test]
    fn test_body_json() {
        let json = to_json(&Rendered::Body("<p>x</p>\n".to_owned())).unwrap();
        assert_eq!(json, "{\n  \"body\": \"<p>x</p>\\n\"\n}");
    }

    #[test]
    fn test_parts_json() {
        let parts = Parts {
            title: "Title".to_owned(),
            fragment: "<p>x</p>\n".to_owned(),
            ..Parts::default()
        };
        let json: serde_json::Value =
            serde_json::from_str(&to_json(&Rendered::Parts(parts)).unwrap()).unwrap();
        assert_eq!(json["title"], "Title");
        assert_eq!(json["fragment"], "<p>x</p>\n");
    }
}
