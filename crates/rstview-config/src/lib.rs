//! Configuration management for rstview.
//!
//! Parses `rstview.toml` files with serde and provides auto-discovery of the
//! config file in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values support `${VAR}` and `${VAR:-default}`. Expanded fields:
//! - string parameters of every `[configurations.<name>]` table
//! - `discovery.root_configs`
//! - `discovery.apps`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rstview_engine::{Options, Value};
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rstview.toml";

/// Name of the configuration seeded from the parser flags.
pub const DEFAULT_CONFIGURATION: &str = "default";

/// Default template for formatted validation messages.
pub const DEFAULT_ERROR_TEMPLATE: &str = "Line {lineno} : {message}";

/// Default CSS class of highlighted code blocks.
pub const DEFAULT_HIGHLIGHT_CLASS: &str = "highlight";

/// Default name of per-directory configuration declaration files.
pub const DEFAULT_DISCOVERY_FILENAME: &str = "rstview_configs";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the HTML writer.
    pub writer: Option<WriterKind>,
    /// Override the silent default.
    pub silent: Option<bool>,
}

/// HTML writer used for rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriterKind {
    /// html4css1-compatible output.
    Html4,
    /// Semantic HTML5 output.
    #[default]
    Html5,
}

impl WriterKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html4 => "html4",
            Self::Html5 => "html5",
        }
    }
}

impl std::str::FromStr for WriterKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html4" => Ok(Self::Html4),
            "html5" => Ok(Self::Html5),
            other => Err(ConfigError::Validation(format!(
                "parser.writer must be \"html4\" or \"html5\", got \"{other}\""
            ))),
        }
    }
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Discovery configuration (paths are relative strings from TOML).
    discovery: DiscoveryConfigRaw,
    /// Named configurations declared in the file.
    configurations: BTreeMap<String, Options>,

    /// Resolved discovery configuration (set after loading).
    #[serde(skip)]
    pub discovery_resolved: DiscoveryConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Parser configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// HTML writer.
    pub writer: WriterKind,
    /// Whether renders are silent unless a call says otherwise.
    pub silent: bool,
    /// Template for formatted validation messages.
    pub error_template: String,
    /// Whether the validator swallows internal extension errors.
    pub tolerate_internal_errors: bool,
    /// Language of the generated labels.
    pub language_code: String,
    /// Allow the `include` directive in the default configuration.
    pub enable_file_insertion: bool,
    /// Allow the `raw` directive in the default configuration.
    pub enable_raw_insertion: bool,
    /// CSS class of the element wrapping highlighted code blocks.
    pub highlight_class: String,
    /// Write highlighted code with inline `style` attributes instead of
    /// token classes.
    pub highlight_inline_styles: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            writer: WriterKind::default(),
            silent: false,
            error_template: DEFAULT_ERROR_TEMPLATE.to_owned(),
            tolerate_internal_errors: true,
            language_code: "en".to_owned(),
            enable_file_insertion: false,
            enable_raw_insertion: false,
            highlight_class: DEFAULT_HIGHLIGHT_CLASS.to_owned(),
            highlight_inline_styles: false,
        }
    }
}

impl ParserConfig {
    /// Parameters of the built-in `default` configuration.
    #[must_use]
    pub fn default_parameters(&self) -> Options {
        [
            ("initial_header_level", Value::Int(3)),
            ("file_insertion_enabled", Value::Bool(self.enable_file_insertion)),
            ("raw_enabled", Value::Bool(self.enable_raw_insertion)),
            ("language_code", Value::from(self.language_code.as_str())),
            ("footnote_references", Value::from("superscript")),
            ("doctitle_xform", Value::Bool(false)),
            ("highlight_class", Value::from(self.highlight_class.as_str())),
            ("highlight_inline_styles", Value::Bool(self.highlight_inline_styles)),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
    }
}

/// Raw discovery configuration as parsed from TOML (paths as strings).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DiscoveryConfigRaw {
    root_configs: Option<String>,
    apps: Option<Vec<String>>,
    filename: Option<String>,
}

/// Resolved discovery configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Project-level declaration file.
    pub root_configs: Option<PathBuf>,
    /// Directories searched for `{filename}.toml`, in order.
    pub apps: Vec<PathBuf>,
    /// Declaration file name, without extension.
    pub filename: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            root_configs: None,
            apps: Vec::new(),
            filename: DEFAULT_DISCOVERY_FILENAME.to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`discovery.root_configs`").
        field: String,
        /// Error message (e.g., "${`APPS_ROOT`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `rstview.toml` in current directory and parents,
    /// falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if parsing,
    /// expansion or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            tracing::debug!("No {CONFIG_FILENAME} found, using defaults");
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(writer) = settings.writer {
            self.parser.writer = writer;
        }
        if let Some(silent) = settings.silent {
            self.parser.silent = silent;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            configurations = config.configurations.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.parser.error_template.contains("{message}") {
            return Err(ConfigError::Validation(
                "parser.error_template must contain {message}".to_owned(),
            ));
        }
        if self.parser.highlight_class.is_empty()
            || self.parser.highlight_class.contains(char::is_whitespace)
        {
            return Err(ConfigError::Validation(format!(
                "parser.highlight_class must be a single class name: {:?}",
                self.parser.highlight_class
            )));
        }
        if self.discovery_resolved.filename.is_empty() {
            return Err(ConfigError::Validation(
                "discovery.filename cannot be empty".to_owned(),
            ));
        }
        if let Some(name) = self.configurations.keys().find(|name| name.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "configuration name cannot be empty: {name:?}"
            )));
        }
        Ok(())
    }

    /// Named configurations to seed the registry with.
    ///
    /// The built-in `default` entry comes from the parser flags; a
    /// `[configurations.default]` table is merged over it. Other tables are
    /// taken as written.
    #[must_use]
    pub fn configurations(&self) -> BTreeMap<String, Options> {
        let mut all = BTreeMap::new();
        all.insert(
            DEFAULT_CONFIGURATION.to_owned(),
            self.parser.default_parameters(),
        );
        for (name, params) in &self.configurations {
            let entry = all.entry(name.clone()).or_insert_with(Options::new);
            entry.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        all
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        for (name, params) in &mut self.configurations {
            expand::expand_options(params, &format!("configurations.{name}"))?;
        }

        if let Some(ref root) = self.discovery.root_configs {
            self.discovery.root_configs =
                Some(expand::expand_env(root, "discovery.root_configs")?);
        }

        if let Some(apps) = self.discovery.apps.as_mut() {
            for app in apps {
                *app = expand::expand_env(app, "discovery.apps")?;
            }
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.discovery_resolved = DiscoveryConfig {
            root_configs: self
                .discovery
                .root_configs
                .as_deref()
                .map(|p| config_dir.join(p)),
            apps: self
                .discovery
                .apps
                .iter()
                .flatten()
                .map(|app| config_dir.join(app))
                .collect(),
            filename: self
                .discovery
                .filename
                .clone()
                .unwrap_or_else(|| DEFAULT_DISCOVERY_FILENAME.to_owned()),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.parser.writer, WriterKind::Html5);
        assert!(!config.parser.silent);
        assert_eq!(config.parser.error_template, "Line {lineno} : {message}");
        assert!(config.parser.tolerate_internal_errors);
        assert_eq!(config.discovery_resolved.filename, "rstview_configs");
        assert!(config.discovery_resolved.apps.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_default_configuration_parameters() {
        let configurations = Config::default().configurations();
        assert_eq!(configurations.keys().collect::<Vec<_>>(), vec!["default"]);
        let default = &configurations["default"];
        assert_eq!(default["initial_header_level"], Value::Int(3));
        assert_eq!(default["file_insertion_enabled"], Value::Bool(false));
        assert_eq!(default["raw_enabled"], Value::Bool(false));
        assert_eq!(default["language_code"], Value::from("en"));
        assert_eq!(default["footnote_references"], Value::from("superscript"));
        assert_eq!(default["doctitle_xform"], Value::Bool(false));
        assert_eq!(default["highlight_class"], Value::from("highlight"));
        assert_eq!(default["highlight_inline_styles"], Value::Bool(false));
    }

    #[test]
    fn test_parse_parser_config() {
        let toml = r#"
[parser]
writer = "html4"
silent = true
language_code = "fr"
enable_raw_insertion = true
highlight_class = "pygments"
highlight_inline_styles = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.parser.writer, WriterKind::Html4);
        assert!(config.parser.silent);
        let default = &config.configurations()["default"];
        assert_eq!(default["language_code"], Value::from("fr"));
        assert_eq!(default["raw_enabled"], Value::Bool(true));
        assert_eq!(default["highlight_class"], Value::from("pygments"));
        assert_eq!(default["highlight_inline_styles"], Value::Bool(true));
    }

    #[test]
    fn test_unknown_writer_rejected() {
        let result: Result<Config, _> = toml::from_str("[parser]\nwriter = \"latex\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_configurations_merge_over_default() {
        let toml = r#"
[configurations.default]
initial_header_level = 2

[configurations.full_page]
initial_header_level = 1
doctitle_xform = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let configurations = config.configurations();
        assert_eq!(
            configurations.keys().collect::<Vec<_>>(),
            vec!["default", "full_page"]
        );
        assert_eq!(configurations["default"]["initial_header_level"], Value::Int(2));
        assert_eq!(
            configurations["default"]["footnote_references"],
            Value::from("superscript")
        );
        assert_eq!(configurations["full_page"].len(), 2);
        assert_eq!(configurations["full_page"]["doctitle_xform"], Value::Bool(true));
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[discovery]
root_configs = "rstview_configs.toml"
apps = ["apps/blog", "apps/wiki"]
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(
            config.discovery_resolved,
            DiscoveryConfig {
                root_configs: Some(PathBuf::from("/project/rstview_configs.toml")),
                apps: vec![
                    PathBuf::from("/project/apps/blog"),
                    PathBuf::from("/project/apps/wiki"),
                ],
                filename: "rstview_configs".to_owned(),
            }
        );
    }

    #[test]
    fn test_validate_error_template() {
        let mut config = Config::default();
        config.parser.error_template = "Line {lineno}".to_owned();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("error_template"));
    }

    #[test]
    fn test_validate_highlight_class() {
        let mut config = Config::default();
        config.parser.highlight_class = "code box".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("parser.highlight_class"));

        config.parser.highlight_class = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_filename() {
        let mut config: Config = toml::from_str("[discovery]\nfilename = \"\"\n").unwrap();
        config.resolve_paths(Path::new("/project"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("discovery.filename"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rstview.toml");
        std::fs::write(
            &path,
            "[parser]\nwriter = \"html4\"\n\n[discovery]\napps = [\"blog\"]\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.parser.writer, WriterKind::Html4);
        assert_eq!(config.config_path, Some(path.clone()));
        assert_eq!(config.discovery_resolved.apps, vec![dir.path().join("blog")]);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/rstview.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_expands_env_vars() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("RSTVIEW_TEST_CONFIG_LANG", "fr");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rstview.toml");
        std::fs::write(
            &path,
            "[configurations.french]\nlanguage_code = \"${RSTVIEW_TEST_CONFIG_LANG}\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(
            config.configurations()["french"]["language_code"],
            Value::from("fr")
        );
        unsafe {
            std::env::remove_var("RSTVIEW_TEST_CONFIG_LANG");
        }
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            writer: Some(WriterKind::Html4),
            ..Default::default()
        });
        assert_eq!(config.parser.writer, WriterKind::Html4);
        assert!(!config.parser.silent);

        config.apply_cli_settings(&CliSettings {
            silent: Some(true),
            ..Default::default()
        });
        assert_eq!(config.parser.writer, WriterKind::Html4);
        assert!(config.parser.silent);
    }

    #[test]
    fn test_writer_from_str() {
        assert_eq!("html4".parse::<WriterKind>().unwrap(), WriterKind::Html4);
        assert!("xhtml".parse::<WriterKind>().is_err());
        assert_eq!(WriterKind::Html5.as_str(), "html5");
    }
}
