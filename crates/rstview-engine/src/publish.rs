//! Publisher: parse a source string and render it with a writer.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::directive::{
    AdmonitionDirective, CodeDirective, Directive, GenericAdmonitionDirective, IncludeDirective,
    RawDirective,
};
use crate::error::EngineError;
use crate::nodes::Document;
use crate::parser::DocumentParser;
use crate::parts::Parts;
use crate::reporter::Reporter;
use crate::role::{Role, StyleRole};
use crate::settings::Settings;
use crate::value::Options;
use crate::writer::{HtmlWriter, Translator};

/// File reader used by the `include` directive.
pub type ReadFileFn = dyn Fn(&Path) -> io::Result<String> + Send + Sync;

/// Source name used in diagnostics for in-memory input.
pub const STRING_SOURCE: &str = "<string>";

/// Entry point of the engine.
///
/// Holds the registered directives and roles. Cloning is cheap; handlers are
/// shared.
#[derive(Clone)]
pub struct Publisher {
    directives: HashMap<String, Arc<dyn Directive>>,
    roles: HashMap<String, Arc<dyn Role>>,
    read_file: Arc<ReadFileFn>,
    base_dir: PathBuf,
    source_name: String,
}

impl Publisher {
    /// Create a publisher with the built-in directives and roles.
    #[must_use]
    pub fn new() -> Self {
        let mut publisher = Self {
            directives: HashMap::new(),
            roles: HashMap::new(),
            read_file: Arc::new(|path: &Path| std::fs::read_to_string(path)),
            base_dir: PathBuf::from("."),
            source_name: STRING_SOURCE.to_owned(),
        };
        for directive in AdmonitionDirective::all() {
            publisher.register_directive(directive);
        }
        for directive in CodeDirective::all() {
            publisher.register_directive(directive);
        }
        publisher.register_directive(GenericAdmonitionDirective);
        publisher.register_directive(RawDirective);
        publisher.register_directive(IncludeDirective);
        for role in StyleRole::builtins() {
            publisher.register_role(role);
        }
        publisher
    }

    /// Register a directive, replacing any directive with the same name.
    #[must_use]
    pub fn with_directive<D: Directive + 'static>(mut self, directive: D) -> Self {
        self.register_directive(directive);
        self
    }

    /// Register an interpreted text role, replacing any role with the same name.
    #[must_use]
    pub fn with_role<R: Role + 'static>(mut self, role: R) -> Self {
        self.register_role(role);
        self
    }

    /// Replace the file reader used by `include`.
    #[must_use]
    pub fn with_read_file<F>(mut self, read_file: F) -> Self
    where
        F: Fn(&Path) -> io::Result<String> + Send + Sync + 'static,
    {
        self.read_file = Arc::new(read_file);
        self
    }

    /// Directory relative `include` paths are resolved against.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Source name shown in diagnostics.
    #[must_use]
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    fn register_directive<D: Directive + 'static>(&mut self, directive: D) {
        let name = directive.name().to_lowercase();
        self.directives.insert(name, Arc::new(directive));
    }

    fn register_role<R: Role + 'static>(&mut self, role: R) {
        let name = role.name().to_lowercase();
        self.roles.insert(name, Arc::new(role));
    }

    pub(crate) fn directive(&self, name: &str) -> Option<&Arc<dyn Directive>> {
        self.directives.get(name)
    }

    pub(crate) fn role(&self, name: &str) -> Option<&Arc<dyn Role>> {
        self.roles.get(name)
    }

    pub(crate) fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub(crate) fn read_file(&self, path: &Path) -> io::Result<String> {
        (self.read_file)(path)
    }

    /// Names of the registered directives, sorted.
    #[must_use]
    pub fn directive_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.directives.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Parse `source` into a document tree.
    ///
    /// # Errors
    ///
    /// Returns an error when an option is invalid, when a diagnostic reaches
    /// `halt_level`, or when an extension fails.
    pub fn publish_doctree(&self, source: &str, options: &Options) -> Result<Document, EngineError> {
        let settings = Settings::from_options(options)?;
        self.parse(source, &settings)
    }

    /// Parse `source` and render it with writer `W`.
    ///
    /// # Errors
    ///
    /// Same as [`Publisher::publish_doctree`].
    pub fn publish_parts<W: HtmlWriter>(
        &self,
        source: &str,
        options: &Options,
    ) -> Result<Parts, EngineError> {
        let settings = Settings::from_options(options)?;
        tracing::debug!(
            writer = W::NAME,
            bytes = source.len(),
            report_level = settings.report_level,
            "Publishing document"
        );
        let document = self.parse(source, &settings)?;
        Ok(Translator::<W>::new(&settings, &self.source_name).parts(&document))
    }

    fn parse(&self, source: &str, settings: &Settings) -> Result<Document, EngineError> {
        let reporter = Reporter::new(self.source_name.as_str(), settings);
        DocumentParser::new(self, settings, &reporter).parse_document(source)
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut roles: Vec<&str> = self.roles.keys().map(String::as_str).collect();
        roles.sort_unstable();
        f.debug_struct("Publisher")
            .field("directives", &self.directive_names())
            .field("roles", &roles)
            .field("base_dir", &self.base_dir)
            .field("source_name", &self.source_name)
            .finish_non_exhaustive()
    }
}
