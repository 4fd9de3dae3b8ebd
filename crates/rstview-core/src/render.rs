//! Render pipeline: resolve options, select the writer, publish.

use rstview_config::{ParserConfig, WriterKind};
use rstview_engine::directive::Directive;
use rstview_engine::role::Role;
use rstview_engine::{Html4Writer, Options, Parts, Publisher};

use crate::error::RenderError;
use crate::html5::SemanticHtml5Writer;
use crate::options::{RenderOverrides, resolve_options};
use crate::registry::{self, ConfigRegistry};

/// Name of the configuration used when a request names none.
pub const DEFAULT_CONFIG: &str = "default";

/// Arguments of one render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Configuration name.
    pub config: String,
    /// Return only the body fragment instead of all parts.
    pub body_only: bool,
    /// Silent mode; `None` uses the renderer's default.
    pub silent: Option<bool>,
    /// Header level override; `0` means no override.
    pub initial_header_level: Option<u8>,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            config: DEFAULT_CONFIG.to_owned(),
            body_only: true,
            silent: None,
            initial_header_level: None,
        }
    }
}

impl RenderRequest {
    /// Request for configuration `name` with the other defaults.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            config: name.into(),
            ..Self::default()
        }
    }
}

/// Render output: the body fragment or every part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Body(String),
    Parts(Parts),
}

impl Rendered {
    /// The body fragment, whichever shape was produced.
    #[must_use]
    pub fn fragment(&self) -> &str {
        match self {
            Self::Body(body) => body,
            Self::Parts(parts) => &parts.fragment,
        }
    }
}

/// Renders sources with a registered configuration.
///
/// # Example
///
/// ```
/// use rstview_core::{ConfigRegistry, RenderRequest, Renderer, Rendered};
/// use rstview_engine::Options;
///
/// let mut registry = ConfigRegistry::new();
/// registry.register("default", Options::new()).unwrap();
///
/// let rendered = Renderer::new()
///     .render(&registry, "Lorem **ipsum** salace", &RenderRequest::default())
///     .unwrap();
/// assert_eq!(
///     rendered,
///     Rendered::Body("<p>Lorem <strong>ipsum</strong> salace</p>\n".to_owned())
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Renderer {
    writer: WriterKind,
    silent: bool,
    publisher: Publisher,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Renderer with the html4css1 writer and silent mode off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            writer: WriterKind::Html4,
            silent: false,
            publisher: Publisher::new(),
        }
    }

    /// Renderer using the writer and silent default of `config`.
    #[must_use]
    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new()
            .with_writer(config.writer)
            .with_silent(config.silent)
    }

    #[must_use]
    pub fn with_writer(mut self, writer: WriterKind) -> Self {
        self.writer = writer;
        self
    }

    /// Silent default for requests that leave `silent` unset.
    #[must_use]
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Register an extra directive.
    #[must_use]
    pub fn with_directive<D: Directive + 'static>(mut self, directive: D) -> Self {
        self.publisher = self.publisher.with_directive(directive);
        self
    }

    /// Register an extra interpreted text role.
    #[must_use]
    pub fn with_role<R: Role + 'static>(mut self, role: R) -> Self {
        self.publisher = self.publisher.with_role(role);
        self
    }

    /// Replace the engine publisher, e.g. to set the include base directory.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Publisher) -> Self {
        self.publisher = publisher;
        self
    }

    #[must_use]
    pub fn writer(&self) -> WriterKind {
        self.writer
    }

    #[must_use]
    pub fn silent(&self) -> bool {
        self.silent
    }

    /// Options the engine receives for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Registry`] when the configuration is unknown.
    pub fn options(
        &self,
        registry: &ConfigRegistry,
        request: &RenderRequest,
    ) -> Result<Options, RenderError> {
        let overrides = RenderOverrides {
            silent: request.silent.unwrap_or(self.silent),
            initial_header_level: request.initial_header_level,
        };
        Ok(resolve_options(registry, &request.config, &overrides)?)
    }

    /// Render `source` with the configuration named in `request`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Registry`] when the configuration is unknown and
    /// [`RenderError::Engine`] when the engine fails.
    pub fn render(
        &self,
        registry: &ConfigRegistry,
        source: &str,
        request: &RenderRequest,
    ) -> Result<Rendered, RenderError> {
        let options = self.options(registry, request)?;
        tracing::debug!(
            configuration = %request.config,
            writer = self.writer.as_str(),
            body_only = request.body_only,
            "Rendering"
        );
        let parts = match self.writer {
            WriterKind::Html4 => self.publisher.publish_parts::<Html4Writer>(source, &options)?,
            WriterKind::Html5 => self
                .publisher
                .publish_parts::<SemanticHtml5Writer>(source, &options)?,
        };
        if request.body_only {
            Ok(Rendered::Body(parts.fragment))
        } else {
            Ok(Rendered::Parts(parts))
        }
    }

    /// Render with the process-wide registry.
    ///
    /// # Errors
    ///
    /// Same as [`Renderer::render`].
    pub fn render_global(&self, source: &str, request: &RenderRequest) -> Result<Rendered, RenderError> {
        self.render(&registry::read_global(), source, request)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use rstview_engine::{Value, hooks};
    use serial_test::serial;

    use super::*;
    use crate::error::RegistryError;

    const VALID: &str = "Lorem **ipsum** salace";
    const INVALID: &str = "Lorem **ipsum salace";

    fn registry() -> ConfigRegistry {
        let mut registry = ConfigRegistry::new();
        registry.register("default", Options::new()).unwrap();
        registry
            .register(
                "deep",
                [
                    ("initial_header_level".to_owned(), Value::Int(3)),
                    ("doctitle_xform".to_owned(), Value::Bool(false)),
                ]
                .into_iter()
                .collect(),
            )
            .unwrap();
        registry
    }

    fn capture_stream<R>(f: impl FnOnce() -> R) -> (R, String) {
        let captured = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&captured);
        let previous = hooks::replace_stream_write_hook(Some(Arc::new(move |text: &str| {
            sink.lock().unwrap().push_str(text);
        })));
        let result = f();
        hooks::replace_stream_write_hook(previous);
        let text = captured.lock().unwrap().clone();
        (result, text)
    }

    #[test]
    fn test_render_valid_body() {
        let rendered = Renderer::new()
            .render(&registry(), VALID, &RenderRequest::default())
            .unwrap();
        assert_eq!(
            rendered,
            Rendered::Body("<p>Lorem <strong>ipsum</strong> salace</p>\n".to_owned())
        );
    }

    #[test]
    fn test_render_full_parts() {
        let request = RenderRequest {
            body_only: false,
            ..RenderRequest::default()
        };
        let Rendered::Parts(parts) = Renderer::new().render(&registry(), VALID, &request).unwrap()
        else {
            panic!("expected parts");
        };
        assert_eq!(parts.fragment, "<p>Lorem <strong>ipsum</strong> salace</p>\n");
        assert_eq!(parts.encoding, "utf-8");
        assert!(parts.whole.contains(&parts.html_body));
    }

    #[test]
    fn test_unknown_configuration() {
        let err = Renderer::new()
            .render(&registry(), VALID, &RenderRequest::named("nope"))
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Registry(RegistryError::NotRegistered(ref name)) if name == "nope"
        ));
    }

    #[test]
    #[serial]
    fn test_silent_render_embeds_only_problematic() {
        let request = RenderRequest {
            silent: Some(true),
            ..RenderRequest::default()
        };
        let (rendered, stream) =
            capture_stream(|| Renderer::new().render(&registry(), INVALID, &request).unwrap());
        assert_eq!(
            rendered.fragment(),
            "<p>Lorem <a href=\"#id1\"><span class=\"problematic\" id=\"id2\">**</span></a>ipsum salace</p>\n"
        );
        assert_eq!(stream, "");
    }

    #[test]
    #[serial]
    fn test_loud_render_embeds_message_and_writes_stream() {
        let (rendered, stream) = capture_stream(|| {
            Renderer::new()
                .render(&registry(), INVALID, &RenderRequest::default())
                .unwrap()
        });
        assert!(rendered.fragment().contains("<div class=\"system-message\" id=\"id1\">"));
        assert_eq!(
            stream,
            "<string>:1: (WARNING/2) Inline strong start-string without end-string.\n"
        );
    }

    #[test]
    #[serial]
    fn test_silent_default_from_renderer() {
        let (rendered, stream) = capture_stream(|| {
            Renderer::new()
                .with_silent(true)
                .render(&registry(), INVALID, &RenderRequest::default())
                .unwrap()
        });
        assert!(!rendered.fragment().contains("system-message"));
        assert_eq!(stream, "");
    }

    #[test]
    fn test_header_level_from_configuration_and_override() {
        let source = "Title\n=====\n\nText.\n";
        let renderer = Renderer::new();
        let deep = renderer
            .render(&registry(), source, &RenderRequest::named("deep"))
            .unwrap();
        assert!(deep.fragment().contains("<h3>Title</h3>"));

        let request = RenderRequest {
            initial_header_level: Some(2),
            ..RenderRequest::named("deep")
        };
        let overridden = renderer.render(&registry(), source, &request).unwrap();
        assert!(overridden.fragment().contains("<h2>Title</h2>"));
    }

    #[test]
    fn test_html5_writer() {
        let renderer = Renderer::new().with_writer(WriterKind::Html5);
        let rendered = renderer
            .render(&registry(), "Use ``ls``.", &RenderRequest::default())
            .unwrap();
        assert_eq!(rendered.fragment(), "<p>Use <code>ls</code>.</p>\n");
    }

    #[test]
    fn test_from_config() {
        let config = ParserConfig {
            writer: WriterKind::Html5,
            silent: true,
            ..ParserConfig::default()
        };
        let renderer = Renderer::from_config(&config);
        assert_eq!(renderer.writer(), WriterKind::Html5);
        assert!(renderer.silent());
    }

    #[test]
    #[serial]
    fn test_bare_configuration_refuses_include_and_raw() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("secret.txt"), "top secret\n").unwrap();
        let renderer =
            Renderer::new().with_publisher(Publisher::new().with_base_dir(temp.path()));
        let request = RenderRequest {
            silent: Some(true),
            ..RenderRequest::default()
        };

        let included = renderer
            .render(&registry(), ".. include:: secret.txt\n", &request)
            .unwrap();
        assert!(!included.fragment().contains("top secret"));

        let raw = renderer
            .render(&registry(), ".. raw:: html\n\n   <script>x</script>\n", &request)
            .unwrap();
        assert!(!raw.fragment().contains("<script>"));

        let (rendered, stream) = capture_stream(|| {
            renderer
                .render(
                    &registry(),
                    ".. raw:: html\n\n   <script>x</script>\n",
                    &RenderRequest::default(),
                )
                .unwrap()
        });
        assert!(rendered.fragment().contains("&quot;raw&quot; directive disabled."));
        assert_eq!(stream, "<string>:1: (WARNING/2) \"raw\" directive disabled.\n");
    }

    #[test]
    fn test_options_carry_security_policy() {
        let options = Renderer::new()
            .options(&registry(), &RenderRequest::default())
            .unwrap();
        assert_eq!(options["halt_level"], Value::Int(6));
        assert_eq!(options["enable_exit"], Value::Int(0));
    }
}
