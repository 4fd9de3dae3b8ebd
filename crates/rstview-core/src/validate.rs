//! Source validation: render with diagnostics captured instead of shown.

use rstview_config::{DEFAULT_ERROR_TEMPLATE, ParserConfig};
use rstview_engine::Level;

use crate::error::RenderError;
use crate::intercept::{Diagnostic, intercept};
use crate::registry::ConfigRegistry;
use crate::render::{RenderRequest, Rendered, Renderer};

/// Validates sources and keeps the diagnostics of the last call.
///
/// A validator is meant for sequential reuse: every call replaces the stored
/// messages.
#[derive(Debug, Clone)]
pub struct Validator {
    renderer: Renderer,
    template: String,
    tolerate_internal_errors: bool,
    messages: Vec<Diagnostic>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            renderer: Renderer::new(),
            template: DEFAULT_ERROR_TEMPLATE.to_owned(),
            tolerate_internal_errors: true,
            messages: Vec::new(),
        }
    }

    /// Validator using the template and error tolerance of `config`.
    #[must_use]
    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new()
            .with_renderer(Renderer::from_config(config))
            .with_template(config.error_template.clone())
            .with_tolerate_internal_errors(config.tolerate_internal_errors)
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    #[must_use]
    pub fn with_tolerate_internal_errors(mut self, tolerate: bool) -> Self {
        self.tolerate_internal_errors = tolerate;
        self
    }

    /// Check `source` against configuration `config`.
    ///
    /// Returns whether the source is valid along with its diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Registry`] for an unknown configuration and
    /// [`RenderError::Engine`] when parsing fails, except for tolerated
    /// internal extension errors.
    pub fn validate(
        &mut self,
        registry: &ConfigRegistry,
        source: &str,
        config: &str,
    ) -> Result<(bool, Vec<Diagnostic>), RenderError> {
        let request = RenderRequest {
            silent: Some(true),
            ..RenderRequest::named(config)
        };
        self.parse(registry, source, &request)?;
        Ok((self.is_valid(), self.messages.clone()))
    }

    /// Render `source` while capturing its diagnostics.
    ///
    /// Returns `None` when a tolerated internal error aborted the render.
    ///
    /// # Errors
    ///
    /// Same as [`Validator::validate`].
    pub fn parse(
        &mut self,
        registry: &ConfigRegistry,
        source: &str,
        request: &RenderRequest,
    ) -> Result<Option<Rendered>, RenderError> {
        self.messages.clear();
        let (result, messages) = intercept(Level::Warning, || {
            self.renderer.render(registry, source, request)
        });
        self.messages = messages;

        match result {
            Ok(rendered) => Ok(Some(rendered)),
            Err(e) if e.is_internal() && self.tolerate_internal_errors => {
                tracing::debug!(error = %e, configuration = %request.config, "Ignored internal error");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the last call produced no diagnostics.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }

    /// Diagnostics of the last call.
    #[must_use]
    pub fn messages(&self) -> &[Diagnostic] {
        &self.messages
    }

    /// Diagnostics of the last call formatted with the validator's template.
    #[must_use]
    pub fn formatted_messages(&self) -> Vec<String> {
        self.messages
            .iter()
            .map(|record| format_message(record, &self.template))
            .collect()
    }
}

/// Format a diagnostic with `template`.
///
/// Placeholders: `{lineno}` (`0` when the line is unknown), `{message}`,
/// `{code}` (numeric level) and `{level}` (level name). `{{` and `}}` give
/// literal braces; any other placeholder is kept as written.
#[must_use]
pub fn format_message(record: &Diagnostic, template: &str) -> String {
    let mut out = String::with_capacity(template.len() + record.message.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            rest = "";
            break;
        };
        let name = &tail[1..end];
        match name {
            "lineno" => out.push_str(&record.line.unwrap_or(0).to_string()),
            "message" => out.push_str(&record.message),
            "code" => out.push_str(&record.level.as_u8().to_string()),
            "level" => out.push_str(record.level.name()),
            _ => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstview_engine::directive::{Directive, DirectiveArgs, DirectiveContext, DirectiveOutput};
    use rstview_engine::{EngineError, Options, Value};
    use serial_test::serial;

    use super::*;
    use crate::error::RegistryError;

    const VALID: &str = "Lorem **ipsum** salace";
    const INVALID: &str = "Lorem **ipsum salace";
    const STRONG_MESSAGE: &str = "Inline strong start-string without end-string.";

    fn registry() -> ConfigRegistry {
        let mut registry = ConfigRegistry::new();
        registry.register("default", Options::new()).unwrap();
        registry
    }

    #[test]
    #[serial]
    fn test_valid_source() {
        let mut validator = Validator::new();
        let (valid, messages) = validator.validate(&registry(), VALID, "default").unwrap();
        assert!(valid);
        assert!(messages.is_empty());
        assert!(validator.is_valid());
    }

    #[test]
    #[serial]
    fn test_invalid_source() {
        let mut validator = Validator::new();
        let (valid, messages) = validator.validate(&registry(), INVALID, "default").unwrap();
        assert!(!valid);
        assert_eq!(
            messages,
            vec![Diagnostic::new(Some(1), Level::Warning, STRONG_MESSAGE)]
        );
        assert_eq!(
            validator.formatted_messages(),
            vec!["Line 1 : Inline strong start-string without end-string.".to_owned()]
        );
    }

    #[test]
    #[serial]
    fn test_definition_lists_and_footnotes_are_valid() {
        let source = "term\n  Definition with a note [#]_.\n\n.. [#] The note.\n.. [CIT] A citation.\n";
        let mut validator = Validator::new();
        let (valid, messages) = validator.validate(&registry(), source, "default").unwrap();
        assert!(valid, "unexpected diagnostics: {messages:?}");
    }

    #[test]
    #[serial]
    fn test_substitution_definition_is_reported() {
        let mut validator = Validator::new();
        let (valid, messages) = validator
            .validate(&registry(), "Text.\n\n.. |logo| image:: logo.png\n", "default")
            .unwrap();
        assert!(!valid);
        assert_eq!(
            messages,
            vec![Diagnostic::new(
                Some(3),
                Level::Error,
                "Substitution definitions are not supported."
            )]
        );
    }

    #[test]
    #[serial]
    fn test_sequential_reuse_keeps_only_last_call() {
        let mut validator = Validator::new();
        validator.validate(&registry(), INVALID, "default").unwrap();
        assert_eq!(validator.messages().len(), 1);

        let (valid, messages) = validator.validate(&registry(), VALID, "default").unwrap();
        assert!(valid);
        assert!(messages.is_empty());
        assert!(validator.messages().is_empty());
    }

    #[test]
    #[serial]
    fn test_unknown_configuration_propagates() {
        let mut validator = Validator::new();
        let err = validator.validate(&registry(), VALID, "nope").unwrap_err();
        assert!(matches!(
            err,
            RenderError::Registry(RegistryError::NotRegistered(ref name)) if name == "nope"
        ));
    }

    #[test]
    #[serial]
    fn test_parse_returns_rendered_output() {
        let mut validator = Validator::new();
        let rendered = validator
            .parse(&registry(), INVALID, &RenderRequest::default())
            .unwrap()
            .unwrap();
        assert!(rendered.fragment().contains("system-message"));
        assert_eq!(validator.messages().len(), 1);
    }

    #[derive(Debug)]
    struct FaultyDirective;

    impl Directive for FaultyDirective {
        fn name(&self) -> &str {
            "faulty"
        }

        fn run(
            &self,
            _args: DirectiveArgs,
            _ctx: &mut DirectiveContext<'_, '_>,
        ) -> Result<DirectiveOutput, EngineError> {
            Err(EngineError::Internal("extension fault".to_owned()))
        }
    }

    #[test]
    #[serial]
    fn test_internal_error_tolerance() {
        let source = ".. faulty::\n";
        let renderer = Renderer::new().with_directive(FaultyDirective);

        let mut tolerant = Validator::new().with_renderer(renderer.clone());
        assert_eq!(
            tolerant.parse(&registry(), source, &RenderRequest::default()).unwrap(),
            None
        );

        let mut strict = Validator::new()
            .with_renderer(renderer)
            .with_tolerate_internal_errors(false);
        let err = strict.validate(&registry(), source, "default").unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    #[serial]
    fn test_invalid_setting_propagates() {
        let mut registry = registry();
        registry
            .register(
                "strict",
                [("language_code".to_owned(), Value::Int(7))].into_iter().collect(),
            )
            .unwrap();
        let mut validator = Validator::new();
        let err = validator.validate(&registry, VALID, "strict").unwrap_err();
        assert!(matches!(err, RenderError::Engine(EngineError::InvalidSetting { .. })));
    }

    #[test]
    #[serial]
    fn test_concurrent_validators_see_only_their_own_diagnostics() {
        let registry = registry();
        std::thread::scope(|scope| {
            for worker in 0..8 {
                let registry = &registry;
                scope.spawn(move || {
                    let mut validator = Validator::new();
                    for round in 0..25 {
                        let invalid = (worker + round) % 2 == 0;
                        let source = if invalid { INVALID } else { VALID };
                        let (valid, messages) =
                            validator.validate(registry, source, "default").unwrap();
                        if invalid {
                            assert!(!valid);
                            assert_eq!(
                                messages,
                                vec![Diagnostic::new(Some(1), Level::Warning, STRONG_MESSAGE)]
                            );
                        } else {
                            assert!(valid, "worker {worker} round {round}: {messages:?}");
                        }
                    }
                });
            }
        });
    }

    #[test]
    fn test_format_message_default_template() {
        let record = Diagnostic::new(Some(1), Level::Warning, STRONG_MESSAGE);
        assert_eq!(
            format_message(&record, DEFAULT_ERROR_TEMPLATE),
            "Line 1 : Inline strong start-string without end-string."
        );
    }

    #[test]
    fn test_format_message_placeholders() {
        let record = Diagnostic::new(None, Level::Error, "Unknown directive type \"foo\".");
        assert_eq!(
            format_message(&record, "{level}/{code} at {lineno}: {message}"),
            "ERROR/3 at 0: Unknown directive type \"foo\"."
        );
    }

    #[test]
    fn test_format_message_braces_and_unknown() {
        let record = Diagnostic::new(Some(4), Level::Warning, "oops");
        assert_eq!(
            format_message(&record, "{{{lineno}}} {column} {message"),
            "{4} {column} {message"
        );
    }
}
