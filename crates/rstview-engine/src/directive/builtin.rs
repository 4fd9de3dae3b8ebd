//! Directives available in every publisher.

use super::{Directive, DirectiveArgs, DirectiveContext, DirectiveOutput};
use crate::error::EngineError;
use crate::language::ADMONITION_KINDS;
use crate::nodes::{Admonition, Node};
use crate::util::make_id;

/// Specific admonition (`note`, `warning`, ...).
#[derive(Debug)]
pub struct AdmonitionDirective {
    kind: &'static str,
}

impl AdmonitionDirective {
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self { kind }
    }

    /// One directive per known admonition kind.
    #[must_use]
    pub fn all() -> Vec<Self> {
        ADMONITION_KINDS.iter().map(|kind| Self::new(kind)).collect()
    }
}

impl Directive for AdmonitionDirective {
    fn name(&self) -> &str {
        self.kind
    }

    fn run(
        &self,
        args: DirectiveArgs,
        ctx: &mut DirectiveContext<'_, '_>,
    ) -> Result<DirectiveOutput, EngineError> {
        if args.content.is_empty() {
            let node = ctx.error(&format!(
                "Error in \"{}\" directive:\nThe \"{}\" admonition is empty; content required.",
                args.name, args.name
            ))?;
            return Ok(DirectiveOutput::Nodes(vec![node]));
        }
        let children = ctx.parse_nested(&args.content, args.content_line)?;
        Ok(DirectiveOutput::Nodes(vec![Node::Admonition(Admonition {
            kind: Some(self.kind.to_owned()),
            title: None,
            classes: args.classes(),
            children,
        })]))
    }
}

/// Generic `admonition` with an explicit title.
#[derive(Debug, Default)]
pub struct GenericAdmonitionDirective;

impl Directive for GenericAdmonitionDirective {
    fn name(&self) -> &str {
        "admonition"
    }

    fn takes_arguments(&self) -> bool {
        true
    }

    fn run(
        &self,
        args: DirectiveArgs,
        ctx: &mut DirectiveContext<'_, '_>,
    ) -> Result<DirectiveOutput, EngineError> {
        if args.arguments.is_empty() {
            let node =
                ctx.error("Error in \"admonition\" directive:\n1 argument(s) required, 0 supplied.")?;
            return Ok(DirectiveOutput::Nodes(vec![node]));
        }
        let line = ctx.line;
        let (title, mut nodes) = ctx.parse_inline(&args.arguments, line)?;
        let children = ctx.parse_nested(&args.content, args.content_line)?;

        let mut classes = vec![format!("admonition-{}", make_id(&args.arguments))];
        classes.extend(args.classes());
        nodes.insert(
            0,
            Node::Admonition(Admonition {
                kind: None,
                title: Some(title),
                classes,
                children,
            }),
        );
        Ok(DirectiveOutput::Nodes(nodes))
    }
}

/// `code`, `code-block` and `sourcecode`: a literal block with an optional
/// language.
#[derive(Debug)]
pub struct CodeDirective {
    name: &'static str,
}

impl CodeDirective {
    #[must_use]
    pub fn all() -> Vec<Self> {
        ["code", "code-block", "sourcecode"]
            .into_iter()
            .map(|name| Self { name })
            .collect()
    }
}

impl Directive for CodeDirective {
    fn name(&self) -> &str {
        self.name
    }

    fn takes_arguments(&self) -> bool {
        true
    }

    fn run(
        &self,
        args: DirectiveArgs,
        ctx: &mut DirectiveContext<'_, '_>,
    ) -> Result<DirectiveOutput, EngineError> {
        if args.content.is_empty() {
            let node = ctx.warning(&format!(
                "Content block expected for the \"{}\" directive; none found.",
                args.name
            ))?;
            return Ok(DirectiveOutput::Nodes(vec![node]));
        }
        let language = args
            .arguments
            .split_whitespace()
            .next()
            .map(str::to_lowercase);
        Ok(DirectiveOutput::Nodes(vec![Node::LiteralBlock {
            text: args.content.join("\n"),
            language,
        }]))
    }
}

/// `raw`: output passed through unchanged, gated by `raw_enabled`.
#[derive(Debug, Default)]
pub struct RawDirective;

impl Directive for RawDirective {
    fn name(&self) -> &str {
        "raw"
    }

    fn takes_arguments(&self) -> bool {
        true
    }

    fn run(
        &self,
        args: DirectiveArgs,
        ctx: &mut DirectiveContext<'_, '_>,
    ) -> Result<DirectiveOutput, EngineError> {
        if !ctx.settings().raw_enabled {
            let node = ctx.warning("\"raw\" directive disabled.")?;
            return Ok(DirectiveOutput::Nodes(vec![node]));
        }
        if args.arguments.is_empty() {
            let node = ctx.error("Error in \"raw\" directive:\n1 argument(s) required, 0 supplied.")?;
            return Ok(DirectiveOutput::Nodes(vec![node]));
        }
        if args.content.is_empty() {
            let node = ctx.error("The \"raw\" directive requires content; none supplied.")?;
            return Ok(DirectiveOutput::Nodes(vec![node]));
        }
        Ok(DirectiveOutput::Nodes(vec![Node::Raw {
            format: args.arguments.to_lowercase(),
            text: args.content.join("\n"),
        }]))
    }
}

/// `include`: splice another file into the document, gated by
/// `file_insertion_enabled`.
///
/// With `:literal:` or `:code: language` the file becomes a literal block.
#[derive(Debug, Default)]
pub struct IncludeDirective;

impl Directive for IncludeDirective {
    fn name(&self) -> &str {
        "include"
    }

    fn takes_arguments(&self) -> bool {
        true
    }

    fn has_content(&self) -> bool {
        false
    }

    fn run(
        &self,
        args: DirectiveArgs,
        ctx: &mut DirectiveContext<'_, '_>,
    ) -> Result<DirectiveOutput, EngineError> {
        if !ctx.settings().file_insertion_enabled {
            let node = ctx.warning("\"include\" directive disabled.")?;
            return Ok(DirectiveOutput::Nodes(vec![node]));
        }
        if args.arguments.is_empty() {
            let node =
                ctx.error("Error in \"include\" directive:\n1 argument(s) required, 0 supplied.")?;
            return Ok(DirectiveOutput::Nodes(vec![node]));
        }

        let path = ctx.resolve_path(&args.arguments);
        let text = match ctx.read_file(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Include failed");
                let node = ctx.severe(&format!(
                    "Problems with \"include\" directive path:\n{e}: '{}'.",
                    path.display()
                ))?;
                return Ok(DirectiveOutput::Nodes(vec![node]));
            }
        };

        if args.options.contains_key("literal") || args.options.contains_key("code") {
            let language = args
                .option("code")
                .filter(|lang| !lang.is_empty())
                .map(str::to_lowercase);
            return Ok(DirectiveOutput::Nodes(vec![Node::LiteralBlock {
                text: text.trim_end().to_owned(),
                language,
            }]));
        }
        Ok(DirectiveOutput::Include(text))
    }
}
