//! Pluggable directives: `.. name:: arguments`.
//!
//! A directive receives its parsed [`DirectiveArgs`] and a
//! [`DirectiveContext`] giving access to nested parsing, diagnostics and file
//! reading. It returns either tree nodes or source text to splice into the
//! document in its place (used by `include`).
//!
//! # Example
//!
//! ```
//! use rstview_engine::directive::{Directive, DirectiveArgs, DirectiveContext, DirectiveOutput};
//! use rstview_engine::{EngineError, Html4Writer, Node, Options, Publisher};
//!
//! struct Shout;
//!
//! impl Directive for Shout {
//!     fn name(&self) -> &str { "shout" }
//!
//!     fn takes_arguments(&self) -> bool { true }
//!
//!     fn run(
//!         &self,
//!         args: DirectiveArgs,
//!         _ctx: &mut DirectiveContext<'_, '_>,
//!     ) -> Result<DirectiveOutput, EngineError> {
//!         Ok(DirectiveOutput::Nodes(vec![Node::Raw {
//!             format: "html".to_owned(),
//!             text: format!("<p>{}!</p>", args.arguments.to_uppercase()),
//!         }]))
//!     }
//! }
//!
//! let publisher = Publisher::new().with_directive(Shout);
//! let parts = publisher
//!     .publish_parts::<Html4Writer>(".. shout:: hello", &Options::new())
//!     .unwrap();
//! assert_eq!(parts.fragment, "<p>HELLO!</p>\n");
//! ```

mod builtin;

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

pub use builtin::{
    AdmonitionDirective, CodeDirective, GenericAdmonitionDirective, IncludeDirective,
    RawDirective,
};

use crate::error::EngineError;
use crate::nodes::{Inline, MessageNode, Node};
use crate::parser::{DocumentParser, Line};
use crate::reporter::Level;
use crate::settings::Settings;

/// Handler for a block directive.
///
/// Directives are shared between documents and threads, so `run` takes
/// `&self`.
pub trait Directive: Send + Sync {
    /// Directive name as written before `::`.
    fn name(&self) -> &str;

    /// Whether text on the directive line is an argument.
    ///
    /// When `false`, that text is the first line of the content.
    fn takes_arguments(&self) -> bool {
        false
    }

    /// Whether the directive accepts a content block.
    fn has_content(&self) -> bool {
        true
    }

    /// Run the directive.
    ///
    /// Problems with the markup are reported through `ctx` and returned as
    /// message nodes. An `Err` aborts the whole parse.
    fn run(
        &self,
        args: DirectiveArgs,
        ctx: &mut DirectiveContext<'_, '_>,
    ) -> Result<DirectiveOutput, EngineError>;
}

/// Parsed directive block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectiveArgs {
    /// Directive name, lowercased.
    pub name: String,
    /// Argument text, whitespace-joined across lines.
    pub arguments: String,
    /// Field-list options (`:name: value`).
    pub options: BTreeMap<String, String>,
    /// Content lines, dedented.
    pub content: Vec<String>,
    /// Line number of the first content line.
    pub content_line: usize,
}

impl DirectiveArgs {
    pub(crate) fn parse(
        directive: &dyn Directive,
        name: &str,
        first: &str,
        body: &[Line],
        line: usize,
    ) -> Self {
        let mut args = Self {
            name: name.to_owned(),
            content_line: line + 1,
            ..Self::default()
        };
        let mut idx = 0;

        if directive.takes_arguments() {
            let mut parts = vec![first.to_owned()];
            while idx < body.len() && !body[idx].is_blank() && parse_option(&body[idx].text).is_none() {
                parts.push(body[idx].text.trim().to_owned());
                idx += 1;
            }
            args.arguments = parts
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join(" ");
        } else if !first.is_empty() {
            args.content.push(first.to_owned());
            args.content_line = line;
            args.content.extend(body.iter().map(|l| l.text.clone()));
            trim_trailing_blank(&mut args.content);
            return args;
        }

        while let Some((key, value)) = body.get(idx).and_then(|l| parse_option(&l.text)) {
            args.options.insert(key, value);
            idx += 1;
        }
        while body.get(idx).is_some_and(Line::is_blank) {
            idx += 1;
        }
        if let Some(first_content) = body.get(idx) {
            args.content_line = first_content.lineno;
            args.content = body[idx..].iter().map(|l| l.text.clone()).collect();
            trim_trailing_blank(&mut args.content);
        }
        args
    }

    /// Option value by name.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Classes given with the `:class:` option.
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.option("class")
            .map(|v| v.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default()
    }
}

fn parse_option(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix(':')?;
    let end = rest.find(':')?;
    let key = &rest[..end];
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key.to_lowercase(), rest[end + 1..].trim().to_owned()))
}

fn trim_trailing_blank(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
}

/// What a directive produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectiveOutput {
    /// Nodes inserted in place of the directive.
    Nodes(Vec<Node>),
    /// Source text parsed in place of the directive, as if it had been
    /// written there.
    Include(String),
}

/// Context passed to [`Directive::run`].
pub struct DirectiveContext<'p, 'a> {
    parser: &'p mut DocumentParser<'a>,
    /// Line of the directive marker.
    pub line: usize,
    /// Full source text of the directive block.
    pub block_text: String,
    include_depth: usize,
}

impl<'p, 'a> DirectiveContext<'p, 'a> {
    pub(crate) fn new(
        parser: &'p mut DocumentParser<'a>,
        line: usize,
        block_text: String,
        include_depth: usize,
    ) -> Self {
        Self {
            parser,
            line,
            block_text,
            include_depth,
        }
    }

    /// Settings of the current parse.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.parser.settings
    }

    /// Number of `include` levels above this directive.
    #[must_use]
    pub fn include_depth(&self) -> usize {
        self.include_depth
    }

    /// Parse `lines` as body elements nested inside the directive.
    pub fn parse_nested(
        &mut self,
        lines: &[String],
        first_line: usize,
    ) -> Result<Vec<Node>, EngineError> {
        let lines = lines
            .iter()
            .enumerate()
            .map(|(offset, text)| Line {
                text: text.trim_end().to_owned(),
                lineno: first_line + offset,
                depth: self.include_depth,
            })
            .collect();
        self.parser.parse_blocks(lines, true)
    }

    /// Parse inline markup, returning the inline nodes and any messages.
    pub fn parse_inline(
        &mut self,
        text: &str,
        line: usize,
    ) -> Result<(Vec<Inline>, Vec<Node>), EngineError> {
        self.parser.parse_inline(text, line)
    }

    /// Report a problem with this directive, showing its source.
    pub fn report(&self, level: Level, message: &str) -> Result<Node, EngineError> {
        let msg = self.parser.message(level, message, Some(self.line))?;
        Ok(Node::SystemMessage(msg.with_details(self.block_text.clone())))
    }

    pub fn warning(&self, message: &str) -> Result<Node, EngineError> {
        self.report(Level::Warning, message)
    }

    pub fn error(&self, message: &str) -> Result<Node, EngineError> {
        self.report(Level::Error, message)
    }

    pub fn severe(&self, message: &str) -> Result<Node, EngineError> {
        self.report(Level::Severe, message)
    }

    /// Report a problem without attaching the directive source.
    pub fn message(&self, level: Level, message: &str) -> Result<MessageNode, EngineError> {
        self.parser.message(level, message, Some(self.line))
    }

    /// Resolve `relative` against the publisher's base directory.
    #[must_use]
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        self.parser.publisher.base_dir().join(relative)
    }

    /// Read a file through the publisher's file reader.
    pub fn read_file(&self, path: &Path) -> io::Result<String> {
        self.parser.publisher.read_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WithArgs;

    impl Directive for WithArgs {
        fn name(&self) -> &str {
            "with-args"
        }

        fn takes_arguments(&self) -> bool {
            true
        }

        fn run(
            &self,
            _args: DirectiveArgs,
            _ctx: &mut DirectiveContext<'_, '_>,
        ) -> Result<DirectiveOutput, EngineError> {
            Ok(DirectiveOutput::Nodes(Vec::new()))
        }
    }

    struct ContentOnly;

    impl Directive for ContentOnly {
        fn name(&self) -> &str {
            "content-only"
        }

        fn run(
            &self,
            _args: DirectiveArgs,
            _ctx: &mut DirectiveContext<'_, '_>,
        ) -> Result<DirectiveOutput, EngineError> {
            Ok(DirectiveOutput::Nodes(Vec::new()))
        }
    }

    fn body(lines: &[&str], first: usize) -> Vec<Line> {
        lines
            .iter()
            .enumerate()
            .map(|(i, text)| Line {
                text: (*text).to_owned(),
                lineno: first + i,
                depth: 0,
            })
            .collect()
    }

    #[test]
    fn test_parse_arguments_options_content() {
        let args = DirectiveArgs::parse(
            &WithArgs,
            "with-args",
            "python",
            &body(&["more", ":linenos:", ":class: a b", "", "print(1)", "", ""], 2),
            1,
        );
        assert_eq!(args.arguments, "python more");
        assert_eq!(args.option("linenos"), Some(""));
        assert_eq!(args.classes(), vec!["a", "b"]);
        assert_eq!(args.content, vec!["print(1)"]);
        assert_eq!(args.content_line, 6);
    }

    #[test]
    fn test_parse_first_line_is_content() {
        let args = DirectiveArgs::parse(
            &ContentOnly,
            "content-only",
            "Be careful.",
            &body(&["It is hot."], 5),
            4,
        );
        assert!(args.arguments.is_empty());
        assert_eq!(args.content, vec!["Be careful.", "It is hot."]);
        assert_eq!(args.content_line, 4);
    }

    #[test]
    fn test_parse_content_without_blank_line() {
        let args =
            DirectiveArgs::parse(&ContentOnly, "content-only", "", &body(&["Body."], 2), 1);
        assert_eq!(args.content, vec!["Body."]);
        assert_eq!(args.content_line, 2);
    }

    #[test]
    fn test_parse_option_rejects_plain_text() {
        assert_eq!(parse_option("plain: text"), None);
        assert_eq!(parse_option(":two words: x"), None);
        assert_eq!(
            parse_option(":Code: rst"),
            Some(("code".to_owned(), "rst".to_owned()))
        );
    }
}
