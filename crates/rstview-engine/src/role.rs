//! Interpreted text roles: `:name:`text``.

use crate::error::EngineError;
use crate::nodes::Inline;
use crate::settings::Settings;

/// Role applied to interpreted text without an explicit role.
pub const DEFAULT_ROLE: &str = "title-reference";

/// Context passed to [`Role::run`].
#[derive(Debug)]
pub struct RoleContext<'a> {
    /// Role name as written.
    pub name: &'a str,
    /// Full source text of the interpreted text, role included.
    pub rawtext: &'a str,
    /// Source line.
    pub line: usize,
    pub settings: &'a Settings,
}

/// Handler for an interpreted text role.
pub trait Role: Send + Sync {
    /// Role name, matched case-insensitively.
    fn name(&self) -> &str;

    /// Produce inline nodes for `text` (already unescaped).
    fn run(&self, text: &str, ctx: &RoleContext<'_>) -> Result<Vec<Inline>, EngineError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    Emphasis,
    Strong,
    Literal,
    Subscript,
    Superscript,
    TitleReference,
}

/// Built-in role wrapping its text in a single inline element.
#[derive(Debug)]
pub struct StyleRole {
    name: &'static str,
    style: Style,
}

impl StyleRole {
    /// All built-in roles, aliases included.
    #[must_use]
    pub fn builtins() -> Vec<Self> {
        [
            ("emphasis", Style::Emphasis),
            ("strong", Style::Strong),
            ("literal", Style::Literal),
            ("code", Style::Literal),
            ("sub", Style::Subscript),
            ("subscript", Style::Subscript),
            ("sup", Style::Superscript),
            ("superscript", Style::Superscript),
            ("title-reference", Style::TitleReference),
            ("title", Style::TitleReference),
            ("t", Style::TitleReference),
        ]
        .into_iter()
        .map(|(name, style)| Self { name, style })
        .collect()
    }
}

impl Role for StyleRole {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, text: &str, _ctx: &RoleContext<'_>) -> Result<Vec<Inline>, EngineError> {
        let children = || vec![Inline::Text(text.to_owned())];
        let node = match self.style {
            Style::Emphasis => Inline::Emphasis(children()),
            Style::Strong => Inline::Strong(children()),
            Style::Literal => Inline::Literal(text.to_owned()),
            Style::Subscript => Inline::Subscript(children()),
            Style::Superscript => Inline::Superscript(children()),
            Style::TitleReference => Inline::TitleReference(children()),
        };
        Ok(vec![node])
    }
}
