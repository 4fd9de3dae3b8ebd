//! Document tree produced by the parser and consumed by writers.

use crate::reporter::{Level, SystemMessage};
use crate::util::normalize_name;

/// A parsed document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    /// Promoted document title.
    pub title: Option<Title>,
    /// Promoted document subtitle.
    pub subtitle: Option<Title>,
    /// Top-level body elements.
    pub children: Vec<Node>,
    /// Messages raised after parsing (by transforms), rendered at the end.
    pub transform_messages: Vec<MessageNode>,
}

/// Title text together with the ids it carried as a section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Title {
    pub ids: Vec<String>,
    pub children: Vec<Inline>,
}

/// Body element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Paragraph(Vec<Inline>),
    Section(Section),
    BulletList(Vec<Vec<Node>>),
    EnumeratedList(EnumeratedList),
    LiteralBlock {
        text: String,
        /// Language given to `code`-style directives.
        language: Option<String>,
    },
    BlockQuote(Vec<Node>),
    DefinitionList(Vec<DefinitionItem>),
    /// Footnote or citation, rendered where it is defined.
    Note(Note),
    Admonition(Admonition),
    /// Raw output passed through for the given format.
    Raw {
        format: String,
        text: String,
    },
    Transition,
    Comment(String),
    /// Internal hyperlink target, rendered as an anchor.
    Target {
        id: String,
    },
    SystemMessage(MessageNode),
}

/// A section with its title and content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub ids: Vec<String>,
    pub title: Vec<Inline>,
    pub children: Vec<Node>,
}

/// Enumeration style of an ordered list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnumType {
    Arabic,
    LowerAlpha,
    UpperAlpha,
}

impl EnumType {
    /// Class name used by HTML writers.
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Arabic => "arabic",
            Self::LowerAlpha => "loweralpha",
            Self::UpperAlpha => "upperalpha",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumeratedList {
    pub enumtype: EnumType,
    pub start: usize,
    pub items: Vec<Vec<Node>>,
}

/// One term of a definition list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionItem {
    pub term: Vec<Inline>,
    /// `term : classifier` annotations, in order.
    pub classifiers: Vec<Vec<Inline>>,
    pub definition: Vec<Node>,
}

/// Label of a footnote or citation as written in the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoteLabel {
    /// `[1]`
    Number(usize),
    /// `[#]`, numbered in document order.
    Auto,
    /// `[#name]`, numbered in document order and referenced by name.
    AutoNamed(String),
    /// `[*]`, labelled with the next footnote symbol.
    Symbol,
    /// `[CIT2002]`
    Citation(String),
}

impl NoteLabel {
    #[must_use]
    pub fn is_citation(&self) -> bool {
        matches!(self, Self::Citation(_))
    }

    /// Name references use to find the note, if it has one.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Number(n) => Some(n.to_string()),
            Self::AutoNamed(name) | Self::Citation(name) => Some(normalize_name(name)),
            Self::Auto | Self::Symbol => None,
        }
    }
}

/// Footnote or citation body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub label: NoteLabel,
    /// Displayed label, assigned when footnotes are numbered.
    pub text: String,
    /// Ids of the references pointing at this note.
    pub backrefs: Vec<String>,
    pub children: Vec<Node>,
}

/// Reference to a footnote or citation (`[1]_`, `[#]_`, `[CIT2002]_`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteReference {
    pub id: String,
    pub label: NoteLabel,
    /// Displayed label, assigned on resolution.
    pub text: String,
    /// Id of the note, assigned on resolution.
    pub refid: Option<String>,
    /// Source text of the reference.
    pub raw: String,
}

/// Admonition block (`note`, `warning`, generic `admonition`, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Admonition {
    /// Specific admonition kind, `None` for the generic admonition.
    pub kind: Option<String>,
    /// Explicit title of a generic admonition.
    pub title: Option<Vec<Inline>>,
    pub classes: Vec<String>,
    pub children: Vec<Node>,
}

/// A diagnostic placed in the document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageNode {
    pub level: Level,
    pub message: String,
    pub line: Option<usize>,
    /// Anchor id, assigned when something links back to the message.
    pub id: Option<String>,
    /// Ids of the problematic nodes pointing at this message.
    pub backrefs: Vec<String>,
    /// Offending source text, shown as a literal block.
    pub details: Option<String>,
}

impl MessageNode {
    #[must_use]
    pub fn new(msg: SystemMessage) -> Self {
        Self {
            level: msg.level,
            message: msg.message,
            line: msg.line,
            id: None,
            backrefs: Vec::new(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Where a reference points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefTarget {
    /// External URI.
    Uri(String),
    /// Element id in the same document.
    Id(String),
    /// Named reference awaiting resolution.
    Name(String),
    /// Anonymous reference awaiting resolution, by position.
    Anonymous(usize),
}

/// Inline element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Literal(String),
    TitleReference(Vec<Inline>),
    Subscript(Vec<Inline>),
    Superscript(Vec<Inline>),
    Reference {
        children: Vec<Inline>,
        target: RefTarget,
        /// Source text of the reference, used when it cannot be resolved.
        raw: String,
    },
    /// Markup that failed to parse, linked to its message.
    Problematic {
        text: String,
        id: String,
        refid: String,
    },
    Raw {
        format: String,
        text: String,
    },
    NoteReference(NoteReference),
}

impl Inline {
    /// Plain-text content of the element.
    #[must_use]
    pub fn astext(&self) -> String {
        match self {
            Self::Text(text) | Self::Literal(text) | Self::Problematic { text, .. } => {
                text.clone()
            }
            Self::Raw { .. } => String::new(),
            Self::NoteReference(reference) => reference.text.clone(),
            Self::Emphasis(children)
            | Self::Strong(children)
            | Self::TitleReference(children)
            | Self::Subscript(children)
            | Self::Superscript(children)
            | Self::Reference { children, .. } => astext(children),
        }
    }
}

/// Plain-text content of a run of inline elements.
#[must_use]
pub fn astext(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::astext).collect()
}
