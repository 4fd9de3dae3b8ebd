//! reStructuredText parser.
//!
//! [`DocumentParser`] turns source text into a [`Document`]. Block structure is
//! handled in `block`, inline markup in `inline` and the post-parse passes
//! (reference resolution, title promotion) in `transforms`.

mod block;
mod inline;
mod transforms;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::EngineError;
use crate::nodes::{Document, Inline, MessageNode, NoteLabel, RefTarget};
use crate::publish::Publisher;
use crate::reporter::{Level, Reporter};
use crate::settings::Settings;
use crate::util::{Ids, expand_tabs};

/// Maximum nesting of `include` directives.
pub const MAX_INCLUDE_DEPTH: usize = 10;

static REFNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+(?:[-._+:][A-Za-z0-9]+)*$").unwrap());

/// Parse the text between the brackets of a footnote or citation label.
pub(crate) fn note_label(text: &str) -> Option<NoteLabel> {
    if text == "#" {
        return Some(NoteLabel::Auto);
    }
    if text == "*" {
        return Some(NoteLabel::Symbol);
    }
    if let Some(name) = text.strip_prefix('#') {
        return REFNAME_RE
            .is_match(name)
            .then(|| NoteLabel::AutoNamed(name.to_owned()));
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok().map(NoteLabel::Number);
    }
    REFNAME_RE
        .is_match(text)
        .then(|| NoteLabel::Citation(text.to_owned()))
}

/// A source line with its position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Line {
    /// Text with tabs expanded and trailing whitespace removed.
    pub text: String,
    /// 1-based line number in the file the line came from.
    pub lineno: usize,
    /// Include nesting the line came from, 0 for the main source.
    pub depth: usize,
}

impl Line {
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Split `source` into lines numbered from `first_line`.
pub(crate) fn split_lines(source: &str, first_line: usize, depth: usize, tab_width: usize) -> Vec<Line> {
    source
        .lines()
        .enumerate()
        .map(|(offset, text)| Line {
            text: expand_tabs(text, tab_width).trim_end().to_owned(),
            lineno: first_line + offset,
            depth,
        })
        .collect()
}

/// Parsing state for one document.
pub(crate) struct DocumentParser<'a> {
    pub publisher: &'a Publisher,
    pub settings: &'a Settings,
    pub reporter: &'a Reporter,
    pub ids: Ids,
    explicit_targets: HashMap<String, RefTarget>,
    implicit_targets: HashMap<String, RefTarget>,
    anonymous_targets: Vec<String>,
    anonymous_refs: usize,
    /// Footnotes and citations with their ids, in document order.
    notes: Vec<(NoteLabel, String)>,
    /// Adornment styles in order of first appearance; index + 1 is the level.
    title_styles: Vec<(char, bool)>,
}

impl<'a> DocumentParser<'a> {
    pub fn new(publisher: &'a Publisher, settings: &'a Settings, reporter: &'a Reporter) -> Self {
        Self {
            publisher,
            settings,
            reporter,
            ids: Ids::default(),
            explicit_targets: HashMap::new(),
            implicit_targets: HashMap::new(),
            anonymous_targets: Vec::new(),
            anonymous_refs: 0,
            notes: Vec::new(),
            title_styles: Vec::new(),
        }
    }

    /// Parse a complete document and run the transforms.
    pub fn parse_document(&mut self, source: &str) -> Result<Document, EngineError> {
        let lines = split_lines(source, 1, 0, self.settings.tab_width);
        let children = self.parse_blocks(lines, false)?;
        let mut document = Document {
            children,
            ..Document::default()
        };
        self.apply_transforms(&mut document)?;
        Ok(document)
    }

    /// Raise a diagnostic and wrap it in a tree node.
    pub fn message(
        &self,
        level: Level,
        text: &str,
        line: Option<usize>,
    ) -> Result<MessageNode, EngineError> {
        Ok(MessageNode::new(
            self.reporter.system_message(level, text, line)?,
        ))
    }

    /// Create a problematic node for `raw` pointing at `msg`, and link the
    /// message back to it.
    pub fn link_problematic(&mut self, msg: &mut MessageNode, raw: &str) -> Inline {
        let refid = match &msg.id {
            Some(id) => id.clone(),
            None => {
                let id = self.ids.auto();
                msg.id = Some(id.clone());
                id
            }
        };
        let id = self.ids.auto();
        msg.backrefs.push(id.clone());
        Inline::Problematic {
            text: raw.to_owned(),
            id,
            refid,
        }
    }

    /// Record an explicit target. The first definition of a name wins.
    fn add_explicit_target(
        &mut self,
        name: String,
        target: RefTarget,
        line: usize,
    ) -> Result<Option<MessageNode>, EngineError> {
        if let Some(existing) = self.explicit_targets.get(&name) {
            if *existing == target {
                return Ok(None);
            }
            let msg = self.message(
                Level::Warning,
                &format!("Duplicate explicit target name: \"{name}\"."),
                Some(line),
            )?;
            return Ok(Some(msg));
        }
        tracing::trace!(name = %name, "Registered target");
        self.explicit_targets.insert(name, target);
        Ok(None)
    }

    fn add_implicit_target(&mut self, name: String, id: &str) {
        self.implicit_targets
            .entry(name)
            .or_insert_with(|| RefTarget::Id(id.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_label() {
        assert_eq!(note_label("12"), Some(NoteLabel::Number(12)));
        assert_eq!(note_label("#"), Some(NoteLabel::Auto));
        assert_eq!(note_label("#note"), Some(NoteLabel::AutoNamed("note".to_owned())));
        assert_eq!(note_label("*"), Some(NoteLabel::Symbol));
        assert_eq!(note_label("CIT2002"), Some(NoteLabel::Citation("CIT2002".to_owned())));
        assert_eq!(note_label("two words"), None);
        assert_eq!(note_label("#bad name"), None);
        assert_eq!(note_label(""), None);
    }

    #[test]
    fn test_split_lines() {
        let lines = split_lines("one  \n\ttwo\r\n\nthree", 4, 1, 4);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "    two", "", "three"]);
        assert_eq!(lines[0].lineno, 4);
        assert_eq!(lines[3].lineno, 7);
        assert!(lines.iter().all(|l| l.depth == 1));
        assert!(lines[2].is_blank());
    }
}
