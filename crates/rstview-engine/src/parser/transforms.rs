//! Passes run over the parsed tree.

use std::collections::{HashMap, HashSet};

use super::DocumentParser;
use crate::error::EngineError;
use crate::nodes::{
    Document, Inline, MessageNode, Node, NoteLabel, NoteReference, RefTarget, Section, Title,
};
use crate::reporter::Level;

/// Longest chain of indirect targets followed before giving up.
const MAX_INDIRECTION: usize = 16;

const FOOTNOTE_SYMBOLS: [char; 10] = ['*', '†', '‡', '§', '¶', '#', '♠', '♥', '♦', '♣'];

/// Footnote and citation labels, and who points at them.
#[derive(Default)]
struct Notes {
    /// Displayed label per note id.
    labels: HashMap<String, String>,
    /// Note id per reference name.
    by_key: HashMap<String, String>,
    /// Ids of `[#]` footnotes, in order.
    auto: Vec<String>,
    /// Ids of `[*]` footnotes, in order.
    symbols: Vec<String>,
    auto_refs: usize,
    symbol_refs: usize,
    backrefs: HashMap<String, Vec<String>>,
}

impl Notes {
    fn number(notes: &[(NoteLabel, String)]) -> Self {
        let manual: HashSet<usize> = notes
            .iter()
            .filter_map(|(label, _)| match label {
                NoteLabel::Number(n) => Some(*n),
                _ => None,
            })
            .collect();
        let mut table = Self::default();
        let mut counter = 0;
        for (label, id) in notes {
            let text = match label {
                NoteLabel::Number(n) => n.to_string(),
                NoteLabel::Citation(text) => text.clone(),
                NoteLabel::Auto | NoteLabel::AutoNamed(_) => {
                    counter += 1;
                    while manual.contains(&counter) {
                        counter += 1;
                    }
                    counter.to_string()
                }
                NoteLabel::Symbol => {
                    let index = table.symbols.len();
                    let symbol = FOOTNOTE_SYMBOLS[index % FOOTNOTE_SYMBOLS.len()];
                    std::iter::repeat_n(symbol, index / FOOTNOTE_SYMBOLS.len() + 1).collect()
                }
            };
            match label {
                NoteLabel::Auto => table.auto.push(id.clone()),
                NoteLabel::Symbol => table.symbols.push(id.clone()),
                _ => {}
            }
            if let Some(key) = label.key() {
                table.by_key.entry(key).or_insert_with(|| id.clone());
            }
            table.labels.entry(id.clone()).or_insert(text);
        }
        table
    }

    /// Note id a reference points at, or the error to report.
    fn lookup(&mut self, label: &NoteLabel) -> Result<String, String> {
        let found = match label {
            NoteLabel::Auto => {
                self.auto_refs += 1;
                self.auto.get(self.auto_refs - 1)
            }
            NoteLabel::Symbol => {
                self.symbol_refs += 1;
                self.symbols.get(self.symbol_refs - 1)
            }
            other => other.key().and_then(|key| self.by_key.get(&key)),
        };
        found.cloned().ok_or_else(|| match label {
            NoteLabel::Auto => format!(
                "Too many autonumbered footnote references: only {} corresponding footnotes available.",
                self.auto.len()
            ),
            NoteLabel::Symbol => format!(
                "Too many symbol footnote references: only {} corresponding footnotes available.",
                self.symbols.len()
            ),
            other => format!("Unknown target name: \"{}\".", other.key().unwrap_or_default()),
        })
    }
}

#[derive(Default)]
struct Resolution {
    messages: Vec<MessageNode>,
    /// Index in `messages` of the anonymous mismatch report, once raised.
    anonymous_mismatch: Option<usize>,
    notes: Notes,
}

impl DocumentParser<'_> {
    pub(crate) fn apply_transforms(&mut self, document: &mut Document) -> Result<(), EngineError> {
        if self.settings.doctitle_xform {
            promote_titles(document);
        }
        self.resolve_references(document)
    }

    fn resolve_references(&mut self, document: &mut Document) -> Result<(), EngineError> {
        let mut state = Resolution {
            notes: Notes::number(&self.notes),
            ..Resolution::default()
        };
        if let Some(title) = document.title.as_mut() {
            self.resolve_inlines(&mut title.children, &mut state)?;
        }
        if let Some(subtitle) = document.subtitle.as_mut() {
            self.resolve_inlines(&mut subtitle.children, &mut state)?;
        }
        self.resolve_nodes(&mut document.children, &mut state)?;
        fill_notes(&mut document.children, &mut state.notes);
        document.transform_messages.extend(state.messages);
        Ok(())
    }

    fn resolve_nodes(
        &mut self,
        nodes: &mut [Node],
        state: &mut Resolution,
    ) -> Result<(), EngineError> {
        for node in nodes {
            match node {
                Node::Paragraph(inlines) => self.resolve_inlines(inlines, state)?,
                Node::Section(section) => {
                    self.resolve_inlines(&mut section.title, state)?;
                    self.resolve_nodes(&mut section.children, state)?;
                }
                Node::BulletList(items) => {
                    for item in items {
                        self.resolve_nodes(item, state)?;
                    }
                }
                Node::EnumeratedList(list) => {
                    for item in &mut list.items {
                        self.resolve_nodes(item, state)?;
                    }
                }
                Node::BlockQuote(children) => self.resolve_nodes(children, state)?,
                Node::DefinitionList(items) => {
                    for item in items {
                        self.resolve_inlines(&mut item.term, state)?;
                        for classifier in &mut item.classifiers {
                            self.resolve_inlines(classifier, state)?;
                        }
                        self.resolve_nodes(&mut item.definition, state)?;
                    }
                }
                Node::Note(note) => self.resolve_nodes(&mut note.children, state)?,
                Node::Admonition(admonition) => {
                    if let Some(title) = admonition.title.as_mut() {
                        self.resolve_inlines(title, state)?;
                    }
                    self.resolve_nodes(&mut admonition.children, state)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn resolve_inlines(
        &mut self,
        inlines: &mut [Inline],
        state: &mut Resolution,
    ) -> Result<(), EngineError> {
        for inline in inlines {
            let unresolved = match inline {
                Inline::Reference { target, raw, .. } => match self.lookup(target) {
                    Some(resolved) => {
                        *target = resolved;
                        None
                    }
                    None => Some((target.clone(), raw.clone())),
                },
                Inline::NoteReference(reference) => {
                    if let Err(error) = resolve_note(reference, &mut state.notes) {
                        let raw = reference.raw.clone();
                        let mut msg = self.message(Level::Error, &error, None)?;
                        *inline = self.link_problematic(&mut msg, &raw);
                        state.messages.push(msg);
                    }
                    None
                }
                Inline::Emphasis(children)
                | Inline::Strong(children)
                | Inline::TitleReference(children)
                | Inline::Subscript(children)
                | Inline::Superscript(children) => {
                    self.resolve_inlines(children, state)?;
                    None
                }
                _ => None,
            };
            if let Some((target, raw)) = unresolved {
                *inline = self.unresolved(&target, &raw, state)?;
            }
        }
        Ok(())
    }

    /// Final target of a reference, following indirect targets.
    fn lookup(&self, target: &RefTarget) -> Option<RefTarget> {
        let mut current = target.clone();
        for _ in 0..MAX_INDIRECTION {
            current = match current {
                RefTarget::Uri(_) | RefTarget::Id(_) => return Some(current),
                RefTarget::Anonymous(index) => {
                    if self.anonymous_refs != self.anonymous_targets.len() {
                        return None;
                    }
                    return self.anonymous_targets.get(index).cloned().map(RefTarget::Uri);
                }
                RefTarget::Name(name) => self
                    .explicit_targets
                    .get(&name)
                    .or_else(|| self.implicit_targets.get(&name))?
                    .clone(),
            };
        }
        None
    }

    fn unresolved(
        &mut self,
        target: &RefTarget,
        raw: &str,
        state: &mut Resolution,
    ) -> Result<Inline, EngineError> {
        if let RefTarget::Anonymous(_) = target {
            let index = match state.anonymous_mismatch {
                Some(index) => index,
                None => {
                    let text = format!(
                        "Anonymous hyperlink mismatch: {} references but {} targets.\n\
                         See \"backrefs\" attribute for IDs.",
                        self.anonymous_refs,
                        self.anonymous_targets.len()
                    );
                    let msg = self.message(Level::Error, &text, None)?;
                    state.messages.push(msg);
                    let index = state.messages.len() - 1;
                    state.anonymous_mismatch = Some(index);
                    index
                }
            };
            return Ok(self.link_problematic(&mut state.messages[index], raw));
        }

        let name = match target {
            RefTarget::Name(name) => name.as_str(),
            _ => raw,
        };
        let mut msg = self.message(
            Level::Error,
            &format!("Unknown target name: \"{name}\"."),
            None,
        )?;
        let problematic = self.link_problematic(&mut msg, raw);
        state.messages.push(msg);
        Ok(problematic)
    }
}

/// Point `reference` at its note and record the backlink.
fn resolve_note(reference: &mut NoteReference, notes: &mut Notes) -> Result<(), String> {
    let id = notes.lookup(&reference.label)?;
    reference.text = match &reference.label {
        NoteLabel::Citation(text) => text.clone(),
        _ => notes.labels.get(&id).cloned().unwrap_or_default(),
    };
    notes
        .backrefs
        .entry(id.clone())
        .or_default()
        .push(reference.id.clone());
    reference.refid = Some(id);
    Ok(())
}

/// Give every note its displayed label and backlinks.
fn fill_notes(nodes: &mut [Node], notes: &mut Notes) {
    for node in nodes {
        match node {
            Node::Note(note) => {
                note.text = notes.labels.get(&note.id).cloned().unwrap_or_default();
                note.backrefs = notes.backrefs.remove(&note.id).unwrap_or_default();
                fill_notes(&mut note.children, notes);
            }
            Node::Section(section) => fill_notes(&mut section.children, notes),
            Node::BulletList(items) => {
                for item in items {
                    fill_notes(item, notes);
                }
            }
            Node::EnumeratedList(list) => {
                for item in &mut list.items {
                    fill_notes(item, notes);
                }
            }
            Node::DefinitionList(items) => {
                for item in items {
                    fill_notes(&mut item.definition, notes);
                }
            }
            Node::BlockQuote(children) => fill_notes(children, notes),
            Node::Admonition(admonition) => fill_notes(&mut admonition.children, notes),
            _ => {}
        }
    }
}

fn is_prebibliographic(node: &Node) -> bool {
    matches!(
        node,
        Node::Comment(_) | Node::SystemMessage(_) | Node::Target { .. }
    )
}

/// Remove and return the only section of `children`, when nothing but
/// comments, targets and messages surround it.
fn take_lone_section(children: &mut Vec<Node>) -> Option<Section> {
    let index = children.iter().position(|n| !is_prebibliographic(n))?;
    if index + 1 != children.len() || !matches!(children[index], Node::Section(_)) {
        return None;
    }
    match children.remove(index) {
        Node::Section(section) => Some(section),
        _ => None,
    }
}

/// Promote a lone top-level section to the document title, and then a lone
/// subsection to the subtitle.
fn promote_titles(document: &mut Document) {
    let Some(section) = take_lone_section(&mut document.children) else {
        return;
    };
    document.title = Some(Title {
        ids: section.ids,
        children: section.title,
    });
    document.children.extend(section.children);

    if let Some(section) = take_lone_section(&mut document.children) {
        document.subtitle = Some(Title {
            ids: section.ids,
            children: section.title,
        });
        document.children.extend(section.children);
    }
}
