//! Block-level parsing.

use std::sync::LazyLock;

use regex::Regex;

use super::{DocumentParser, Line, MAX_INCLUDE_DEPTH, note_label, split_lines};
use crate::directive::{DirectiveArgs, DirectiveContext, DirectiveOutput};
use crate::error::EngineError;
use crate::nodes::{
    DefinitionItem, EnumType, EnumeratedList, Node, Note, NoteLabel, RefTarget, Section, astext,
};
use crate::reporter::Level;
use crate::util::{column_width, indent_of, normalize_name};

static ENUMERATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\(([0-9]+|[A-Za-z]|#)\)|([0-9]+|[A-Za-z]|#)([.)]))( +|$)").unwrap()
});

static TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^_(?:`((?:[^`\\]|\\.)+)`|((?:[^:\\]|\\.)+)):(?:\s+(.*))?$").unwrap()
});

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9](?:[-_.+:]?[A-Za-z0-9])*)\s*::(?:\s+(.*))?$").unwrap()
});

static NOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]\s]+)\](?:\s+(.*))?$").unwrap());

static SUBSTITUTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|[^|\s](?:[^|]*[^|\s])?\|(?:\s|$)").unwrap());

const ADORNMENT_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Section tree under construction: closed content plus the open sections.
#[derive(Default)]
struct SectionTree {
    root: Vec<Node>,
    open: Vec<Section>,
}

impl SectionTree {
    fn push(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(section) => section.children.push(node),
            None => self.root.push(node),
        }
    }

    fn extend(&mut self, nodes: impl IntoIterator<Item = Node>) {
        for node in nodes {
            self.push(node);
        }
    }

    fn depth(&self) -> usize {
        self.open.len()
    }

    fn close_to(&mut self, depth: usize) {
        while self.open.len() > depth {
            if let Some(section) = self.open.pop() {
                self.push(Node::Section(section));
            }
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.close_to(0);
        self.root
    }
}

enum TitleMatch {
    Title {
        text: String,
        style: (char, bool),
        text_line: usize,
        consumed: usize,
        /// Underline (or overline) shorter than the title text.
        short_line: Option<usize>,
    },
    Malformed {
        message: &'static str,
        consumed: usize,
    },
}

enum Enumerator {
    Arabic(usize),
    Alpha(char),
    Auto,
}

struct EnumMarker {
    value: Enumerator,
    /// `1.`, `1)` or `(1)`.
    format: u8,
    offset: usize,
}

fn is_adornment(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    ADORNMENT_CHARS.contains(first) && chars.all(|c| c == first)
}

fn match_title(lines: &[Line], i: usize) -> Option<TitleMatch> {
    let first = &lines[i].text;
    let next = lines.get(i + 1).filter(|l| !l.is_blank());

    if is_adornment(first) && first.len() >= 4 {
        let text_line = next?;
        let Some(under) = lines.get(i + 2).filter(|l| is_adornment(&l.text)) else {
            return Some(TitleMatch::Malformed {
                message: "Missing matching underline for section title overline.",
                consumed: 2,
            });
        };
        if under.text != *first {
            return Some(TitleMatch::Malformed {
                message: "Title overline & underline mismatch.",
                consumed: 3,
            });
        }
        let text = text_line.text.trim().to_owned();
        let width = column_width(&text);
        let ch = first.chars().next().unwrap_or('=');
        return Some(TitleMatch::Title {
            short_line: (first.len() < width).then_some(lines[i].lineno),
            text,
            style: (ch, true),
            text_line: text_line.lineno,
            consumed: 3,
        });
    }

    let under = next.filter(|l| is_adornment(&l.text))?;
    if indent_of(first) > 0 || is_adornment(first) {
        return None;
    }
    let text = first.trim().to_owned();
    let width = column_width(&text);
    let len = under.text.len();
    if len < width && len < 4 {
        return None;
    }
    let ch = under.text.chars().next().unwrap_or('=');
    Some(TitleMatch::Title {
        short_line: (len < width).then_some(under.lineno),
        text,
        style: (ch, false),
        text_line: lines[i].lineno,
        consumed: 2,
    })
}

fn is_transition(lines: &[Line], i: usize) -> bool {
    let text = &lines[i].text;
    is_adornment(text) && text.len() >= 4 && lines.get(i + 1).is_none_or(Line::is_blank)
}

/// An unindented line directly followed by indented text starts a
/// definition list item.
fn is_term(lines: &[Line], i: usize) -> bool {
    let line = &lines[i];
    !line.is_blank()
        && indent_of(&line.text) == 0
        && lines
            .get(i + 1)
            .is_some_and(|next| !next.is_blank() && indent_of(&next.text) > 0)
}

fn bullet_marker(text: &str) -> Option<(char, usize)> {
    let bullet = text.chars().next()?;
    if !matches!(bullet, '-' | '*' | '+' | '•' | '‣' | '⁃') {
        return None;
    }
    let rest = &text[bullet.len_utf8()..];
    if rest.is_empty() {
        return Some((bullet, bullet.len_utf8() + 1));
    }
    let spaces = indent_of(rest);
    (spaces > 0).then_some((bullet, bullet.len_utf8() + spaces))
}

fn enum_marker(text: &str) -> Option<EnumMarker> {
    let caps = ENUMERATOR_RE.captures(text)?;
    let (token, format) = match (caps.get(1), caps.get(2), caps.get(3)) {
        (Some(token), _, _) => (token.as_str(), 2),
        (None, Some(token), Some(suffix)) => (token.as_str(), u8::from(suffix.as_str() == ")")),
        _ => return None,
    };
    let value = if token == "#" {
        Enumerator::Auto
    } else if let Ok(n) = token.parse() {
        Enumerator::Arabic(n)
    } else {
        Enumerator::Alpha(token.chars().next()?)
    };
    let spaces = caps.get(4).map_or(0, |m| m.as_str().len());
    Some(EnumMarker {
        value,
        format,
        offset: caps[0].len() + usize::from(spaces == 0),
    })
}

/// End of an indented block starting at `start`: blank lines and lines
/// indented at least `min_indent`, without trailing blank lines.
fn indented_end(lines: &[Line], start: usize, min_indent: usize) -> usize {
    let mut end = start;
    while end < lines.len() && (lines[end].is_blank() || indent_of(&lines[end].text) >= min_indent) {
        end += 1;
    }
    while end > start && lines[end - 1].is_blank() {
        end -= 1;
    }
    end
}

/// Remove the common indentation of `lines`.
fn dedent(lines: &[Line]) -> Vec<Line> {
    let indent = lines
        .iter()
        .filter(|l| !l.is_blank())
        .map(|l| indent_of(&l.text))
        .min()
        .unwrap_or(0);
    strip_indent(lines, indent)
}

fn strip_indent(lines: &[Line], indent: usize) -> Vec<Line> {
    lines
        .iter()
        .map(|l| Line {
            text: l.text.get(indent..).unwrap_or("").to_owned(),
            ..l.clone()
        })
        .collect()
}

fn block_text(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

impl DocumentParser<'_> {
    /// Parse body elements.
    ///
    /// Section titles are only allowed when `nested` is false.
    pub(crate) fn parse_blocks(
        &mut self,
        mut lines: Vec<Line>,
        nested: bool,
    ) -> Result<Vec<Node>, EngineError> {
        let mut tree = SectionTree::default();
        let mut i = 0;

        while i < lines.len() {
            if lines[i].is_blank() {
                i += 1;
                continue;
            }

            if indent_of(&lines[i].text) > 0 {
                let end = indented_end(&lines, i, 1);
                let children = self.parse_blocks(dedent(&lines[i..end]), true)?;
                tree.push(Node::BlockQuote(children));
                i = end;
                continue;
            }

            if let Some(title) = match_title(&lines, i) {
                i = self.section_title(&mut tree, &lines, i, title, nested)?;
                continue;
            }

            if is_transition(&lines, i) {
                tree.push(Node::Transition);
                i += 1;
                continue;
            }

            let text = &lines[i].text;
            if text == ".." || text.starts_with(".. ") {
                match self.explicit_markup(&lines, i)? {
                    Explicit::Nodes(nodes, end) => {
                        tree.extend(nodes);
                        i = end;
                    }
                    Explicit::Include(included, end) => {
                        let _replaced: Vec<Line> = lines.splice(i..end, included).collect();
                    }
                }
                continue;
            }

            if bullet_marker(text).is_some() {
                i = self.bullet_list(&mut tree, &lines, i)?;
                continue;
            }

            if let Some(end) = self.enumerated_list(&mut tree, &lines, i)? {
                i = end;
                continue;
            }

            if is_term(&lines, i) {
                i = self.definition_list(&mut tree, &lines, i)?;
                continue;
            }

            i = self.paragraph(&mut tree, &lines, i)?;
        }

        Ok(tree.finish())
    }

    fn section_title(
        &mut self,
        tree: &mut SectionTree,
        lines: &[Line],
        i: usize,
        title: TitleMatch,
        nested: bool,
    ) -> Result<usize, EngineError> {
        let lineno = lines[i].lineno;
        let (text, style, text_line, consumed, short_line) = match title {
            TitleMatch::Title {
                text,
                style,
                text_line,
                consumed,
                short_line,
            } => (text, style, text_line, consumed, short_line),
            TitleMatch::Malformed { message, consumed } => {
                let msg = self
                    .message(Level::Severe, message, Some(lineno))?
                    .with_details(block_text(&lines[i..i + consumed]));
                tree.push(Node::SystemMessage(msg));
                return Ok(i + consumed);
            }
        };
        let source = block_text(&lines[i..i + consumed]);

        if nested {
            let msg = self
                .message(Level::Severe, "Unexpected section title.", Some(text_line))?
                .with_details(source);
            tree.push(Node::SystemMessage(msg));
            return Ok(i + consumed);
        }

        let depth = tree.depth();
        let level = match self.title_styles.iter().position(|s| *s == style) {
            Some(index) => Some(index + 1),
            None if self.title_styles.len() == depth => {
                self.title_styles.push(style);
                Some(depth + 1)
            }
            None => None,
        };
        let Some(level) = level.filter(|level| *level <= depth + 1) else {
            let msg = self
                .message(Level::Severe, "Title level inconsistent:", Some(text_line))?
                .with_details(source);
            tree.push(Node::SystemMessage(msg));
            return Ok(i + consumed);
        };

        let mut children = Vec::new();
        if let Some(line) = short_line {
            let msg = self
                .message(Level::Warning, "Title underline too short.", Some(line))?
                .with_details(source);
            children.push(Node::SystemMessage(msg));
        }
        let (title, messages) = self.parse_inline(&text, text_line)?;
        children.extend(messages);

        let name = normalize_name(&astext(&title));
        let id = self.ids.claim(&name);
        self.add_implicit_target(name, &id);
        tracing::trace!(id = %id, level, "Opened section");

        tree.close_to(level - 1);
        tree.open.push(Section {
            ids: vec![id],
            title,
            children,
        });
        Ok(i + consumed)
    }

    fn paragraph(
        &mut self,
        tree: &mut SectionTree,
        lines: &[Line],
        start: usize,
    ) -> Result<usize, EngineError> {
        let mut end = start;
        while end < lines.len() && !lines[end].is_blank() && indent_of(&lines[end].text) == 0 {
            end += 1;
        }

        let mut text = lines[start..end]
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let literal_next = text.ends_with("::");
        if literal_next {
            if text == "::" {
                text.clear();
            } else if text[..text.len() - 2].ends_with(char::is_whitespace) {
                text.truncate(text[..text.len() - 2].trim_end().len());
            } else {
                text.pop();
            }
        }

        if !text.is_empty() {
            let (inlines, messages) = self.parse_inline(&text, lines[start].lineno)?;
            tree.push(Node::Paragraph(inlines));
            tree.extend(messages);
        }

        if literal_next {
            return self.literal_block(tree, lines, end);
        }
        if let Some(next) = lines.get(end).filter(|l| !l.is_blank()) {
            let msg = self.message(Level::Error, "Unexpected indentation.", Some(next.lineno))?;
            tree.push(Node::SystemMessage(msg));
        }
        Ok(end)
    }

    fn literal_block(
        &mut self,
        tree: &mut SectionTree,
        lines: &[Line],
        start: usize,
    ) -> Result<usize, EngineError> {
        let mut i = start;
        while lines.get(i).is_some_and(Line::is_blank) {
            i += 1;
        }
        match lines.get(i) {
            Some(line) if indent_of(&line.text) > 0 => {
                let end = indented_end(lines, i, 1);
                tree.push(Node::LiteralBlock {
                    text: block_text(&dedent(&lines[i..end])),
                    language: None,
                });
                Ok(end)
            }
            other => {
                let line = other.or_else(|| lines.last()).map(|l| l.lineno);
                let msg =
                    self.message(Level::Warning, "Literal block expected; none found.", line)?;
                tree.push(Node::SystemMessage(msg));
                Ok(start)
            }
        }
    }

    fn bullet_list(
        &mut self,
        tree: &mut SectionTree,
        lines: &[Line],
        start: usize,
    ) -> Result<usize, EngineError> {
        let Some((bullet, _)) = bullet_marker(&lines[start].text) else {
            return Ok(start + 1);
        };
        let mut items = Vec::new();
        let mut i = start;
        let mut unindent = None;

        loop {
            let Some((_, offset)) = bullet_marker(&lines[i].text).filter(|(b, _)| *b == bullet)
            else {
                break;
            };
            let end = indented_end(lines, i + 1, offset);
            items.push(self.list_item(lines, i, end, offset)?);
            i = end;

            let mut next = i;
            while lines.get(next).is_some_and(Line::is_blank) {
                next += 1;
            }
            match lines.get(next) {
                Some(line) if bullet_marker(&line.text).is_some_and(|(b, _)| b == bullet) => {
                    i = next;
                }
                Some(line) if next == i => {
                    unindent = Some(line.lineno);
                    break;
                }
                _ => break,
            }
        }

        tree.push(Node::BulletList(items));
        if let Some(line) = unindent {
            let msg = self.message(
                Level::Warning,
                "Bullet list ends without a blank line; unexpected unindent.",
                Some(line),
            )?;
            tree.push(Node::SystemMessage(msg));
        }
        Ok(i)
    }

    fn list_item(
        &mut self,
        lines: &[Line],
        start: usize,
        end: usize,
        offset: usize,
    ) -> Result<Vec<Node>, EngineError> {
        let first = &lines[start];
        let mut item = vec![Line {
            text: first.text.get(offset..).unwrap_or("").to_owned(),
            ..first.clone()
        }];
        item.extend(strip_indent(&lines[start + 1..end], offset));
        self.parse_blocks(item, true)
    }

    fn enumerated_list(
        &mut self,
        tree: &mut SectionTree,
        lines: &[Line],
        start: usize,
    ) -> Result<Option<usize>, EngineError> {
        let Some(first) = enum_marker(&lines[start].text) else {
            return Ok(None);
        };
        let (enumtype, mut ordinal) = match first.value {
            Enumerator::Arabic(n) => (EnumType::Arabic, n),
            Enumerator::Auto => (EnumType::Arabic, 1),
            Enumerator::Alpha(c) if c.is_ascii_lowercase() => (EnumType::LowerAlpha, alpha_ordinal(c)),
            Enumerator::Alpha(c) => (EnumType::UpperAlpha, alpha_ordinal(c)),
        };
        let follows = |ordinal: usize, line: &Line| {
            enum_marker(&line.text).is_some_and(|m| {
                m.format == first.format
                    && match m.value {
                        Enumerator::Auto => true,
                        Enumerator::Arabic(n) => enumtype == EnumType::Arabic && n == ordinal + 1,
                        Enumerator::Alpha(c) => {
                            enumtype != EnumType::Arabic
                                && c.is_ascii_lowercase() == (enumtype == EnumType::LowerAlpha)
                                && alpha_ordinal(c) == ordinal + 1
                        }
                    }
            })
        };

        // A lone enumerator followed by unindented text is an ordinary paragraph.
        if let Some(next) = lines.get(start + 1) {
            if !next.is_blank() && indent_of(&next.text) == 0 && !follows(ordinal, next) {
                return Ok(None);
            }
        }

        let list_start = ordinal;
        let mut items = Vec::new();
        let mut i = start;
        let mut unindent = None;
        loop {
            let Some(marker) = enum_marker(&lines[i].text) else {
                break;
            };
            let end = indented_end(lines, i + 1, marker.offset);
            items.push(self.list_item(lines, i, end, marker.offset)?);
            i = end;

            let mut next = i;
            while lines.get(next).is_some_and(Line::is_blank) {
                next += 1;
            }
            match lines.get(next) {
                Some(line) if follows(ordinal, line) => {
                    ordinal += 1;
                    i = next;
                }
                Some(line) if next == i => {
                    unindent = Some(line.lineno);
                    break;
                }
                _ => break,
            }
        }

        tree.push(Node::EnumeratedList(EnumeratedList {
            enumtype,
            start: list_start,
            items,
        }));
        if let Some(line) = unindent {
            let msg = self.message(
                Level::Warning,
                "Enumerated list ends without a blank line; unexpected unindent.",
                Some(line),
            )?;
            tree.push(Node::SystemMessage(msg));
        }
        Ok(Some(i))
    }

    fn definition_list(
        &mut self,
        tree: &mut SectionTree,
        lines: &[Line],
        start: usize,
    ) -> Result<usize, EngineError> {
        let mut items = Vec::new();
        let mut messages = Vec::new();
        let mut i = start;
        let mut unindent = None;

        loop {
            let line = &lines[i];
            if line.text.ends_with("::") {
                let msg = self.message(
                    Level::Info,
                    "Blank line missing before literal block (after the \"::\")? \
                     Interpreted as a definition list item.",
                    Some(lines[i + 1].lineno),
                )?;
                messages.push(Node::SystemMessage(msg));
            }

            let mut parts = line.text.split(" : ");
            let (term, term_messages) = self.parse_inline(parts.next().unwrap_or(""), line.lineno)?;
            messages.extend(term_messages);
            let mut classifiers = Vec::new();
            for classifier in parts {
                let (inlines, classifier_messages) =
                    self.parse_inline(classifier.trim(), line.lineno)?;
                classifiers.push(inlines);
                messages.extend(classifier_messages);
            }

            let end = indented_end(lines, i + 1, 1);
            let definition = self.parse_blocks(dedent(&lines[i + 1..end]), true)?;
            items.push(DefinitionItem {
                term,
                classifiers,
                definition,
            });
            i = end;

            let mut next = i;
            while lines.get(next).is_some_and(Line::is_blank) {
                next += 1;
            }
            match lines.get(next) {
                Some(_) if is_term(lines, next) => i = next,
                Some(line) if next == i => {
                    unindent = Some(line.lineno);
                    break;
                }
                _ => break,
            }
        }

        tree.push(Node::DefinitionList(items));
        tree.extend(messages);
        if let Some(line) = unindent {
            let msg = self.message(
                Level::Warning,
                "Definition list ends without a blank line; unexpected unindent.",
                Some(line),
            )?;
            tree.push(Node::SystemMessage(msg));
        }
        Ok(i)
    }

    fn explicit_markup(&mut self, lines: &[Line], start: usize) -> Result<Explicit, EngineError> {
        let first = &lines[start];
        let rest = first.text.get(2..).unwrap_or("").trim();

        // An empty comment does not absorb the block that follows it.
        if rest.is_empty() && lines.get(start + 1).is_none_or(Line::is_blank) {
            return Ok(Explicit::Nodes(vec![Node::Comment(String::new())], start + 1));
        }

        let end = indented_end(lines, start + 1, 1);
        let body = dedent(&lines[start + 1..end]);

        if let Some(caps) = TARGET_RE.captures(rest) {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            let mut uri: String = caps.get(3).map_or("", |m| m.as_str()).to_owned();
            for line in &body {
                uri.push_str(line.text.trim());
            }
            let nodes = self.target(name, &uri, first.lineno)?;
            return Ok(Explicit::Nodes(nodes, end));
        }

        if let Some(caps) = NOTE_RE.captures(rest) {
            if let Some(label) = note_label(&caps[1]) {
                let first_text = caps.get(2).map_or("", |m| m.as_str());
                return self.note(label, first_text, lines, start, end, body);
            }
        }

        if SUBSTITUTION_RE.is_match(rest) {
            let msg = self
                .message(
                    Level::Error,
                    "Substitution definitions are not supported.",
                    Some(first.lineno),
                )?
                .with_details(block_text(&lines[start..end]));
            return Ok(Explicit::Nodes(vec![Node::SystemMessage(msg)], end));
        }

        if let Some(caps) = DIRECTIVE_RE.captures(rest) {
            let name = caps[1].to_lowercase();
            let arguments = caps.get(2).map_or("", |m| m.as_str().trim());
            return self.directive(&name, arguments, lines, start, end, &body);
        }

        let mut text = vec![rest.to_owned()];
        text.extend(body.iter().map(|l| l.text.clone()));
        let text = text.join("\n").trim_matches('\n').to_owned();
        Ok(Explicit::Nodes(vec![Node::Comment(text)], end))
    }

    fn note(
        &mut self,
        label: NoteLabel,
        first_text: &str,
        lines: &[Line],
        start: usize,
        end: usize,
        body: Vec<Line>,
    ) -> Result<Explicit, EngineError> {
        let line = lines[start].lineno;
        let mut nodes = Vec::new();
        let key = label.key();
        if let Some(key) = &key {
            if self.notes.iter().any(|(known, _)| known.key().as_ref() == Some(key)) {
                let msg = self.message(
                    Level::Warning,
                    &format!("Duplicate explicit target name: \"{key}\"."),
                    Some(line),
                )?;
                nodes.push(Node::SystemMessage(msg));
            }
        }

        let id = match (&label, &key) {
            (NoteLabel::AutoNamed(_) | NoteLabel::Citation(_), Some(key)) => self.ids.claim(key),
            _ => self.ids.auto(),
        };
        tracing::trace!(id = %id, line, "Registered note");
        self.notes.push((label.clone(), id.clone()));

        let mut item = Vec::new();
        if !first_text.is_empty() {
            item.push(Line {
                text: first_text.to_owned(),
                ..lines[start].clone()
            });
        }
        item.extend(body);
        let children = self.parse_blocks(item, true)?;
        nodes.insert(
            0,
            Node::Note(Note {
                id,
                label,
                text: String::new(),
                backrefs: Vec::new(),
                children,
            }),
        );
        Ok(Explicit::Nodes(nodes, end))
    }

    fn target(&mut self, name: &str, uri: &str, line: usize) -> Result<Vec<Node>, EngineError> {
        let uri: String = uri.split_whitespace().collect();
        if name == "_" {
            self.anonymous_targets.push(uri);
            return Ok(Vec::new());
        }

        let name = normalize_name(&super::inline::unescape(name));
        let (target, node) = if uri.is_empty() {
            let id = self.ids.claim(&name);
            (RefTarget::Id(id.clone()), Some(Node::Target { id }))
        } else if let Some(alias) = uri.strip_suffix('_').filter(|a| !a.ends_with('\\')) {
            let alias = alias.trim_matches('`');
            (RefTarget::Name(normalize_name(alias)), None)
        } else {
            (RefTarget::Uri(super::inline::unescape(&uri)), None)
        };

        let mut nodes: Vec<Node> = node.into_iter().collect();
        if let Some(msg) = self.add_explicit_target(name, target, line)? {
            nodes.push(Node::SystemMessage(msg));
        }
        Ok(nodes)
    }

    fn directive(
        &mut self,
        name: &str,
        arguments: &str,
        lines: &[Line],
        start: usize,
        end: usize,
        body: &[Line],
    ) -> Result<Explicit, EngineError> {
        let publisher = self.publisher;
        let line = lines[start].lineno;
        let depth = lines[start].depth;
        let source = block_text(&lines[start..end]);

        let Some(directive) = publisher.directive(name) else {
            let msg = self
                .message(
                    Level::Error,
                    &format!("Unknown directive type \"{name}\"."),
                    Some(line),
                )?
                .with_details(source);
            return Ok(Explicit::Nodes(vec![Node::SystemMessage(msg)], end));
        };

        let args = DirectiveArgs::parse(directive.as_ref(), name, arguments, body, line);
        if !directive.has_content() && !args.content.is_empty() {
            let msg = self
                .message(
                    Level::Error,
                    &format!("Error in \"{name}\" directive:\nno content permitted."),
                    Some(line),
                )?
                .with_details(source);
            return Ok(Explicit::Nodes(vec![Node::SystemMessage(msg)], end));
        }

        tracing::trace!(directive = %name, line, "Running directive");
        let mut ctx = DirectiveContext::new(self, line, source, depth);
        match directive.run(args, &mut ctx)? {
            DirectiveOutput::Nodes(nodes) => Ok(Explicit::Nodes(nodes, end)),
            DirectiveOutput::Include(text) => {
                if depth >= MAX_INCLUDE_DEPTH {
                    let msg = self.message(
                        Level::Severe,
                        &format!("Maximum include depth ({MAX_INCLUDE_DEPTH}) exceeded."),
                        Some(line),
                    )?;
                    return Ok(Explicit::Nodes(vec![Node::SystemMessage(msg)], end));
                }
                let included = split_lines(&text, 1, depth + 1, self.settings.tab_width);
                Ok(Explicit::Include(included, end))
            }
        }
    }
}

enum Explicit {
    /// Nodes to insert, and the index after the construct.
    Nodes(Vec<Node>, usize),
    /// Lines replacing the construct, and the index after it.
    Include(Vec<Line>, usize),
}

fn alpha_ordinal(c: char) -> usize {
    (c.to_ascii_lowercase() as usize) - ('a' as usize) + 1
}
