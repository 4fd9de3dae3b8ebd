//! Inline markup recognition.
//!
//! Start-strings must follow whitespace, the start of the text or an opening
//! punctuation character, and must be followed by non-whitespace. End-strings
//! must follow non-whitespace and be followed by whitespace, the end of the
//! text or closing punctuation. A backslash escapes the next character.

use std::sync::LazyLock;

use regex::Regex;

use super::{DocumentParser, note_label};
use crate::error::EngineError;
use crate::nodes::{Inline, Node, NoteReference, RefTarget};
use crate::reporter::Level;
use crate::role::{DEFAULT_ROLE, RoleContext};
use crate::util::normalize_name;

static ROLE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([A-Za-z0-9](?:[-_.+:]?[A-Za-z0-9])*):`").unwrap());

static ROLE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([A-Za-z0-9](?:[-_.+:]?[A-Za-z0-9])*):").unwrap());

static EMBEDDED_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.*?)\s*<([^<>]+)>$").unwrap());

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(?:(?:https?|ftp)://|mailto:)[^\s<>"]+"#).unwrap());

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+").unwrap()
});

static SIMPLE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9]+(?:[-._+:][A-Za-z0-9]+)*)(__?)").unwrap()
});

static NOTE_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]\s]+)\]_").unwrap());

const OPENERS: &[char] = &['\'', '"', '(', '[', '{', '<', '-', '/', ':', '‘', '“', '«'];

const FOLLOWERS: &[char] = &[
    '\'', '"', ')', ']', '}', '>', '-', '/', ':', '.', ',', ';', '!', '?', '\\', '’', '”', '»',
];

const URI_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '\'', '"'];

/// Remove escaping backslashes. An escaped whitespace character disappears.
pub(crate) fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) if next.is_whitespace() => {}
                Some(next) => out.push(next),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn prev_char(text: &str, i: usize) -> Option<char> {
    text[..i].chars().next_back()
}

fn next_char(text: &str, i: usize) -> Option<char> {
    text.get(i..).and_then(|s| s.chars().next())
}

fn is_escaped(text: &str, i: usize) -> bool {
    let backslashes = text.as_bytes()[..i]
        .iter()
        .rev()
        .take_while(|b| **b == b'\\')
        .count();
    backslashes % 2 == 1
}

fn start_ok(text: &str, i: usize) -> bool {
    prev_char(text, i).is_none_or(|c| c.is_whitespace() || OPENERS.contains(&c))
}

/// Whether the character after a start-string may begin inline content.
fn content_ok(text: &str, start: usize, after: usize) -> bool {
    let Some(next) = next_char(text, after) else {
        return false;
    };
    if next.is_whitespace() {
        return false;
    }
    prev_char(text, start).is_none_or(|open| !is_pair(open, next))
}

fn is_pair(open: char, close: char) -> bool {
    matches!(
        (open, close),
        ('\'', '\'')
            | ('"', '"')
            | ('(', ')')
            | ('[', ']')
            | ('{', '}')
            | ('<', '>')
            | ('‘', '’')
            | ('“', '”')
            | ('«', '»')
    )
}

fn end_ok(text: &str, j: usize) -> bool {
    next_char(text, j).is_none_or(|c| c.is_whitespace() || FOLLOWERS.contains(&c))
}

/// Position of a valid end-string `delim` at or after `from`.
fn find_end(text: &str, from: usize, delim: &str, escapable: bool) -> Option<usize> {
    let mut search = from;
    while let Some(offset) = text[search..].find(delim) {
        let k = search + offset;
        let before_ok = k > from && prev_char(text, k).is_some_and(|c| !c.is_whitespace());
        if before_ok && !(escapable && is_escaped(text, k)) && end_ok(text, k + delim.len()) {
            return Some(k);
        }
        search = k + 1;
    }
    None
}

fn push_text(out: &mut Vec<Inline>, raw: &str) {
    let text = unescape(raw);
    if !text.is_empty() {
        out.push(Inline::Text(text));
    }
}

/// Recognized markup: nodes and the index just past it.
type Matched = Option<(Vec<Inline>, usize)>;

impl DocumentParser<'_> {
    /// Parse inline markup in `text`, which starts on line `line`.
    ///
    /// Returns the inline nodes and the system messages raised, which callers
    /// place after the element holding the text.
    pub(crate) fn parse_inline(
        &mut self,
        text: &str,
        line: usize,
    ) -> Result<(Vec<Inline>, Vec<Node>), EngineError> {
        let mut out = Vec::new();
        let mut messages = Vec::new();
        let mut pending = 0;
        let mut i = 0;

        while let Some(c) = next_char(text, i) {
            if c == '\\' {
                i += 1;
                if let Some(escaped) = next_char(text, i) {
                    i += escaped.len_utf8();
                }
                continue;
            }
            if (matches!(c, '*' | '`' | ':' | '[') || c.is_ascii_alphanumeric()) && start_ok(text, i)
            {
                let line = line + text[..i].matches('\n').count();
                if let Some((nodes, end)) = self.markup_at(text, i, line, &mut messages)? {
                    push_text(&mut out, &text[pending..i]);
                    out.extend(nodes);
                    i = end;
                    pending = end;
                    continue;
                }
            }
            i += c.len_utf8();
        }
        push_text(&mut out, &text[pending..]);
        Ok((out, messages))
    }

    fn markup_at(
        &mut self,
        text: &str,
        i: usize,
        line: usize,
        messages: &mut Vec<Node>,
    ) -> Result<Matched, EngineError> {
        let rest = &text[i..];

        if rest.starts_with("``") {
            if !content_ok(text, i, i + 2) {
                return Ok(None);
            }
            return match find_end(text, i + 2, "``", false) {
                Some(k) => Ok(Some((vec![Inline::Literal(text[i + 2..k].to_owned())], k + 2))),
                None => self.unterminated(text, i, 2, "literal", line, messages),
            };
        }

        if rest.starts_with("**") {
            if !content_ok(text, i, i + 2) {
                return Ok(None);
            }
            return match find_end(text, i + 2, "**", true) {
                Some(k) => {
                    let content = vec![Inline::Text(unescape(&text[i + 2..k]))];
                    Ok(Some((vec![Inline::Strong(content)], k + 2)))
                }
                None => self.unterminated(text, i, 2, "strong", line, messages),
            };
        }

        if rest.starts_with('*') {
            if !content_ok(text, i, i + 1) {
                return Ok(None);
            }
            return match find_end(text, i + 1, "*", true) {
                Some(k) => {
                    let content = vec![Inline::Text(unescape(&text[i + 1..k]))];
                    Ok(Some((vec![Inline::Emphasis(content)], k + 1)))
                }
                None => self.unterminated(text, i, 1, "emphasis", line, messages),
            };
        }

        if rest.starts_with('`') {
            return self.interpreted(text, i, i, None, line, messages);
        }

        if rest.starts_with('[') {
            return Ok(self.note_reference(text, i));
        }

        if rest.starts_with(':') {
            let Some(caps) = ROLE_PREFIX_RE.captures(rest) else {
                return Ok(None);
            };
            let tick = i + caps[0].len() - 1;
            let role = caps[1].to_owned();
            return self.interpreted(text, i, tick, Some(role), line, messages);
        }

        Ok(self.standalone(text, i))
    }

    /// Footnote or citation reference: `[1]_`, `[#]_`, `[#name]_`, `[*]_`,
    /// `[CIT2002]_`.
    fn note_reference(&mut self, text: &str, i: usize) -> Matched {
        let caps = NOTE_REF_RE.captures(&text[i..])?;
        let end = i + caps[0].len();
        if !end_ok(text, end) {
            return None;
        }
        let label = note_label(&caps[1])?;
        let reference = NoteReference {
            id: self.ids.auto(),
            label,
            text: String::new(),
            refid: None,
            raw: caps[0].to_owned(),
        };
        Some((vec![Inline::NoteReference(reference)], end))
    }

    /// Standalone URIs, email addresses and simple `name_` references.
    fn standalone(&mut self, text: &str, i: usize) -> Matched {
        let rest = &text[i..];

        if let Some(m) = URI_RE.find(rest) {
            let uri = m.as_str().trim_end_matches(URI_TRAILING);
            let scheme_only = uri.ends_with("://") || uri.ends_with(':');
            if !scheme_only {
                let reference = Inline::Reference {
                    children: vec![Inline::Text(uri.to_owned())],
                    target: RefTarget::Uri(uri.to_owned()),
                    raw: uri.to_owned(),
                };
                return Some((vec![reference], i + uri.len()));
            }
        }

        if let Some(m) = EMAIL_RE.find(rest) {
            if end_ok(text, i + m.end()) {
                let address = m.as_str();
                let reference = Inline::Reference {
                    children: vec![Inline::Text(address.to_owned())],
                    target: RefTarget::Uri(format!("mailto:{address}")),
                    raw: address.to_owned(),
                };
                return Some((vec![reference], i + m.end()));
            }
        }

        let caps = SIMPLE_REF_RE.captures(rest)?;
        let end = i + caps[0].len();
        if !end_ok(text, end) {
            return None;
        }
        let name = &caps[1];
        let target = if caps[2].len() == 2 {
            self.next_anonymous()
        } else {
            RefTarget::Name(normalize_name(name))
        };
        let reference = Inline::Reference {
            children: vec![Inline::Text(name.to_owned())],
            target,
            raw: caps[0].to_owned(),
        };
        Some((vec![reference], end))
    }

    /// Interpreted text or a phrase reference whose opening backtick is at
    /// `tick`. `start` is where the whole construct begins (before a prefix
    /// role, if any).
    fn interpreted(
        &mut self,
        text: &str,
        start: usize,
        tick: usize,
        prefix_role: Option<String>,
        line: usize,
        messages: &mut Vec<Node>,
    ) -> Result<Matched, EngineError> {
        let content_start = tick + 1;
        if !content_ok(text, start, content_start) {
            return Ok(None);
        }

        let mut search = content_start;
        while let Some(offset) = text[search..].find('`') {
            let k = search + offset;
            search = k + 1;
            let closes = k > content_start
                && prev_char(text, k).is_some_and(|c| !c.is_whitespace())
                && !is_escaped(text, k);
            if !closes {
                continue;
            }
            let content = &text[content_start..k];
            let after = k + 1;
            let tail = &text[after..];

            if prefix_role.is_none() {
                if tail.starts_with("__") && end_ok(text, after + 2) {
                    let raw = &text[start..after + 2];
                    return Ok(Some((vec![self.phrase_reference(content, raw, true)], after + 2)));
                }
                if tail.starts_with('_') && !tail.starts_with("__") && end_ok(text, after + 1) {
                    let raw = &text[start..after + 1];
                    return Ok(Some((vec![self.phrase_reference(content, raw, false)], after + 1)));
                }
                if let Some(caps) = ROLE_SUFFIX_RE.captures(tail) {
                    let end = after + caps[0].len();
                    if end_ok(text, end) {
                        let raw = &text[start..end];
                        let nodes = self.role(&caps[1], raw, content, line, messages)?;
                        return Ok(Some((nodes, end)));
                    }
                }
            }

            if end_ok(text, after) {
                let raw = &text[start..after];
                let role = prefix_role.as_deref().unwrap_or(DEFAULT_ROLE);
                let nodes = self.role(role, raw, content, line, messages)?;
                return Ok(Some((nodes, after)));
            }
        }

        self.unterminated(
            text,
            start,
            content_start - start,
            "interpreted text or phrase reference",
            line,
            messages,
        )
    }

    fn role(
        &mut self,
        name: &str,
        raw: &str,
        content: &str,
        line: usize,
        messages: &mut Vec<Node>,
    ) -> Result<Vec<Inline>, EngineError> {
        let publisher = self.publisher;
        let Some(role) = publisher.role(&name.to_lowercase()) else {
            let mut msg = self.message(
                Level::Error,
                &format!("Unknown interpreted text role \"{name}\"."),
                Some(line),
            )?;
            let problematic = self.link_problematic(&mut msg, raw);
            messages.push(Node::SystemMessage(msg));
            return Ok(vec![problematic]);
        };
        let ctx = RoleContext {
            name,
            rawtext: raw,
            line,
            settings: self.settings,
        };
        role.run(&unescape(content), &ctx)
    }

    fn phrase_reference(&mut self, content: &str, raw: &str, anonymous: bool) -> Inline {
        if let Some(caps) = EMBEDDED_URI_RE.captures(content) {
            let embedded = &caps[2];
            let mut label = unescape(caps[1].trim());
            let alias = embedded
                .strip_suffix('_')
                .filter(|a| !a.ends_with('\\'));
            let target = match alias {
                Some(alias) => RefTarget::Name(normalize_name(&unescape(alias.trim_matches('`')))),
                None => RefTarget::Uri(unescape(&embedded.split_whitespace().collect::<String>())),
            };
            if label.is_empty() {
                label = match &target {
                    RefTarget::Uri(uri) => uri.clone(),
                    _ => unescape(embedded),
                };
            }
            if !anonymous {
                let name = normalize_name(&label);
                self.explicit_targets.entry(name).or_insert_with(|| target.clone());
            }
            return Inline::Reference {
                children: vec![Inline::Text(label)],
                target,
                raw: raw.to_owned(),
            };
        }

        let label = unescape(content);
        let target = if anonymous {
            self.next_anonymous()
        } else {
            RefTarget::Name(normalize_name(&label))
        };
        Inline::Reference {
            children: vec![Inline::Text(label)],
            target,
            raw: raw.to_owned(),
        }
    }

    fn next_anonymous(&mut self) -> RefTarget {
        let index = self.anonymous_refs;
        self.anonymous_refs += 1;
        RefTarget::Anonymous(index)
    }

    /// Report a start-string without end-string and mark it problematic.
    fn unterminated(
        &mut self,
        text: &str,
        i: usize,
        len: usize,
        kind: &str,
        line: usize,
        messages: &mut Vec<Node>,
    ) -> Result<Matched, EngineError> {
        let mut msg = self.message(
            Level::Warning,
            &format!("Inline {kind} start-string without end-string."),
            Some(line),
        )?;
        let problematic = self.link_problematic(&mut msg, &text[i..i + len]);
        messages.push(Node::SystemMessage(msg));
        Ok(Some((vec![problematic], i + len)))
    }
}
