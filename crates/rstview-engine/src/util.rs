//! Text helpers shared by the parser and the writers.

use std::collections::HashSet;

use unicode_width::UnicodeWidthStr;

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Convert a reference name into an element id.
///
/// Lowercases, collapses runs of other characters into single hyphens and
/// strips anything that cannot start an id.
#[must_use]
pub fn make_id(name: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if result.is_empty() && c.is_ascii_digit() {
                continue;
            }
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Normalize a reference name: collapse whitespace and lowercase.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Display columns of `s`: wide characters take two, combining marks none.
pub(crate) fn column_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Allocator for element ids unique within one document.
#[derive(Debug, Default)]
pub struct Ids {
    used: HashSet<String>,
    counter: usize,
}

impl Ids {
    /// Next free automatic id (`id1`, `id2`, ...).
    pub fn auto(&mut self) -> String {
        loop {
            self.counter += 1;
            let id = format!("id{}", self.counter);
            if self.used.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Id derived from `name`, falling back to an automatic id when the name
    /// yields nothing usable or is already taken.
    pub fn claim(&mut self, name: &str) -> String {
        let id = make_id(name);
        if id.is_empty() || !self.used.insert(id.clone()) {
            return self.auto();
        }
        id
    }
}

/// Expand tabs to the next multiple of `width`.
#[must_use]
pub fn expand_tabs(line: &str, width: usize) -> String {
    if !line.contains('\t') {
        return line.to_owned();
    }
    let mut result = String::with_capacity(line.len() + width);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = width - column % width;
            result.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            result.push(c);
            column += 1;
        }
    }
    result
}

/// Number of leading spaces.
#[must_use]
pub fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}
