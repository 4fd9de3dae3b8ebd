//! Typed parser settings built from an option mapping.

use crate::error::EngineError;
use crate::value::{Options, Value};

/// Highest meaningful `report_level`: nothing is reported.
pub const MAX_REPORT_LEVEL: u8 = 5;

/// Footnote reference style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FootnoteReferences {
    /// `[1]`
    Brackets,
    /// Superscript number.
    Superscript,
}

/// Settings controlling one publish call.
///
/// Built from an [`Options`] mapping with [`Settings::from_options`]. Keys the
/// engine does not know are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    /// Minimum level of diagnostics that are written to the warning stream
    /// and kept in the output.
    pub report_level: u8,
    /// Minimum level of diagnostics that abort parsing.
    pub halt_level: u8,
    /// Ask the host to exit when parsing halts.
    pub enable_exit: bool,
    /// HTML heading level used for top-level sections.
    pub initial_header_level: u8,
    /// Allow the `include` directive. Off unless a configuration opts in.
    pub file_insertion_enabled: bool,
    /// Allow the `raw` directive. Off unless a configuration opts in.
    pub raw_enabled: bool,
    /// Language for generated labels.
    pub language_code: String,
    /// Footnote reference style.
    pub footnote_references: FootnoteReferences,
    /// Promote a lone top-level section to the document title.
    pub doctitle_xform: bool,
    /// Tab stop width used when expanding tabs.
    pub tab_width: usize,
    /// Drop comments from the output.
    pub strip_comments: bool,
    /// Highlight code blocks whose language has a known syntax.
    pub syntax_highlight: bool,
    /// CSS class of the element wrapping highlighted code.
    pub highlight_class: String,
    /// Style highlighted tokens inline instead of with classes.
    pub highlight_inline_styles: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            report_level: 2,
            halt_level: 4,
            enable_exit: false,
            initial_header_level: 1,
            file_insertion_enabled: false,
            raw_enabled: false,
            language_code: "en".to_owned(),
            footnote_references: FootnoteReferences::Brackets,
            doctitle_xform: true,
            tab_width: 8,
            strip_comments: false,
            syntax_highlight: true,
            highlight_class: "highlight".to_owned(),
            highlight_inline_styles: false,
        }
    }
}

impl Settings {
    /// Build settings from an option mapping, starting from the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSetting`] when a known key carries a value
    /// of the wrong type or out of range.
    pub fn from_options(options: &Options) -> Result<Self, EngineError> {
        let mut settings = Self::default();
        for (key, value) in options {
            match key.as_str() {
                "report_level" => settings.report_level = level(key, value)?,
                "halt_level" => settings.halt_level = level(key, value)?,
                "enable_exit" => settings.enable_exit = flag(key, value)?,
                "initial_header_level" => {
                    let n = int(key, value)?;
                    if !(1..=6).contains(&n) {
                        return Err(invalid(key, "expected a heading level between 1 and 6"));
                    }
                    settings.initial_header_level = u8::try_from(n).unwrap_or(1);
                }
                "file_insertion_enabled" => settings.file_insertion_enabled = flag(key, value)?,
                "raw_enabled" => settings.raw_enabled = flag(key, value)?,
                "language_code" => {
                    let code = value
                        .as_str()
                        .ok_or_else(|| invalid(key, "expected a string"))?;
                    // "fr_FR" and "fr-fr" both select "fr"
                    settings.language_code = code
                        .split(['_', '-'])
                        .next()
                        .unwrap_or(code)
                        .to_ascii_lowercase();
                }
                "footnote_references" => {
                    settings.footnote_references = match value.as_str() {
                        Some("brackets") => FootnoteReferences::Brackets,
                        Some("superscript") => FootnoteReferences::Superscript,
                        _ => return Err(invalid(key, "expected \"brackets\" or \"superscript\"")),
                    };
                }
                "doctitle_xform" => settings.doctitle_xform = flag(key, value)?,
                "tab_width" => {
                    let n = int(key, value)?;
                    settings.tab_width = usize::try_from(n)
                        .ok()
                        .filter(|w| *w > 0)
                        .ok_or_else(|| invalid(key, "expected a positive integer"))?;
                }
                "strip_comments" => settings.strip_comments = flag(key, value)?,
                "syntax_highlight" => settings.syntax_highlight = flag(key, value)?,
                "highlight_class" => {
                    let class = value
                        .as_str()
                        .filter(|c| !c.is_empty() && !c.contains(char::is_whitespace))
                        .ok_or_else(|| invalid(key, "expected a single class name"))?;
                    settings.highlight_class = class.to_owned();
                }
                "highlight_inline_styles" => {
                    settings.highlight_inline_styles = flag(key, value)?;
                }
                _ => tracing::debug!(key = %key, "Ignoring unknown setting"),
            }
        }
        Ok(settings)
    }
}

fn invalid(key: &str, reason: &str) -> EngineError {
    EngineError::InvalidSetting {
        key: key.to_owned(),
        reason: reason.to_owned(),
    }
}

fn int(key: &str, value: &Value) -> Result<i64, EngineError> {
    match value {
        Value::Bool(_) => Err(invalid(key, "expected an integer")),
        _ => value
            .as_int()
            .ok_or_else(|| invalid(key, "expected an integer")),
    }
}

fn level(key: &str, value: &Value) -> Result<u8, EngineError> {
    let n = int(key, value)?;
    u8::try_from(n).map_err(|_| invalid(key, "expected a non-negative level"))
}

fn flag(key: &str, value: &Value) -> Result<bool, EngineError> {
    value
        .as_bool()
        .ok_or_else(|| invalid(key, "expected a boolean"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, Value)]) -> Options {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_options(&Options::new()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.report_level, 2);
        assert_eq!(settings.halt_level, 4);
        assert!(settings.doctitle_xform);
        assert!(!settings.file_insertion_enabled);
        assert!(!settings.raw_enabled);
    }

    #[test]
    fn test_typical_configuration() {
        let settings = Settings::from_options(&options(&[
            ("initial_header_level", Value::Int(3)),
            ("file_insertion_enabled", Value::Bool(true)),
            ("raw_enabled", Value::Bool(true)),
            ("language_code", Value::from("fr_FR")),
            ("footnote_references", Value::from("superscript")),
            ("doctitle_xform", Value::Bool(false)),
            ("halt_level", Value::Int(6)),
            ("enable_exit", Value::Int(0)),
        ]))
        .unwrap();

        assert_eq!(settings.initial_header_level, 3);
        assert!(settings.file_insertion_enabled);
        assert!(settings.raw_enabled);
        assert_eq!(settings.language_code, "fr");
        assert_eq!(settings.footnote_references, FootnoteReferences::Superscript);
        assert!(!settings.doctitle_xform);
        assert_eq!(settings.halt_level, 6);
        assert!(!settings.enable_exit);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let settings =
            Settings::from_options(&options(&[("smart_quotes", Value::Bool(true))])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_header_level_out_of_range() {
        let err = Settings::from_options(&options(&[("initial_header_level", Value::Int(9))]))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSetting { ref key, .. } if key == "initial_header_level"));
    }

    #[test]
    fn test_report_level_rejects_bool() {
        let err =
            Settings::from_options(&options(&[("report_level", Value::Bool(true))])).unwrap_err();
        assert!(err.to_string().contains("report_level"));
    }

    #[test]
    fn test_highlight_settings() {
        let settings = Settings::from_options(&options(&[
            ("highlight_class", Value::from("pygments")),
            ("highlight_inline_styles", Value::Bool(true)),
            ("syntax_highlight", Value::Bool(false)),
        ]))
        .unwrap();
        assert_eq!(settings.highlight_class, "pygments");
        assert!(settings.highlight_inline_styles);
        assert!(!settings.syntax_highlight);

        let err = Settings::from_options(&options(&[("highlight_class", Value::from("a b"))]))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSetting { ref key, .. } if key == "highlight_class"));
    }

    #[test]
    fn test_footnote_references_rejects_unknown_token() {
        let result =
            Settings::from_options(&options(&[("footnote_references", Value::from("inline"))]));
        assert!(result.is_err());
    }
}
