//! Syntax highlighting of code blocks.

use std::sync::LazyLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::html::{
    ClassStyle, ClassedHTMLGenerator, IncludeBackground, styled_line_to_highlighted_html,
};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Theme used when tokens are styled inline.
pub const INLINE_THEME: &str = "InspiredGitHub";

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Highlight `code` as `language`, returning the HTML of the tokens.
///
/// Returns `Ok(None)` when no syntax is known for the language.
pub(crate) fn highlight_code(
    language: &str,
    code: &str,
    inline_styles: bool,
) -> Result<Option<String>, syntect::Error> {
    let Some(syntax) = find_syntax(&SYNTAXES, language) else {
        return Ok(None);
    };

    let mut code_with_newline = code.to_owned();
    if !code_with_newline.ends_with('\n') {
        code_with_newline.push('\n');
    }

    if inline_styles {
        let Some(theme) = THEMES.themes.get(INLINE_THEME) else {
            return Ok(None);
        };
        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut html = String::new();
        for line in LinesWithEndings::from(code_with_newline.as_str()) {
            let regions = highlighter.highlight_line(line, &SYNTAXES)?;
            html.push_str(&styled_line_to_highlighted_html(
                &regions,
                IncludeBackground::No,
            )?);
        }
        return Ok(Some(html));
    }

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code_with_newline.as_str()) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(Some(generator.finalize()))
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    let lowercase = token.to_ascii_lowercase();
    syntax_set
        .find_syntax_by_token(&lowercase)
        .or_else(|| syntax_set.find_syntax_by_name(token))
        .or_else(|| syntax_set.find_syntax_by_extension(&lowercase))
}
