//! Semantic HTML5 writer.
//!
//! Same document walk as the html4css1 writer, with sectioning elements
//! (`<article>`, `<section>`, `<header>`, `<aside>`) and `<code>` in place of
//! the flat `div.section`/`tt` markup.

use rstview_engine::nodes::MessageNode;
use rstview_engine::{ENGINE_VERSION, HtmlWriter, escape_html};

/// Writer producing semantic HTML5.
#[derive(Clone, Copy, Debug, Default)]
pub struct SemanticHtml5Writer;

fn id_attr(id: Option<&str>) -> String {
    id.map(|id| format!(" id=\"{}\"", escape_html(id)))
        .unwrap_or_default()
}

impl HtmlWriter for SemanticHtml5Writer {
    const NAME: &'static str = "html5";
    const COMPACT_DEFINITIONS: bool = false;

    fn encode(text: &str, out: &mut String) {
        out.push_str(&escape_html(text));
    }

    fn document_start(id: Option<&str>, out: &mut String) {
        out.push_str(&format!("<article class=\"document\"{}>\n", id_attr(id)));
    }

    fn document_end(out: &mut String) {
        out.push_str("</article>\n");
    }

    fn subtitle(id: Option<&str>, html: &str, out: &mut String) {
        out.push_str(&format!("<p class=\"subtitle\"{}>{html}</p>\n", id_attr(id)));
    }

    fn section_start(ids: &[String], level: usize, title_html: &str, out: &mut String) {
        out.push_str(&format!(
            "<section{}>\n<header><h{level}>{title_html}</h{level}></header>\n",
            id_attr(ids.first().map(String::as_str))
        ));
    }

    fn section_end(out: &mut String) {
        out.push_str("</section>\n");
    }

    fn literal(text: &str, out: &mut String) {
        out.push_str("<code>");
        Self::encode(text, out);
        out.push_str("</code>");
    }

    fn literal_block(language: Option<&str>, text: &str, out: &mut String) {
        match language {
            Some(lang) => out.push_str(&format!(
                "<pre><code class=\"language-{}\">",
                escape_html(lang)
            )),
            None => out.push_str("<pre><code>"),
        }
        Self::encode(text, out);
        out.push_str("</code></pre>\n");
    }

    fn highlighted_block(language: &str, class: &str, html: &str, out: &mut String) {
        out.push_str(&format!(
            "<div class=\"{}\"><pre><code class=\"language-{}\">{html}</code></pre></div>\n",
            escape_html(class),
            escape_html(language)
        ));
    }

    fn definition_list_start(out: &mut String) {
        out.push_str("<dl>\n");
    }

    fn footnote_reference(refid: &str, id: &str, label: &str, superscript: bool, out: &mut String) {
        let style = if superscript { "superscript" } else { "brackets" };
        out.push_str(&format!(
            "<a class=\"footnote-reference {style}\" href=\"#{}\" id=\"{}\" role=\"doc-noteref\">",
            escape_html(refid),
            escape_html(id)
        ));
        if superscript {
            out.push_str("<sup>");
            Self::encode(label, out);
            out.push_str("</sup>");
        } else {
            out.push('[');
            Self::encode(label, out);
            out.push(']');
        }
        out.push_str("</a>");
    }

    fn note_start(citation: bool, id: &str, label: &str, backrefs: &[String], out: &mut String) {
        let kind = if citation { "citation" } else { "footnote" };
        out.push_str(&format!(
            "<aside class=\"{kind}\" id=\"{}\" role=\"doc-{kind}\">\n<span class=\"label\">",
            escape_html(id)
        ));
        match backrefs {
            [only] => {
                out.push_str(&format!("<a href=\"#{}\" role=\"doc-backlink\">[", escape_html(only)));
                Self::encode(label, out);
                out.push_str("]</a></span>\n");
            }
            _ => {
                out.push('[');
                Self::encode(label, out);
                out.push_str("]</span>\n");
            }
        }
        if backrefs.len() > 1 {
            let links: Vec<String> = backrefs
                .iter()
                .enumerate()
                .map(|(i, id)| {
                    format!("<a href=\"#{}\" role=\"doc-backlink\">{}</a>", escape_html(id), i + 1)
                })
                .collect();
            out.push_str(&format!("<span class=\"backrefs\">({})</span>\n", links.join(", ")));
        }
    }

    fn note_end(out: &mut String) {
        out.push_str("</aside>\n");
    }

    fn admonition_start(
        kind: Option<&str>,
        classes: &[String],
        title_html: &str,
        out: &mut String,
    ) {
        let mut all = vec!["admonition"];
        all.extend(kind);
        all.extend(classes.iter().map(String::as_str));
        out.push_str(&format!(
            "<aside class=\"{}\">\n<p class=\"admonition-title\">{title_html}</p>\n",
            escape_html(&all.join(" "))
        ));
    }

    fn admonition_end(out: &mut String) {
        out.push_str("</aside>\n");
    }

    fn transition(out: &mut String) {
        out.push_str("<hr>\n");
    }

    fn system_message_start(msg: &MessageNode, source: &str, out: &mut String) {
        out.push_str(&format!(
            "<aside class=\"system-message\"{}>\n<p class=\"system-message-title\">System Message: {} (",
            id_attr(msg.id.as_deref()),
            msg.level
        ));
        Self::literal_source(source, out);
        if let Some(line) = msg.line {
            out.push_str(&format!(", line {line}"));
        }
        out.push(')');
        match msg.backrefs.as_slice() {
            [] => {}
            [only] => out.push_str(&format!(
                "; <em><a href=\"#{}\">backlink</a></em>",
                escape_html(only)
            )),
            many => {
                let links: Vec<String> = many
                    .iter()
                    .enumerate()
                    .map(|(i, id)| format!("<a href=\"#{}\">{}</a>", escape_html(id), i + 1))
                    .collect();
                out.push_str(&format!("; <em>backlinks: {}</em>", links.join(", ")));
            }
        }
        out.push_str("</p>\n");
    }

    fn system_message_end(out: &mut String) {
        out.push_str("</aside>\n");
    }

    fn literal_source(source: &str, out: &mut String) {
        Self::literal(source, out);
    }

    fn system_messages_start(out: &mut String) {
        out.push_str("<section class=\"system-messages\">\n<h1>Docutils System Messages</h1>\n");
    }

    fn system_messages_end(out: &mut String) {
        out.push_str("</section>\n");
    }

    fn head(title: &str, out: &mut String) {
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str(&format!(
            "<meta name=\"generator\" content=\"rstview-engine {ENGINE_VERSION}\">\n"
        ));
        if !title.is_empty() {
            out.push_str(&format!("<title>{title}</title>\n"));
        }
    }

    fn whole(language: &str, head: &str, html_body: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"{language}\">\n<head>\n{head}</head>\n\
             <body>\n{html_body}</body>\n</html>\n"
        )
    }
}
