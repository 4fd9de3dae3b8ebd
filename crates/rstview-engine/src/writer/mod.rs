//! HTML writers.
//!
//! [`Translator`] walks a [`Document`] and emits HTML, delegating the
//! format-specific markup to an [`HtmlWriter`]. The trait's default methods
//! produce html4css1-compatible output; other writers override what differs.

mod html4;

use std::marker::PhantomData;

pub use html4::Html4Writer;

use crate::highlight;
use crate::language::{self, Labels};
use crate::nodes::{
    Admonition, DefinitionItem, Document, EnumeratedList, Inline, MessageNode, Node, Note,
    NoteReference, RefTarget, Title, astext,
};
use crate::parts::Parts;
use crate::settings::{FootnoteReferences, Settings};
use crate::util::escape_html;

/// Version reported in generated documents.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format-specific markup used by [`Translator`].
///
/// Methods are associated functions writing into `out`. Titles and other
/// already-rendered fragments are passed as HTML.
pub trait HtmlWriter {
    /// Writer name, as used in configuration.
    const NAME: &'static str;

    /// Definitions holding a single paragraph are written without `<p>`.
    const COMPACT_DEFINITIONS: bool = true;

    /// Escape text for HTML output.
    fn encode(text: &str, out: &mut String) {
        out.push_str(&escape_html(text).replace('@', "&#64;"));
    }

    /// Open the element wrapping the whole body.
    fn document_start(id: Option<&str>, out: &mut String) {
        match id {
            Some(id) => {
                out.push_str(&format!("<div class=\"document\" id=\"{}\">\n", escape_html(id)));
            }
            None => out.push_str("<div class=\"document\">\n"),
        }
    }

    fn document_end(out: &mut String) {
        out.push_str("</div>\n");
    }

    /// Document title, outside of the body.
    fn title(html: &str, out: &mut String) {
        out.push_str(&format!("<h1 class=\"title\">{html}</h1>\n"));
    }

    fn subtitle(id: Option<&str>, html: &str, out: &mut String) {
        match id {
            Some(id) => out.push_str(&format!(
                "<h2 class=\"subtitle\" id=\"{}\">{html}</h2>\n",
                escape_html(id)
            )),
            None => out.push_str(&format!("<h2 class=\"subtitle\">{html}</h2>\n")),
        }
    }

    /// Open a section. `level` is the heading level, already clamped to 1..=6.
    fn section_start(ids: &[String], level: usize, title_html: &str, out: &mut String) {
        out.push_str("<div class=\"section\"");
        push_id(ids, out);
        out.push_str(&format!(">\n<h{level}>{title_html}</h{level}>\n"));
    }

    fn section_end(out: &mut String) {
        out.push_str("</div>\n");
    }

    /// Inline literal text.
    fn literal(text: &str, out: &mut String) {
        out.push_str("<tt class=\"docutils literal\">");
        Self::encode(text, out);
        out.push_str("</tt>");
    }

    fn literal_block(language: Option<&str>, text: &str, out: &mut String) {
        match language {
            Some(lang) => out.push_str(&format!(
                "<pre class=\"code {} literal-block\">\n",
                escape_html(lang)
            )),
            None => out.push_str("<pre class=\"literal-block\">\n"),
        }
        Self::encode(text, out);
        out.push_str("\n</pre>\n");
    }

    fn definition_list_start(out: &mut String) {
        out.push_str("<dl class=\"docutils\">\n");
    }

    fn definition_list_end(out: &mut String) {
        out.push_str("</dl>\n");
    }

    /// Classifier following a definition list term.
    fn classifier(html: &str, out: &mut String) {
        out.push_str(&format!(
            " <span class=\"classifier-delimiter\">:</span> <span class=\"classifier\">{html}</span>"
        ));
    }

    /// Link to a footnote, as `[1]` or as a superscript number.
    fn footnote_reference(refid: &str, id: &str, label: &str, superscript: bool, out: &mut String) {
        out.push_str(&format!(
            "<a class=\"footnote-reference\" href=\"#{}\" id=\"{}\">",
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

    fn citation_reference(refid: &str, id: &str, label: &str, out: &mut String) {
        out.push_str(&format!(
            "<a class=\"citation-reference\" href=\"#{}\" id=\"{}\">[",
            escape_html(refid),
            escape_html(id)
        ));
        Self::encode(label, out);
        out.push_str("]</a>");
    }

    /// Open a footnote or citation and write its label with backlinks.
    fn note_start(citation: bool, id: &str, label: &str, backrefs: &[String], out: &mut String) {
        out.push_str(&format!(
            "<table class=\"docutils {}\" frame=\"void\" id=\"{}\" rules=\"none\">\n\
             <colgroup><col class=\"label\" /><col /></colgroup>\n\
             <tbody valign=\"top\">\n<tr><td class=\"label\">",
            if citation { "citation" } else { "footnote" },
            escape_html(id)
        ));
        let mut label_html = String::new();
        Self::encode(label, &mut label_html);
        match backrefs {
            [only] => out.push_str(&format!(
                "<a class=\"fn-backref\" href=\"#{}\">[{label_html}]</a></td><td>",
                escape_html(only)
            )),
            [] => out.push_str(&format!("[{label_html}]</td><td>")),
            many => {
                out.push_str(&format!("[{label_html}]</td><td><em>("));
                let links: Vec<String> = many
                    .iter()
                    .enumerate()
                    .map(|(i, id)| {
                        format!("<a class=\"fn-backref\" href=\"#{}\">{}</a>", escape_html(id), i + 1)
                    })
                    .collect();
                out.push_str(&links.join(", "));
                out.push_str(")</em> ");
            }
        }
    }

    fn note_end(out: &mut String) {
        out.push_str("</td></tr>\n</tbody>\n</table>\n");
    }

    /// Code block whose tokens are already rendered as `html`, wrapped in an
    /// element of class `class`.
    fn highlighted_block(language: &str, class: &str, html: &str, out: &mut String) {
        out.push_str(&format!(
            "<div class=\"{}\">\n<pre class=\"code {} literal-block\">\n{html}</pre>\n</div>\n",
            escape_html(class),
            escape_html(language)
        ));
    }

    /// Open an admonition. `kind` is `None` for the generic admonition.
    fn admonition_start(
        kind: Option<&str>,
        classes: &[String],
        title_html: &str,
        out: &mut String,
    ) {
        let mut all: Vec<&str> = match kind {
            Some(kind) => vec![kind],
            None => vec!["admonition"],
        };
        all.extend(classes.iter().map(String::as_str));
        out.push_str(&format!(
            "<div class=\"{}\">\n<p class=\"admonition-title\">{title_html}</p>\n",
            escape_html(&all.join(" "))
        ));
    }

    fn admonition_end(out: &mut String) {
        out.push_str("</div>\n");
    }

    fn transition(out: &mut String) {
        out.push_str("<hr class=\"docutils\" />\n");
    }

    /// Open a system message and write its title line.
    fn system_message_start(msg: &MessageNode, source: &str, out: &mut String) {
        out.push_str("<div class=\"system-message\"");
        if let Some(id) = &msg.id {
            out.push_str(&format!(" id=\"{}\"", escape_html(id)));
        }
        out.push_str(">\n<p class=\"system-message-title\">System Message: ");
        out.push_str(&format!("{} (", msg.level));
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
        out.push_str("</div>\n");
    }

    /// Source name shown in a system message title.
    fn literal_source(source: &str, out: &mut String) {
        out.push_str("<tt class=\"docutils\">");
        Self::encode(source, out);
        out.push_str("</tt>");
    }

    /// Open the section holding messages raised after parsing.
    fn system_messages_start(out: &mut String) {
        out.push_str("<div class=\"system-messages section\">\n<h1>Docutils System Messages</h1>\n");
    }

    fn system_messages_end(out: &mut String) {
        out.push_str("</div>\n");
    }

    /// Content of the `<head>` element.
    fn head(title: &str, out: &mut String) {
        out.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\" />\n");
        out.push_str(&format!(
            "<meta name=\"generator\" content=\"rstview-engine {ENGINE_VERSION}\" />\n"
        ));
        if !title.is_empty() {
            out.push_str(&format!("<title>{title}</title>\n"));
        }
    }

    /// Complete document around `head` and `html_body`.
    fn whole(language: &str, head: &str, html_body: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n\
             <!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \
             \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">\n\
             <html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"{language}\" lang=\"{language}\">\n\
             <head>\n{head}</head>\n<body>\n{html_body}</body>\n</html>\n"
        )
    }
}

fn push_id(ids: &[String], out: &mut String) {
    if let Some(id) = ids.first() {
        out.push_str(&format!(" id=\"{}\"", escape_html(id)));
    }
}

/// Walks a document tree and renders it with writer `W`.
pub struct Translator<'a, W: HtmlWriter> {
    settings: &'a Settings,
    source: &'a str,
    labels: &'static Labels,
    _writer: PhantomData<W>,
}

impl<'a, W: HtmlWriter> Translator<'a, W> {
    #[must_use]
    pub fn new(settings: &'a Settings, source: &'a str) -> Self {
        Self {
            settings,
            source,
            labels: language::labels(&settings.language_code),
            _writer: PhantomData,
        }
    }

    /// Render the document into its parts.
    #[must_use]
    pub fn parts(&self, document: &Document) -> Parts {
        let mut body = String::new();
        self.nodes(&document.children, 1, &mut body);
        self.transform_messages(&document.transform_messages, &mut body);

        let title_html = document
            .title
            .as_ref()
            .map(|t| self.inlines_html(&t.children))
            .unwrap_or_default();
        let subtitle_html = document
            .subtitle
            .as_ref()
            .map(|t| self.inlines_html(&t.children))
            .unwrap_or_default();

        let mut html_title = String::new();
        if document.title.is_some() {
            W::title(&title_html, &mut html_title);
        }
        let mut html_subtitle = String::new();
        if let Some(subtitle) = &document.subtitle {
            W::subtitle(first_id(subtitle), &subtitle_html, &mut html_subtitle);
        }

        let title = document
            .title
            .as_ref()
            .map(|t| encoded::<W>(&astext(&t.children)))
            .unwrap_or_default();
        let subtitle = document
            .subtitle
            .as_ref()
            .map(|t| encoded::<W>(&astext(&t.children)))
            .unwrap_or_default();

        let mut html_body = String::new();
        W::document_start(document.title.as_ref().and_then(first_id), &mut html_body);
        html_body.push_str(&html_title);
        html_body.push_str(&html_subtitle);
        html_body.push_str(&body);
        W::document_end(&mut html_body);

        let mut html_head = String::new();
        W::head(&title, &mut html_head);
        let whole = W::whole(self.labels.code, &html_head, &html_body);

        Parts {
            version: ENGINE_VERSION.to_owned(),
            encoding: "utf-8".to_owned(),
            title,
            subtitle,
            html_title,
            html_subtitle,
            html_head,
            html_body,
            fragment: body.clone(),
            body,
            footer: String::new(),
            whole,
        }
    }

    fn visible(&self, msg: &MessageNode) -> bool {
        msg.level.as_u8() >= self.settings.report_level
    }

    fn transform_messages(&self, messages: &[MessageNode], out: &mut String) {
        let visible: Vec<&MessageNode> = messages.iter().filter(|m| self.visible(m)).collect();
        if visible.is_empty() {
            return;
        }
        W::system_messages_start(out);
        for msg in visible {
            self.system_message(msg, out);
        }
        W::system_messages_end(out);
    }

    fn heading_level(&self, depth: usize) -> usize {
        (usize::from(self.settings.initial_header_level) + depth - 1).min(6)
    }

    fn nodes(&self, nodes: &[Node], depth: usize, out: &mut String) {
        for node in nodes {
            self.node(node, depth, out);
        }
    }

    fn node(&self, node: &Node, depth: usize, out: &mut String) {
        match node {
            Node::Paragraph(inlines) => {
                out.push_str("<p>");
                self.inlines(inlines, out);
                out.push_str("</p>\n");
            }
            Node::Section(section) => {
                let title = self.inlines_html(&section.title);
                W::section_start(&section.ids, self.heading_level(depth), &title, out);
                self.nodes(&section.children, depth + 1, out);
                W::section_end(out);
            }
            Node::BulletList(items) => {
                let compact = is_compact(items);
                out.push_str(if compact { "<ul class=\"simple\">\n" } else { "<ul>\n" });
                self.list_items(items, compact, depth, out);
                out.push_str("</ul>\n");
            }
            Node::EnumeratedList(list) => self.enumerated_list(list, depth, out),
            Node::LiteralBlock { text, language } => {
                self.literal_block(language.as_deref(), text, out);
            }
            Node::BlockQuote(children) => {
                out.push_str("<blockquote>\n");
                self.nodes(children, depth, out);
                out.push_str("</blockquote>\n");
            }
            Node::DefinitionList(items) => self.definition_list(items, depth, out),
            Node::Note(note) => self.note(note, depth, out),
            Node::Admonition(admonition) => self.admonition(admonition, depth, out),
            Node::Raw { format, text } => {
                if format == "html" {
                    out.push_str(text);
                    out.push('\n');
                }
            }
            Node::Transition => W::transition(out),
            Node::Comment(text) => {
                if !self.settings.strip_comments {
                    out.push_str("<!-- ");
                    W::encode(text, out);
                    out.push_str(" -->\n");
                }
            }
            Node::Target { id } => {
                out.push_str(&format!("<span id=\"{}\"></span>\n", escape_html(id)));
            }
            Node::SystemMessage(msg) => {
                if self.visible(msg) {
                    self.system_message(msg, out);
                }
            }
        }
    }

    fn enumerated_list(&self, list: &EnumeratedList, depth: usize, out: &mut String) {
        let compact = is_compact(&list.items);
        out.push_str(&format!("<ol class=\"{}", list.enumtype.class()));
        if compact {
            out.push_str(" simple");
        }
        out.push('"');
        if list.start != 1 {
            out.push_str(&format!(" start=\"{}\"", list.start));
        }
        out.push_str(">\n");
        self.list_items(&list.items, compact, depth, out);
        out.push_str("</ol>\n");
    }

    fn list_items(&self, items: &[Vec<Node>], compact: bool, depth: usize, out: &mut String) {
        for item in items {
            out.push_str("<li>");
            if compact {
                for node in item {
                    match node {
                        Node::Paragraph(inlines) => self.inlines(inlines, out),
                        other => self.node(other, depth, out),
                    }
                }
            } else {
                self.nodes(item, depth, out);
            }
            out.push_str("</li>\n");
        }
    }

    fn literal_block(&self, language: Option<&str>, text: &str, out: &mut String) {
        if let Some(language) = language.filter(|_| self.settings.syntax_highlight) {
            match highlight::highlight_code(language, text, self.settings.highlight_inline_styles) {
                Ok(Some(html)) => {
                    W::highlighted_block(language, &self.settings.highlight_class, &html, out);
                    return;
                }
                Ok(None) => tracing::debug!(language, "No syntax for code block"),
                Err(err) => tracing::warn!(language, error = %err, "Syntax highlighting failed"),
            }
        }
        W::literal_block(language, text, out);
    }

    fn definition_list(&self, items: &[DefinitionItem], depth: usize, out: &mut String) {
        W::definition_list_start(out);
        for item in items {
            out.push_str("<dt>");
            self.inlines(&item.term, out);
            for classifier in &item.classifiers {
                W::classifier(&self.inlines_html(classifier), out);
            }
            out.push_str("</dt>\n<dd>");
            match item.definition.as_slice() {
                [Node::Paragraph(inlines)] if W::COMPACT_DEFINITIONS => self.inlines(inlines, out),
                definition => self.nodes(definition, depth, out),
            }
            out.push_str("</dd>\n");
        }
        W::definition_list_end(out);
    }

    fn note(&self, note: &Note, depth: usize, out: &mut String) {
        W::note_start(note.label.is_citation(), &note.id, &note.text, &note.backrefs, out);
        self.nodes(&note.children, depth, out);
        W::note_end(out);
    }

    fn note_reference(&self, reference: &NoteReference, out: &mut String) {
        let Some(refid) = &reference.refid else {
            W::encode(&reference.raw, out);
            return;
        };
        if reference.label.is_citation() {
            W::citation_reference(refid, &reference.id, &reference.text, out);
        } else {
            let superscript = self.settings.footnote_references == FootnoteReferences::Superscript;
            W::footnote_reference(refid, &reference.id, &reference.text, superscript, out);
        }
    }

    fn admonition(&self, admonition: &Admonition, depth: usize, out: &mut String) {
        let title = match (&admonition.title, &admonition.kind) {
            (Some(title), _) => self.inlines_html(title),
            (None, Some(kind)) => {
                let label = self.labels.admonition(kind).unwrap_or(kind);
                encoded::<W>(label)
            }
            (None, None) => String::new(),
        };
        W::admonition_start(admonition.kind.as_deref(), &admonition.classes, &title, out);
        self.nodes(&admonition.children, depth, out);
        W::admonition_end(out);
    }

    fn system_message(&self, msg: &MessageNode, out: &mut String) {
        W::system_message_start(msg, self.source, out);
        match &msg.details {
            Some(details) => {
                out.push_str("<p>");
                W::encode(&msg.message, out);
                out.push_str("</p>\n");
                W::literal_block(None, details, out);
            }
            None => W::encode(&msg.message, out),
        }
        W::system_message_end(out);
    }

    fn inlines_html(&self, inlines: &[Inline]) -> String {
        let mut out = String::new();
        self.inlines(inlines, &mut out);
        out
    }

    fn inlines(&self, inlines: &[Inline], out: &mut String) {
        for inline in inlines {
            self.inline(inline, out);
        }
    }

    fn wrapped(&self, tag: &str, children: &[Inline], out: &mut String) {
        out.push_str(&format!("<{tag}>"));
        self.inlines(children, out);
        out.push_str(&format!("</{tag}>"));
    }

    fn inline(&self, inline: &Inline, out: &mut String) {
        match inline {
            Inline::Text(text) => W::encode(text, out),
            Inline::Emphasis(children) => self.wrapped("em", children, out),
            Inline::Strong(children) => self.wrapped("strong", children, out),
            Inline::Literal(text) => W::literal(text, out),
            Inline::TitleReference(children) => self.wrapped("cite", children, out),
            Inline::Subscript(children) => self.wrapped("sub", children, out),
            Inline::Superscript(children) => self.wrapped("sup", children, out),
            Inline::Reference {
                children, target, ..
            } => match target {
                RefTarget::Uri(uri) => {
                    out.push_str(&format!(
                        "<a class=\"reference external\" href=\"{}\">",
                        escape_html(uri)
                    ));
                    self.inlines(children, out);
                    out.push_str("</a>");
                }
                RefTarget::Id(id) => {
                    out.push_str(&format!(
                        "<a class=\"reference internal\" href=\"#{}\">",
                        escape_html(id)
                    ));
                    self.inlines(children, out);
                    out.push_str("</a>");
                }
                RefTarget::Name(_) | RefTarget::Anonymous(_) => self.inlines(children, out),
            },
            Inline::Problematic { text, id, refid } => {
                out.push_str(&format!(
                    "<a href=\"#{}\"><span class=\"problematic\" id=\"{}\">",
                    escape_html(refid),
                    escape_html(id)
                ));
                W::encode(text, out);
                out.push_str("</span></a>");
            }
            Inline::Raw { format, text } => {
                if format == "html" {
                    out.push_str(text);
                }
            }
            Inline::NoteReference(reference) => self.note_reference(reference, out),
        }
    }
}

fn first_id(title: &Title) -> Option<&str> {
    title.ids.first().map(String::as_str)
}

fn encoded<W: HtmlWriter>(text: &str) -> String {
    let mut out = String::new();
    W::encode(text, &mut out);
    out
}

/// A list is compact when each item holds at most one paragraph, optionally
/// followed by compact nested lists.
fn is_compact(items: &[Vec<Node>]) -> bool {
    items.iter().all(|item| {
        let rest = match item.split_first() {
            None => return true,
            Some((Node::Paragraph(_), rest)) => rest,
            Some(_) => return false,
        };
        rest.iter().all(|node| match node {
            Node::BulletList(nested) => is_compact(nested),
            Node::EnumeratedList(list) => is_compact(&list.items),
            _ => false,
        })
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::nodes::{EnumType, NoteLabel, Section};
    use crate::reporter::Level;

    fn t(s: &str) -> Inline {
        Inline::Text(s.to_owned())
    }

    fn p(s: &str) -> Node {
        Node::Paragraph(vec![t(s)])
    }

    fn render(children: Vec<Node>, settings: &Settings) -> String {
        let doc = Document {
            children,
            ..Document::default()
        };
        Translator::<Html4Writer>::new(settings, "<string>").parts(&doc).body
    }

    #[test]
    fn test_encode_escapes_at_sign() {
        assert_eq!(encoded::<Html4Writer>("a@b <c>"), "a&#64;b &lt;c&gt;");
    }

    #[test]
    fn test_section_heading_levels() {
        let settings = Settings {
            initial_header_level: 5,
            ..Settings::default()
        };
        let inner = Section {
            ids: vec!["b".to_owned()],
            title: vec![t("B")],
            children: vec![Node::Section(Section {
                ids: vec!["c".to_owned()],
                title: vec![t("C")],
                children: vec![],
            })],
        };
        let outer = Node::Section(Section {
            ids: vec!["a".to_owned()],
            title: vec![t("A")],
            children: vec![Node::Section(inner)],
        });
        assert_eq!(
            render(vec![outer], &settings),
            "<div class=\"section\" id=\"a\">\n<h5>A</h5>\n\
             <div class=\"section\" id=\"b\">\n<h6>B</h6>\n\
             <div class=\"section\" id=\"c\">\n<h6>C</h6>\n</div>\n</div>\n</div>\n"
        );
    }

    #[test]
    fn test_compact_and_loose_lists() {
        let settings = Settings::default();
        assert_eq!(
            render(vec![Node::BulletList(vec![vec![p("a")], vec![p("b")]])], &settings),
            "<ul class=\"simple\">\n<li>a</li>\n<li>b</li>\n</ul>\n"
        );
        assert_eq!(
            render(vec![Node::BulletList(vec![vec![p("a"), p("b")]])], &settings),
            "<ul>\n<li><p>a</p>\n<p>b</p>\n</li>\n</ul>\n"
        );
        assert_eq!(
            render(
                vec![Node::EnumeratedList(EnumeratedList {
                    enumtype: EnumType::LowerAlpha,
                    start: 3,
                    items: vec![vec![p("c")]],
                })],
                &settings
            ),
            "<ol class=\"loweralpha simple\" start=\"3\">\n<li>c</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_admonition_label_follows_language() {
        let settings = Settings {
            language_code: "fr".to_owned(),
            ..Settings::default()
        };
        let node = Node::Admonition(Admonition {
            kind: Some("tip".to_owned()),
            title: None,
            classes: vec![],
            children: vec![p("x")],
        });
        assert_eq!(
            render(vec![node], &settings),
            "<div class=\"tip\">\n<p class=\"admonition-title\">Astuce</p>\n<p>x</p>\n</div>\n"
        );
    }

    #[test]
    fn test_system_message_with_details_and_backlinks() {
        let msg = MessageNode {
            level: Level::Error,
            message: "Unknown directive type \"x\".".to_owned(),
            line: Some(3),
            id: Some("id1".to_owned()),
            backrefs: vec!["id2".to_owned(), "id3".to_owned()],
            details: Some(".. x::".to_owned()),
        };
        assert_eq!(
            render(vec![Node::SystemMessage(msg)], &Settings::default()),
            "<div class=\"system-message\" id=\"id1\">\n\
             <p class=\"system-message-title\">System Message: ERROR/3 \
             (<tt class=\"docutils\">&lt;string&gt;</tt>, line 3); \
             <em>backlinks: <a href=\"#id2\">1</a>, <a href=\"#id3\">2</a></em></p>\n\
             <p>Unknown directive type &quot;x&quot;.</p>\n\
             <pre class=\"literal-block\">\n.. x::\n</pre>\n</div>\n"
        );
    }

    #[test]
    fn test_messages_below_report_level_are_dropped() {
        let msg = MessageNode::new(crate::reporter::SystemMessage {
            level: Level::Info,
            message: "quiet".to_owned(),
            line: None,
        });
        assert_eq!(render(vec![Node::SystemMessage(msg)], &Settings::default()), "");
    }

    #[test]
    fn test_comments_stripped_on_request() {
        let comment = || vec![Node::Comment("note to self".to_owned())];
        assert_eq!(render(comment(), &Settings::default()), "<!-- note to self -->\n");
        let settings = Settings {
            strip_comments: true,
            ..Settings::default()
        };
        assert_eq!(render(comment(), &settings), "");
    }

    #[test]
    fn test_whole_document() {
        let doc = Document {
            title: Some(Title {
                ids: vec!["hello".to_owned()],
                children: vec![t("Hello")],
            }),
            children: vec![p("Body.")],
            ..Document::default()
        };
        let settings = Settings::default();
        let parts = Translator::<Html4Writer>::new(&settings, "<string>").parts(&doc);
        assert_eq!(parts.title, "Hello");
        assert_eq!(parts.html_title, "<h1 class=\"title\">Hello</h1>\n");
        assert_eq!(
            parts.html_body,
            "<div class=\"document\" id=\"hello\">\n<h1 class=\"title\">Hello</h1>\n<p>Body.</p>\n</div>\n"
        );
        assert!(parts.html_head.contains("<title>Hello</title>"));
        assert!(parts.whole.contains("xml:lang=\"en\""));
        assert!(parts.whole.ends_with("<body>\n<div class=\"document\" id=\"hello\">\n<h1 class=\"title\">Hello</h1>\n<p>Body.</p>\n</div>\n</body>\n</html>\n"));
        assert_eq!(parts.fragment, parts.body);
    }

    #[test]
    fn test_definition_list() {
        let item = |definition| DefinitionItem {
            term: vec![t("term")],
            classifiers: vec![vec![t("str")]],
            definition,
        };
        assert_eq!(
            render(
                vec![Node::DefinitionList(vec![item(vec![p("x")]), item(vec![p("a"), p("b")])])],
                &Settings::default()
            ),
            "<dl class=\"docutils\">\n\
             <dt>term <span class=\"classifier-delimiter\">:</span> <span class=\"classifier\">str</span></dt>\n\
             <dd>x</dd>\n\
             <dt>term <span class=\"classifier-delimiter\">:</span> <span class=\"classifier\">str</span></dt>\n\
             <dd><p>a</p>\n<p>b</p>\n</dd>\n</dl>\n"
        );
    }

    fn footnoted() -> Vec<Node> {
        vec![
            Node::Paragraph(vec![
                t("See"),
                Inline::NoteReference(NoteReference {
                    id: "id1".to_owned(),
                    label: NoteLabel::Auto,
                    text: "1".to_owned(),
                    refid: Some("id2".to_owned()),
                    raw: "[#]_".to_owned(),
                }),
            ]),
            Node::Note(Note {
                id: "id2".to_owned(),
                label: NoteLabel::Auto,
                text: "1".to_owned(),
                backrefs: vec!["id1".to_owned()],
                children: vec![p("Note.")],
            }),
        ]
    }

    #[test]
    fn test_footnote_reference_styles() {
        let note = "<table class=\"docutils footnote\" frame=\"void\" id=\"id2\" rules=\"none\">\n\
                    <colgroup><col class=\"label\" /><col /></colgroup>\n\
                    <tbody valign=\"top\">\n\
                    <tr><td class=\"label\"><a class=\"fn-backref\" href=\"#id1\">[1]</a></td>\
                    <td><p>Note.</p>\n</td></tr>\n</tbody>\n</table>\n";

        let brackets = Settings {
            footnote_references: FootnoteReferences::Brackets,
            ..Settings::default()
        };
        assert_eq!(
            render(footnoted(), &brackets),
            format!(
                "<p>See<a class=\"footnote-reference\" href=\"#id2\" id=\"id1\">[1]</a></p>\n{note}"
            )
        );

        let superscript = Settings {
            footnote_references: FootnoteReferences::Superscript,
            ..Settings::default()
        };
        assert_eq!(
            render(footnoted(), &superscript),
            format!(
                "<p>See<a class=\"footnote-reference\" href=\"#id2\" id=\"id1\"><sup>1</sup></a></p>\n{note}"
            )
        );
    }

    #[test]
    fn test_citation_with_several_backlinks() {
        let note = Node::Note(Note {
            id: "cit".to_owned(),
            label: NoteLabel::Citation("CIT".to_owned()),
            text: "CIT".to_owned(),
            backrefs: vec!["id1".to_owned(), "id2".to_owned()],
            children: vec![p("Book.")],
        });
        assert_eq!(
            render(vec![note], &Settings::default()),
            "<table class=\"docutils citation\" frame=\"void\" id=\"cit\" rules=\"none\">\n\
             <colgroup><col class=\"label\" /><col /></colgroup>\n\
             <tbody valign=\"top\">\n\
             <tr><td class=\"label\">[CIT]</td><td><em>(<a class=\"fn-backref\" href=\"#id1\">1</a>, \
             <a class=\"fn-backref\" href=\"#id2\">2</a>)</em> <p>Book.</p>\n</td></tr>\n</tbody>\n</table>\n"
        );
    }

    fn code(language: &str, text: &str) -> Vec<Node> {
        vec![Node::LiteralBlock {
            text: text.to_owned(),
            language: Some(language.to_owned()),
        }]
    }

    #[test]
    fn test_code_block_highlighted_with_classes() {
        let settings = Settings {
            highlight_class: "pygments".to_owned(),
            ..Settings::default()
        };
        let html = render(code("python", "x = 1 < 2"), &settings);
        assert!(html.starts_with(
            "<div class=\"pygments\">\n<pre class=\"code python literal-block\">\n<span class=\"source python\">"
        ));
        assert!(html.contains("&lt;"));
        assert!(!html.contains("style="));
        assert!(html.ends_with("</pre>\n</div>\n"));
    }

    #[test]
    fn test_code_block_highlighted_inline() {
        let settings = Settings {
            highlight_inline_styles: true,
            ..Settings::default()
        };
        let html = render(code("python", "x = 1 < 2"), &settings);
        assert!(html.starts_with(
            "<div class=\"highlight\">\n<pre class=\"code python literal-block\">\n<span style=\""
        ));
        assert!(!html.contains("<span class="));
    }

    #[test]
    fn test_code_block_without_highlighting() {
        let plain = "<pre class=\"code python literal-block\">\nx = 1 &lt; 2\n</pre>\n";
        let settings = Settings {
            syntax_highlight: false,
            ..Settings::default()
        };
        assert_eq!(render(code("python", "x = 1 < 2"), &settings), plain);

        let unknown = render(code("no-such-language", "x"), &Settings::default());
        assert_eq!(unknown, "<pre class=\"code no-such-language literal-block\">\nx\n</pre>\n");
    }
}
