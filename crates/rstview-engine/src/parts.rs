//! Rendered document split into named pieces.

/// Output of a publish call.
///
/// `body` and `fragment` hold the document content without title;
/// `html_body` wraps title and content in the writer's document element and
/// `whole` is a complete HTML page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Parts {
    pub version: String,
    pub encoding: String,
    /// Document title as encoded text.
    pub title: String,
    pub subtitle: String,
    pub html_title: String,
    pub html_subtitle: String,
    pub html_head: String,
    pub html_body: String,
    pub body: String,
    pub fragment: String,
    pub footer: String,
    pub whole: String,
}
