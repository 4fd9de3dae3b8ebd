use super::HtmlWriter;

/// Writer producing html4css1-compatible markup.
#[derive(Clone, Copy, Debug, Default)]
pub struct Html4Writer;

impl HtmlWriter for Html4Writer {
    const NAME: &'static str = "html4";
}
