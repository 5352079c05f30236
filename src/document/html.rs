use scraper::{ElementRef, Html};

use crate::document::Document;

/// An HTML page parsed with html5ever. Parsing is lenient and never fails.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(input: &str) -> Self {
        let html = Html::parse_document(input);
        if !html.errors.is_empty() {
            tracing::trace!(errors = html.errors.len(), "recovered from HTML parse errors");
        }
        HtmlDocument { html }
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.root_element().descendants().filter_map(ElementRef::wrap)
    }
}

impl Document for HtmlDocument {
    fn attribute_by_class(&self, tag: &str, class: &str, attr: &str) -> Vec<Option<String>> {
        self.elements()
            .filter(|e| e.value().name().eq_ignore_ascii_case(tag))
            .filter(|e| e.value().attr("class") == Some(class))
            .map(|e| e.value().attr(attr).map(str::to_string))
            .collect()
    }
}
