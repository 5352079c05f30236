use crate::error::Result;

pub mod html;
pub mod xml;

pub use html::HtmlDocument;
pub use xml::XmlDocument;

/// A parsed markup tree, reduced to the one query marker scanning needs.
pub trait Document {
    /// Attribute `attr` of every `tag` element whose `class` attribute is exactly `class`, in
    /// document order. `None` stands for an element that lacks the attribute.
    ///
    /// The class comparison is on the whole attribute value, so `"Z3988 extra"` does not match
    /// `"Z3988"`.
    fn attribute_by_class(&self, tag: &str, class: &str, attr: &str) -> Vec<Option<String>>;
}

/// Which parser to hand the markup to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentKind {
    #[default]
    Html,
    Xml,
}

impl DocumentKind {
    pub fn from_xml_flag(xml: bool) -> Self {
        if xml { DocumentKind::Xml } else { DocumentKind::Html }
    }
}

/// Parse `input` with the parser selected by `kind`.
pub fn parse_document(input: &str, kind: DocumentKind) -> Result<Box<dyn Document>> {
    Ok(match kind {
        DocumentKind::Html => Box::new(HtmlDocument::parse(input)),
        DocumentKind::Xml => Box::new(XmlDocument::parse(input)?),
    })
}

impl<D: Document + ?Sized> Document for Box<D> {
    fn attribute_by_class(&self, tag: &str, class: &str, attr: &str) -> Vec<Option<String>> {
        (**self).attribute_by_class(tag, class, attr)
    }
}

impl<D: Document + ?Sized> Document for &D {
    fn attribute_by_class(&self, tag: &str, class: &str, attr: &str) -> Vec<Option<String>> {
        (**self).attribute_by_class(tag, class, attr)
    }
}
