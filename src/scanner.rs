use crate::document::Document;

/// Element name carrying a COinS marker.
pub const MARKER_TAG: &str = "span";
/// The `class` value that flags an element as a COinS marker.
pub const MARKER_CLASS: &str = "Z3988";
/// Attribute holding the raw ContextObject.
pub const MARKER_ATTR: &str = "title";

/// Raw ContextObject of every COinS marker in `doc`, in document order.
///
/// Only elements whose class attribute is exactly `Z3988` count. A marker without a `title`
/// yields an empty string; duplicates are kept.
pub fn scan<D: Document + ?Sized>(doc: &D) -> Vec<String> {
    doc.attribute_by_class(MARKER_TAG, MARKER_CLASS, MARKER_ATTR)
        .into_iter()
        .map(|title| {
            let raw = title.unwrap_or_default();
            tracing::trace!(len = raw.len(), "found COinS marker");
            raw
        })
        .collect()
}
