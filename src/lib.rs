//! Extraction of COinS (ContextObjects in Spans) citation metadata from HTML and XML pages.
//!
//! ```
//! use coins::{Collector, DocumentKind};
//!
//! let page = r#"<span class="Z3988" title="rft_id=info%3Adoi%2F10.1%2Fx&amp;rft.atitle=Hello+World"></span>"#;
//! let mut collector = Collector::new();
//! collector.load_str(page, DocumentKind::Html)?;
//!
//! let records = collector.metadata_records()?;
//! assert_eq!(records[0].id.as_deref(), Some("info:doi/10.1/x"));
//! assert_eq!(records[0].metadata["atitle"], "Hello World");
//! # Ok::<(), coins::Error>(())
//! ```

pub mod collector;
pub mod context_object;
pub mod document;
pub mod error;
pub mod scanner;

pub use collector::Collector;
pub use context_object::{
    Codec, DecodedFields, FieldValue, MalformedPolicy, MetadataRecord, decode_fields,
    decode_metadata, encode_fields,
};
pub use document::{Document, DocumentKind, HtmlDocument, XmlDocument, parse_document};
pub use error::{Error, Result};
