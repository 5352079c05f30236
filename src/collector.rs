use std::{fs, path::Path};

use crate::{
    context_object::{Codec, DecodedFields, MetadataRecord},
    document::{Document, DocumentKind, parse_document},
    error::{Error, Result},
    scanner,
};

/// Version tag prepended to every ContextObject when it is turned into an OpenURL.
pub const URL_VER: &str = "Z39.88-2004";

/// The COinS ContextObjects of the most recently loaded document.
///
/// Each `load*` call replaces the list wholesale. There is no internal locking: loading takes
/// `&mut self` and the views take `&self`, so sharing a collector across threads needs an outer
/// lock.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    codec: Codec,
    context_objects: Vec<String>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collector whose decoding views use `codec`.
    pub fn with_codec(codec: Codec) -> Self {
        Collector {
            codec,
            context_objects: Vec::new(),
        }
    }

    /// Scan `doc` for COinS markers, replacing whatever was loaded before.
    pub fn load<D: Document + ?Sized>(&mut self, doc: &D) {
        self.context_objects = scanner::scan(doc);
        tracing::debug!(count = self.context_objects.len(), "loaded ContextObjects");
    }

    /// Parse `input` as `kind` and load it. On a parse error the previous list is kept.
    pub fn load_str(&mut self, input: &str, kind: DocumentKind) -> Result<()> {
        let doc = parse_document(input, kind)?;
        tracing::debug!(?kind, bytes = input.len(), "parsed document");
        self.load(&doc);
        Ok(())
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>, kind: DocumentKind) -> Result<()> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_str(&input, kind)
    }

    pub fn len(&self) -> usize {
        self.context_objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.context_objects.is_empty()
    }

    /// The raw, still percent-encoded ContextObjects. Empty before the first load.
    pub fn raw_context_objects(&self) -> &[String] {
        &self.context_objects
    }

    /// One OpenURL per ContextObject: `{base}?url_ver=Z39.88-2004&{raw}`.
    ///
    /// `base` is used as given; if it already carries a query string the result is not a valid
    /// URL.
    pub fn open_urls(&self, base: &str) -> Vec<String> {
        self.context_objects
            .iter()
            .map(|raw| format!("{base}?url_ver={URL_VER}&{raw}"))
            .collect()
    }

    pub fn decoded_fields(&self) -> Result<Vec<DecodedFields>> {
        self.context_objects
            .iter()
            .map(|raw| self.codec.decode_fields(raw))
            .collect()
    }

    pub fn metadata_records(&self) -> Result<Vec<MetadataRecord>> {
        self.context_objects
            .iter()
            .map(|raw| self.codec.decode_metadata(raw))
            .collect()
    }
}
