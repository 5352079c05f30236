//! Decoding of OpenURL ContextObjects in their key/encoded-value (KEV) form.
//!
//! A raw ContextObject looks like `rft_id=info:doi/10.1/x&rft.atitle=Hello%20World`. It is
//! decoded in two passes: [`Codec::decode_fields`] turns it into an ordered, multi-valued
//! [`DecodedFields`] map, and [`Codec::decode_metadata`] folds that map into a
//! [`MetadataRecord`] holding only the referent's data.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};

pub mod urlencoding;

use urlencoding::{decode_component, encode_component};

const RFT_ID: &str = "rft_id";
const RFT_VAL_FMT: &str = "rft_val_fmt";
const RFT_PREFIX: &str = "rft.";

/// The value of a decoded field: one string, or every value of a key that appeared more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    Sequence(Vec<String>),
}

impl FieldValue {
    /// Add another occurrence. A scalar turns into a two-element sequence.
    fn push(&mut self, value: String) {
        match self {
            FieldValue::Scalar(first) => {
                let first = std::mem::take(first);
                *self = FieldValue::Sequence(vec![first, value]);
            }
            FieldValue::Sequence(values) => values.push(value),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(v) => Some(v),
            FieldValue::Sequence(_) => None,
        }
    }

    /// All values in encounter order.
    pub fn values(&self) -> &[String] {
        match self {
            FieldValue::Scalar(v) => std::slice::from_ref(v),
            FieldValue::Sequence(vs) => vs,
        }
    }

    /// The value written last.
    pub fn last(&self) -> Option<&str> {
        self.values().last().map(String::as_str)
    }
}

/// Ordered mapping of ContextObject keys to their decoded values.
///
/// Keys keep the position of their first occurrence; later occurrences of the same key append to
/// that entry instead of creating a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DecodedFields(IndexMap<String, FieldValue>);

impl DecodedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.0.entry(key.into()) {
            indexmap::map::Entry::Occupied(mut slot) => slot.get_mut().push(value),
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(FieldValue::Scalar(value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DecodedFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = DecodedFields::new();
        for (k, v) in iter {
            fields.append(k, v);
        }
        fields
    }
}

/// The referent's identifier, format and `rft.`-prefixed metadata.
///
/// Unlike [`DecodedFields`], every slot here keeps only the last value written to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, String>,
}

impl MetadataRecord {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.format.is_none() && self.metadata.is_empty()
    }

    /// Plain assignment: a repeated key overwrites, it never accumulates.
    fn assign(&mut self, key: &str, value: &str) {
        if key == RFT_ID {
            self.id = Some(value.to_string());
        } else if key == RFT_VAL_FMT {
            self.format = Some(value.to_string());
        } else if let Some(name) = key.strip_prefix(RFT_PREFIX) {
            self.metadata.insert(name.to_string(), value.to_string());
        }
    }
}

/// What to do with a pair token that has no `=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Fail the whole decode with [`Error::MalformedContextObject`].
    #[default]
    Strict,
    /// Drop the token and keep going.
    Skip,
}

/// Stateless ContextObject decoder; only carries the malformed-pair policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    policy: MalformedPolicy,
}

impl Codec {
    pub const fn new(policy: MalformedPolicy) -> Self {
        Codec { policy }
    }

    /// Split `raw` into its `(key, decoded value)` pairs, in order.
    ///
    /// Each `&`-separated token is split on its first `=`; the key is kept verbatim and the value
    /// is URL-decoded. The empty string has no pairs.
    pub fn decode_pairs<'a>(&self, raw: &'a str) -> Result<Vec<(&'a str, String)>> {
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        let mut pairs = Vec::new();
        for token in raw.split('&') {
            match token.split_once('=') {
                Some((key, value)) => pairs.push((key, decode_component(value).into_owned())),
                None => match self.policy {
                    MalformedPolicy::Strict => {
                        return Err(Error::MalformedContextObject {
                            pair: token.to_string(),
                        });
                    }
                    MalformedPolicy::Skip => {
                        tracing::debug!(pair = token, "skipping malformed ContextObject pair");
                    }
                },
            }
        }
        Ok(pairs)
    }

    pub fn decode_fields(&self, raw: &str) -> Result<DecodedFields> {
        Ok(self.decode_pairs(raw)?.into_iter().collect())
    }

    /// Decode `raw` and keep only `rft_id`, `rft_val_fmt` and `rft.*` keys.
    ///
    /// The fold walks the decoded fields in first-occurrence order. A key that repeated in `raw`
    /// contributes the last of its values, as though each occurrence had been assigned in turn.
    pub fn decode_metadata(&self, raw: &str) -> Result<MetadataRecord> {
        let fields = self.decode_fields(raw)?;
        let mut record = MetadataRecord::default();
        for (key, value) in fields.iter() {
            if let Some(v) = value.last() {
                record.assign(key, v);
            }
        }
        Ok(record)
    }
}

/// Decode `raw` with the default (strict) codec.
pub fn decode_fields(raw: &str) -> Result<DecodedFields> {
    Codec::default().decode_fields(raw)
}

/// Decode `raw` into a [`MetadataRecord`] with the default (strict) codec.
pub fn decode_metadata(raw: &str) -> Result<MetadataRecord> {
    Codec::default().decode_metadata(raw)
}

/// Write `fields` back out as a raw ContextObject.
///
/// Keys are emitted verbatim and values percent-encoded; a sequence value produces one pair per
/// element.
pub fn encode_fields(fields: &DecodedFields) -> String {
    let mut out = String::new();
    for (key, value) in fields.iter() {
        for v in value.values() {
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str(key);
            out.push('=');
            out.push_str(&encode_component(v));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(s: &str) -> FieldValue {
        FieldValue::Scalar(s.to_string())
    }

    fn seq(vs: &[&str]) -> FieldValue {
        FieldValue::Sequence(vs.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn repeated_key_becomes_sequence() {
        let f = decode_fields("a=1&a=2&a=3").unwrap();
        assert_eq!(f.len(), 1);
        assert_eq!(f.get("a"), Some(&seq(&["1", "2", "3"])));

        let f = decode_fields("a=1&a=2").unwrap();
        assert_eq!(f.get("a"), Some(&seq(&["1", "2"])));
        assert_eq!(f.get("a").and_then(FieldValue::last), Some("2"));
        assert_eq!(scalar("x").last(), Some("x"));
    }

    #[test]
    fn first_occurrence_fixes_order() {
        let f = decode_fields("b=1&a=2&b=3&c=4").unwrap();
        assert_eq!(f.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(f.get("b"), Some(&seq(&["1", "3"])));
        assert_eq!(f.get("a"), Some(&scalar("2")));
    }

    #[test]
    fn splits_on_first_equals_only() {
        let f = decode_fields("rft_id=http://x.org/?a=b&k=").unwrap();
        assert_eq!(f.get("rft_id"), Some(&scalar("http://x.org/?a=b")));
        assert_eq!(f.get("k"), Some(&scalar("")));
    }

    #[test]
    fn keys_are_not_decoded() {
        let f = decode_fields("rft.a%20b=c+d").unwrap();
        assert_eq!(f.get("rft.a%20b"), Some(&scalar("c d")));
    }

    #[test]
    fn empty_string_is_empty() {
        assert!(decode_fields("").unwrap().is_empty());
        assert!(decode_metadata("").unwrap().is_empty());
    }

    #[test]
    fn strict_policy_rejects_pair_without_equals() {
        let err = decode_fields("a=1&broken&b=2").unwrap_err();
        match err {
            Error::MalformedContextObject { pair } => assert_eq!(pair, "broken"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(decode_metadata("rft.title=x&&rft.au=y").is_err());
    }

    #[test]
    fn skip_policy_drops_pair_without_equals() {
        let codec = Codec::new(MalformedPolicy::Skip);
        let f = codec.decode_fields("a=1&broken&b=2&").unwrap();
        assert_eq!(f.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        let m = codec.decode_metadata("rft.title=x&&rft.au=y").unwrap();
        assert_eq!(m.metadata.len(), 2);
    }

    #[test]
    fn metadata_extraction() {
        let m = decode_metadata(
            "rft_id=info:doi/10.1/x&rft_val_fmt=info:ofi/fmt:kev:mtx:journal&rft.atitle=Hello%20World",
        )
        .unwrap();
        assert_eq!(m.id.as_deref(), Some("info:doi/10.1/x"));
        assert_eq!(m.format.as_deref(), Some("info:ofi/fmt:kev:mtx:journal"));
        assert_eq!(m.metadata.len(), 1);
        assert_eq!(m.metadata.get("atitle").map(String::as_str), Some("Hello World"));
    }

    #[test]
    fn metadata_drops_other_keys() {
        let m = decode_metadata("url_ver=Z39.88-2004&ctx_ver=Z39.88-2004&rfr_id=info:sid/x&rft=y")
            .unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn metadata_is_last_wins() {
        let m = decode_metadata("rft_id=a&rft.au=X&rft_id=b&rft.au=Y&rft.date=2001").unwrap();
        assert_eq!(m.id.as_deref(), Some("b"));
        assert_eq!(m.metadata.get("au").map(String::as_str), Some("Y"));
        assert_eq!(
            m.metadata.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["au", "date"]
        );

        // The general fields keep every value for the same input.
        let f = decode_fields("rft_id=a&rft.au=X&rft_id=b&rft.au=Y").unwrap();
        assert_eq!(f.get("rft_id"), Some(&seq(&["a", "b"])));
    }

    #[test]
    fn field_values_serialize_as_string_or_array() {
        let f = decode_fields("a=1&b=2&b=3").unwrap();
        let json = serde_json::to_string(&f).unwrap();
        assert_eq!(json, r#"{"a":"1","b":["2","3"]}"#);
    }

    #[test]
    fn record_serialization_omits_absent_parts() {
        let m = decode_metadata("rft.btitle=Book").unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"metadata":{"btitle":"Book"}}"#);
    }

    #[test]
    fn encode_emits_one_pair_per_value() {
        let f = decode_fields("a=x+y&b=1&a=2").unwrap();
        assert_eq!(encode_fields(&f), "a=x%20y&a=2&b=1");
    }

    #[test]
    fn decoding_is_deterministic() {
        proptest::proptest!(|(raw in "[a-z_.]{1,6}=[A-Za-z0-9%+ ]{0,12}(&[a-z_.]{1,6}=[A-Za-z0-9%+ ]{0,12}){0,5}")| {
            let a = decode_fields(&raw).unwrap();
            let b = decode_fields(&raw).unwrap();
            proptest::prop_assert_eq!(a, b);
        })
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let pair = ("[a-z][a-z_.]{0,8}", "\\PC{0,16}");
        proptest::proptest!(|(pairs in proptest::collection::vec(pair, 0..8))| {
            let fields: DecodedFields = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            let raw = encode_fields(&fields);
            proptest::prop_assert_eq!(decode_fields(&raw).unwrap(), fields);
        })
    }
}
