use std::borrow::Cow;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

/// Characters escaped when writing a ContextObject value.
///
/// Anything that would change how the pair is split back apart (`&`, `=`), how it is decoded
/// (`%`, `+`) or where the URL ends (`#`) must go, along with whitespace and controls.
const VALUE_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Decode a form-style URL component.
///
/// `+` becomes a space before `%XX` escapes are resolved, so `%2B` still yields a literal `+`.
/// A `%` that is not followed by two hex digits is kept as is, and byte sequences that are not
/// valid UTF-8 after decoding are replaced rather than rejected.
pub fn decode_component(s: &str) -> Cow<'_, str> {
    let plus_free: Cow<'_, str> = if s.contains('+') {
        Cow::Owned(s.replace('+', " "))
    } else {
        Cow::Borrowed(s)
    };
    match plus_free {
        Cow::Borrowed(b) => percent_decode_str(b).decode_utf8_lossy(),
        Cow::Owned(o) => Cow::Owned(percent_decode_str(&o).decode_utf8_lossy().into_owned()),
    }
}

pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, VALUE_ENCODE_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_and_percent_twenty_are_spaces() {
        assert_eq!(decode_component("Hello+World"), "Hello World");
        assert_eq!(decode_component("Hello%20World"), "Hello World");
        assert_eq!(decode_component("a%2Bb"), "a+b");
    }

    #[test]
    fn invalid_escapes_pass_through() {
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz%4"), "%zz%4");
        assert_eq!(decode_component("%E2%80%93"), "\u{2013}");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(decode_component("%FF"), "\u{FFFD}");
    }

    #[test]
    fn encode_escapes_delimiters() {
        assert_eq!(encode_component("a b&c=d+e%"), "a%20b%26c%3Dd%2Be%25");
        assert_eq!(encode_component("info:doi/10.1/x"), "info:doi/10.1/x");
    }

    #[test]
    fn decode_inverts_encode() {
        proptest::proptest!(|(s in "\\PC{0,48}")| {
            let enc = encode_component(&s);
            proptest::prop_assert_eq!(decode_component(&enc), s.as_str());
        })
    }
}
