use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::document::Document;
use crate::error::{Error, Result};

/// One element of an XML document, flattened out of the tree in document order.
#[derive(Debug, Clone)]
struct XmlElement {
    /// Local name, without any namespace prefix.
    name: String,
    /// Attributes keyed by their name as written, prefix included.
    attrs: Vec<(String, String)>,
}

impl XmlElement {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A well-formed XML (or XHTML) document.
///
/// Only elements and their attributes are retained; that is all marker scanning looks at.
pub struct XmlDocument {
    elements: Vec<XmlElement>,
}

impl XmlDocument {
    pub fn parse(input: &str) -> Result<Self> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().check_end_names = true;

        let mut elements = Vec::new();
        let mut open: Vec<String> = Vec::new();
        let mut seen_root = false;
        loop {
            let event = reader.read_event().map_err(|e| Error::Parse {
                message: format!("XML error at byte {}: {e}", reader.error_position()),
            })?;
            match event {
                Event::Eof => break,
                Event::Start(e) => {
                    let el = element_of(&reader, &e)?;
                    if open.is_empty() {
                        check_single_root(&mut seen_root, &el.name)?;
                    }
                    open.push(el.name.clone());
                    elements.push(el);
                }
                Event::Empty(e) => {
                    let el = element_of(&reader, &e)?;
                    if open.is_empty() {
                        check_single_root(&mut seen_root, &el.name)?;
                    }
                    elements.push(el);
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::Text(t) if open.is_empty() => {
                    if !t.iter().all(u8::is_ascii_whitespace) {
                        return Err(Error::Parse {
                            message: "text outside the root element".to_string(),
                        });
                    }
                }
                Event::CData(_) if open.is_empty() => {
                    return Err(Error::Parse {
                        message: "CDATA outside the root element".to_string(),
                    });
                }
                _ => {}
            }
        }

        if let Some(name) = open.last() {
            return Err(Error::Parse {
                message: format!("unclosed element <{name}> at end of document"),
            });
        }
        Ok(XmlDocument { elements })
    }
}

fn check_single_root(seen_root: &mut bool, name: &str) -> Result<()> {
    if *seen_root {
        return Err(Error::Parse {
            message: format!("second root element <{name}>"),
        });
    }
    *seen_root = true;
    Ok(())
}

fn element_of(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(e.name().local_name().as_ref()).to_string();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Parse {
            message: format!("bad attribute on <{name}>: {err}"),
        })?;
        // Full qualified name: `f:class` is not `class`.
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|err| Error::Parse {
                message: format!("bad value for attribute {key} on <{name}>: {err}"),
            })?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(XmlElement { name, attrs })
}

impl Document for XmlDocument {
    fn attribute_by_class(&self, tag: &str, class: &str, attr: &str) -> Vec<Option<String>> {
        self.elements
            .iter()
            .filter(|e| e.name == tag && e.attr("class") == Some(class))
            .map(|e| e.attr(attr).map(str::to_string))
            .collect()
    }
}
