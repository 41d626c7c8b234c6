//! A minimal owned XML element tree.
//!
//! PROV-XML documents are small, so both the reader and the structure check
//! work on a fully materialized tree instead of the raw event stream. Names
//! are kept exactly as written (`prefix:local`); namespace resolution
//! happens in the consumers, which track scopes themselves.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use seisprov_core::Namespace;

use crate::error::ParseError;

/// One XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Element name as written.
    pub name: String,
    /// Attributes as `(name as written, unescaped value)`.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
    /// Concatenated character data (trimmed by the tokenizer).
    pub text: String,
    /// 1-based line of the start tag.
    pub line: usize,
}

impl XmlElement {
    /// Split the element name into `(prefix, local)`; the prefix is empty
    /// for unprefixed names.
    pub fn split_name(&self) -> (&str, &str) {
        split_qname(&self.name)
    }

    /// `xmlns` / `xmlns:p` declarations on this element.
    pub fn namespace_declarations(&self) -> Vec<Namespace> {
        self.attributes
            .iter()
            .filter_map(|(key, value)| {
                if key == "xmlns" {
                    Some(Namespace::new("", value.as_str()))
                } else {
                    key.strip_prefix("xmlns:")
                        .map(|prefix| Namespace::new(prefix, value.as_str()))
                }
            })
            .collect()
    }

    /// Attributes that are not namespace declarations.
    pub fn plain_attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .filter(|(key, _)| key != "xmlns" && !key.starts_with("xmlns:"))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Split `prefix:local` into its parts.
pub fn split_qname(name: &str) -> (&str, &str) {
    name.split_once(':').unwrap_or(("", name))
}

/// Parse a complete XML document into its root element.
///
/// # Errors
///
/// Returns [`ParseError::MalformedXml`] if the input is not a single
/// well-formed element tree (unbalanced tags, text outside the root,
/// several roots, or no element at all).
pub fn parse(text: &str) -> Result<XmlElement, ParseError> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut lines = LineTracker::new(text);

    loop {
        let line = lines.line_at(reader.buffer_position());
        let event = reader.read_event().map_err(|e| ParseError::MalformedXml {
            line,
            reason: e.to_string(),
        })?;
        match event {
            Event::Start(start) => {
                stack.push(open(&start, line)?);
            }
            Event::Empty(start) => {
                let element = open(&start, line)?;
                attach(&mut stack, &mut root, element, line)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| ParseError::MalformedXml {
                    line,
                    reason: "closing tag without an open element".to_string(),
                })?;
                attach(&mut stack, &mut root, element, line)?;
            }
            Event::Text(t) => {
                let value = t.unescape().map_err(|e| ParseError::MalformedXml {
                    line,
                    reason: e.to_string(),
                })?;
                match stack.last_mut() {
                    Some(parent) => parent.text.push_str(&value),
                    None => {
                        return Err(ParseError::MalformedXml {
                            line,
                            reason: "character data outside of the root element".to_string(),
                        })
                    }
                }
            }
            Event::CData(data) => match stack.last_mut() {
                Some(parent) => parent.text.push_str(&String::from_utf8_lossy(&data)),
                None => {
                    return Err(ParseError::MalformedXml {
                        line,
                        reason: "CDATA outside of the root element".to_string(),
                    })
                }
            },
            Event::Eof => break,
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    if let Some(open_element) = stack.last() {
        return Err(ParseError::MalformedXml {
            line: open_element.line,
            reason: format!("element '{}' is never closed", open_element.name),
        });
    }
    root.ok_or_else(|| ParseError::MalformedXml {
        line: 1,
        reason: "no root element".to_string(),
    })
}

fn open(start: &BytesStart<'_>, line: usize) -> Result<XmlElement, ParseError> {
    let malformed = |reason: String| ParseError::MalformedXml { line, reason };
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| malformed(e.to_string()))?
        .to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| malformed(e.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
        line,
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    line: usize,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::MalformedXml {
            line,
            reason: "more than one root element".to_string(),
        });
    }
    *root = Some(element);
    Ok(())
}

/// Maps byte offsets to line numbers. The tokenizer only moves forward, so
/// newlines are counted once, from the last position asked about.
struct LineTracker<'t> {
    bytes: &'t [u8],
    position: usize,
    line: usize,
}

impl<'t> LineTracker<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            bytes: text.as_bytes(),
            position: 0,
            line: 1,
        }
    }

    /// 1-based line of the first markup at or after `offset`.
    fn line_at(&mut self, offset: usize) -> usize {
        let start = offset.min(self.bytes.len());
        let markup = self.bytes[start..]
            .iter()
            .position(|b| *b == b'<')
            .map_or(start, |i| start + i);
        if markup < self.position {
            self.position = 0;
            self.line = 1;
        }
        let newlines = self.bytes[self.position..markup]
            .iter()
            .filter(|b| **b == b'\n')
            .count();
        self.line += newlines;
        self.position = markup;
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_tree_with_lines() {
        let xml = "<?xml version='1.0'?>\n<a xmlns:p=\"urn:p\">\n  <p:b x=\"1\">hi &amp; bye</p:b>\n  <c/>\n</a>\n";
        let root = parse(xml).unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.line, 2);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].text, "hi & bye");
        assert_eq!(root.children[0].line, 3);
        assert_eq!(root.children[0].split_name(), ("p", "b"));
        assert_eq!(root.children[1].line, 4);
        assert_eq!(root.namespace_declarations(), vec![Namespace::new("p", "urn:p")]);
        assert_eq!(root.plain_attributes().count(), 0);
    }

    #[test]
    fn test_lines_of_a_long_document() {
        let mut xml = String::from("<root>\n");
        for i in 0..500 {
            xml.push_str(&format!("  <item n=\"{i}\">\n    <value>{i}</value>\n  </item>\n"));
        }
        xml.push_str("</root>\n");
        let root = parse(&xml).unwrap();
        assert_eq!(root.children.len(), 500);
        for (i, item) in root.children.iter().enumerate() {
            assert_eq!(item.line, 2 + 3 * i);
            assert_eq!(item.children[0].line, 3 + 3 * i);
        }
    }

    #[test]
    fn test_error_line_after_many_elements() {
        let mut xml = String::from("<root>\n");
        for _ in 0..200 {
            xml.push_str("  <a/>\n");
        }
        xml.push_str("  </b>\n</root>\n");
        match parse(&xml) {
            Err(ParseError::MalformedXml { line, .. }) => assert_eq!(line, 202),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_mismatched_tags() {
        assert!(parse("<a><b></a></b>").is_err());
    }

    #[test]
    fn test_rejects_plain_text() {
        assert!(parse("just some words").is_err());
        assert!(parse("{\"a\": 1}").is_err());
    }

    #[test]
    fn test_rejects_unclosed_and_multiple_roots() {
        assert!(parse("<a><b/>").is_err());
        assert!(parse("<a/><b/>").is_err());
        assert!(parse("").is_err());
    }
}
