//! # Format Detection
//!
//! The caller never declares the serialization. [`sniff_format`] tries a
//! JSON parse and an XML well-formedness parse on the same stream,
//! rewinding to the starting position after each attempt so the stream can
//! be read again afterwards.
//!
//! Input is UTF-8 unless an XML declaration names ISO-8859-1 (Latin-1);
//! [`decode_text`] turns either into text.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ParseError;
use crate::xml::tree;

/// Labels of ISO-8859-1, compared case-insensitively.
const LATIN1_LABELS: [&str; 6] = [
    "iso-8859-1",
    "iso8859-1",
    "iso_8859-1",
    "latin1",
    "latin-1",
    "l1",
];

/// A supported PROV serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// PROV-XML.
    Xml,
    /// PROV-JSON.
    Json,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml => f.write_str("xml"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Outcome of format detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sniffed {
    /// Exactly one format parsed.
    Format(DocumentFormat),
    /// Neither parse succeeded.
    Neither,
    /// Both parses succeeded, which well-formed inputs cannot do.
    Both,
}

/// Detect the serialization of the stream starting at its current position.
///
/// The stream position is restored before returning.
///
/// # Errors
///
/// Returns the underlying I/O error if the stream cannot be read or
/// repositioned. Content problems are never errors; they yield
/// [`Sniffed::Neither`].
pub fn sniff_format<R: Read + Seek>(stream: &mut R) -> io::Result<Sniffed> {
    let start = stream.stream_position()?;

    let is_json = probe(stream, |bytes| {
        serde_json::from_slice::<serde::de::IgnoredAny>(bytes).is_ok()
    })?;
    stream.seek(SeekFrom::Start(start))?;

    let is_xml = probe(stream, |bytes| {
        decode_text(bytes).is_ok_and(|text| tree::parse(&text).is_ok())
    })?;
    stream.seek(SeekFrom::Start(start))?;

    Ok(match (is_json, is_xml) {
        (true, false) => Sniffed::Format(DocumentFormat::Json),
        (false, true) => Sniffed::Format(DocumentFormat::Xml),
        (false, false) => Sniffed::Neither,
        (true, true) => Sniffed::Both,
    })
}

fn probe<R: Read>(stream: &mut R, accepts: impl Fn(&[u8]) -> bool) -> io::Result<bool> {
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    Ok(accepts(&bytes))
}

/// Decode input bytes: UTF-8 (a byte order mark is dropped), or the
/// encoding named by the XML declaration when the bytes are not UTF-8.
///
/// # Errors
///
/// Returns [`ParseError::Encoding`] for non-UTF-8 input without a usable
/// declaration and [`ParseError::UnsupportedEncoding`] when the declared
/// encoding is neither UTF-8 nor ISO-8859-1.
pub fn decode_text(bytes: &[u8]) -> Result<Cow<'_, str>, ParseError> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(Cow::Borrowed(strip_bom(text)));
    }
    let label = declared_encoding(bytes).ok_or(ParseError::Encoding)?;
    let normalized = label.trim().to_ascii_lowercase();
    if LATIN1_LABELS.contains(&normalized.as_str()) {
        return Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()));
    }
    if matches!(normalized.as_str(), "utf-8" | "utf8") {
        return Err(ParseError::Encoding);
    }
    Err(ParseError::UnsupportedEncoding(label))
}

/// The `encoding` of a leading XML declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => {
            let encoding = decl.encoding()?.ok()?;
            Some(String::from_utf8_lossy(&encoding).into_owned())
        }
        _ => None,
    }
}

/// Drop a leading UTF-8 byte order mark.
fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}
