//! # seisprov-prov — PROV Serializations
//!
//! Turns bytes into a [`ProvDocument`] and back:
//!
//! - [`format::sniff_format`] decides between PROV-XML and PROV-JSON.
//! - [`xml::read_xml`] and [`json::read_json`] build the in-memory graph.
//! - [`xml::write_xml`] serializes a graph to PROV-XML.
//! - [`structure::ProvXmlStructure`] checks the generic PROV-XML structure,
//!   behind the [`structure::StructuralValidator`] trait.
//!
//! Nothing here knows about the SEIS-PROV rule schema.
//!
//! ## Crate Policy
//!
//! - Depends only on `seisprov-core` inside the workspace.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod format;
pub mod json;
pub mod structure;
pub mod xml;

mod vocab;

pub use error::{Diagnostics, ParseError, StructureDiagnostic, StructureError, WriteError};
pub use format::{decode_text, sniff_format, DocumentFormat, Sniffed};
pub use structure::{ProvXmlStructure, StructuralValidator};

use seisprov_core::ProvDocument;

/// Read a document in the given format.
///
/// # Errors
///
/// Returns [`ParseError::Encoding`] or [`ParseError::UnsupportedEncoding`]
/// for input that cannot be decoded (see [`format::decode_text`]) and any
/// error of the format's reader.
pub fn read_document(bytes: &[u8], format: DocumentFormat) -> Result<ProvDocument, ParseError> {
    let text = format::decode_text(bytes)?;
    match format {
        DocumentFormat::Xml => xml::read_xml(&text),
        DocumentFormat::Json => json::read_json(&text),
    }
}

/// The PROV-XML text to run a structural check on: the source itself for
/// XML input, a re-serialization of the parsed document for JSON input.
///
/// # Errors
///
/// Returns [`StructureError::Write`] if re-serialization fails.
pub fn structural_source(
    bytes: &[u8],
    format: DocumentFormat,
    document: &ProvDocument,
) -> Result<String, StructureError> {
    match format {
        DocumentFormat::Xml => Ok(format::decode_text(bytes)?.into_owned()),
        DocumentFormat::Json => Ok(xml::write_xml(document)?),
    }
}
