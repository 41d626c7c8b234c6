//! # Error Types
//!
//! Three failure families, kept apart because the document validator
//! reports them differently:
//!
//! - [`ParseError`]: the input could not be read into a [`ProvDocument`]
//!   at all.
//! - [`WriteError`]: a document could not be serialized to PROV-XML.
//! - [`StructureError`]: the document was read but does not follow the
//!   PROV-XML structure (missing ids, missing roles, bad typed values).
//!
//! [`ProvDocument`]: seisprov_core::ProvDocument

use std::fmt;

use seisprov_core::CoreError;
use thiserror::Error;

/// Error reading a PROV document.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The XML is not well formed.
    #[error("malformed XML on line {line}: {reason}")]
    MalformedXml {
        /// 1-based line of the offending markup.
        line: usize,
        /// Diagnostic from the XML tokenizer.
        reason: String,
    },

    /// The JSON is not well formed.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// The input bytes are not UTF-8.
    #[error("input is not valid UTF-8")]
    Encoding,

    /// The XML declaration names an encoding that cannot be decoded.
    #[error("unsupported character encoding '{0}'")]
    UnsupportedEncoding(String),

    /// The XML root element is not `prov:document`.
    #[error("root element '{0}' is not a prov:document")]
    UnexpectedRoot(String),

    /// A construct that the PROV serialization does not allow.
    #[error("{context}: {reason}")]
    Invalid {
        /// Where the problem was found (element, key, or record id).
        context: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A qualified name or typed value could not be built.
    #[error("line {line}: {source}")]
    Name {
        /// 1-based line (0 for JSON input).
        line: usize,
        /// Underlying core error.
        #[source]
        source: CoreError,
    },

    /// Core value construction failed outside of any positional context.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ParseError {
    pub(crate) fn invalid(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Error serializing a document to PROV-XML.
#[derive(Error, Debug)]
pub enum WriteError {
    /// The XML writer rejected an event.
    #[error("XML writer error: {0}")]
    Xml(String),

    /// The produced bytes are not UTF-8.
    #[error("serialized XML is not valid UTF-8")]
    Encoding,
}

impl From<quick_xml::Error> for WriteError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

/// A single structural problem, located by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureDiagnostic {
    /// 1-based line of the element start tag.
    pub line: usize,
    /// The element as written, e.g. `prov:entity`.
    pub element: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for StructureDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: element '{}': {}",
            self.line, self.element, self.message
        )
    }
}

/// All structural diagnostics of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Diagnostics in document order.
    pub items: Vec<StructureDiagnostic>,
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\t")?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

/// Error raised by a structural validator.
#[derive(Error, Debug)]
pub enum StructureError {
    /// The document violates the PROV-XML structure.
    #[error("document does not follow the PROV-XML structure:\n\t{diagnostics}")]
    Invalid {
        /// Every problem found.
        diagnostics: Diagnostics,
    },

    /// The XML to check is not even well formed.
    #[error("structural check could not read the XML: {0}")]
    Malformed(#[from] ParseError),

    /// A JSON source could not be re-serialized for the check.
    #[error(transparent)]
    Write(#[from] WriteError),
}
