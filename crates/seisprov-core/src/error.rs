//! # Error Types
//!
//! Errors raised while building the in-memory PROV graph. Readers in
//! `seisprov-prov` wrap these into their own parse errors; nothing here is
//! a validation verdict.

use thiserror::Error;

/// Error in the construction of core PROV values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A `prefix:local` name uses a prefix that is not declared in scope.
    #[error("unknown namespace prefix '{prefix}' in qualified name '{name}'")]
    UnknownPrefix {
        /// The undeclared prefix.
        prefix: String,
        /// The full name as written.
        name: String,
    },

    /// A name without prefix was used while no default namespace is declared.
    #[error("'{0}' has no prefix and no default namespace is declared")]
    NoDefaultNamespace(String),

    /// The text cannot be read as a qualified name at all.
    #[error("invalid qualified name: '{0}'")]
    InvalidQualifiedName(String),

    /// The text is not a valid `xsd:dateTime` lexical value.
    #[error("invalid xsd:dateTime '{value}': {reason}")]
    InvalidDateTime {
        /// The rejected text.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
}
