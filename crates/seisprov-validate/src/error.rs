//! # Validation Errors
//!
//! Every problem the validator can report, grouped by [`ErrorCategory`].
//! The `Display` text of each variant is the message a user sees.
//!
//! Only [`ErrorCategory::Internal`] errors stop a document early; all
//! others are collected.

use std::fmt;

use seisprov_schema::SchemaError;
use thiserror::Error;

/// Coarse grouping of [`ValidationError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The input could not be opened or recognized.
    Input,
    /// The input is not a structurally valid PROV document.
    Structural,
    /// A record could not be mapped to a SEIS-PROV definition.
    Classification,
    /// A record has the wrong identifier, label, or attribute set.
    RecordShape,
    /// An attribute value has the wrong type or form.
    Value,
    /// A problem spanning the whole document.
    Document,
    /// A defect of the rule schema or the validator itself.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "input",
            Self::Structural => "structural",
            Self::Classification => "classification",
            Self::RecordShape => "record-shape",
            Self::Value => "value",
            Self::Document => "document",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

fn quoted(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("'{i}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single validation problem.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    // ---- input ----
    /// The path does not exist.
    #[error("Path '{path}' does not exist.")]
    PathNotFound {
        /// The path as given.
        path: String,
    },

    /// The path exists but is not a regular file.
    #[error("Path '{path}' is not a file.")]
    NotAFile {
        /// The path as given.
        path: String,
    },

    /// The input could not be read.
    #[error("Could not read '{source_name}': {reason}")]
    Read {
        /// Path or stream description.
        source_name: String,
        /// Underlying I/O error text.
        reason: String,
    },

    /// Neither JSON nor XML.
    #[error("File is neither a valid JSON nor a valid XML file.")]
    UnknownFormat,

    // ---- structural ----
    /// The PROV reader rejected the document.
    #[error("Could not parse the file as a PROV document: {reason}")]
    Parse {
        /// Reader message.
        reason: String,
    },

    /// The document failed the PROV-XML structural check.
    #[error("SEIS-PROV document did not pass validation against the PROV-XML schema:\n\t{details}")]
    Structure {
        /// Diagnostics, one per line, tab-indented.
        details: String,
    },

    // ---- classification ----
    /// Several `prov:type` values on a SEIS-PROV record.
    #[error("Record '{record}' has {count} prov:type's set. Only one is allowed as soon as any prov:type or the record's id is in the SEIS-PROV namespace.")]
    TooManyTypes {
        /// Record identifier.
        record: String,
        /// Number of `prov:type` values.
        count: usize,
    },

    /// A SEIS-PROV identifier without `prov:type`.
    #[error("Record '{record}' has an id in the SEIS-PROV namespace but no prov:type attribute. This is not allowed.")]
    MissingType {
        /// Record identifier.
        record: String,
    },

    /// A SEIS-PROV `prov:type` on a record whose id is elsewhere.
    #[error("Record '{record}' has a prov:type attribute in the SEIS-PROV namespace but its id is not part of the namespace. This is not allowed.")]
    ForeignIdentifier {
        /// Record identifier.
        record: String,
    },

    /// A SEIS-PROV identifier with a `prov:type` that maps to nothing.
    #[error("Record '{record}' has an id in the SEIS-PROV namespace but its prov:type is neither in the SEIS-PROV namespace nor is it a person, an organization, or a software agent. This is not allowed.")]
    UnsupportedType {
        /// Record identifier.
        record: String,
    },

    /// The `prov:type` uses another prefix than the one bound to the
    /// SEIS-PROV namespace.
    #[error("Record {prov_type} does not start with {prefix}:")]
    ForeignPrefix {
        /// The `prov:type` as written.
        prov_type: String,
        /// The prefix bound to the SEIS-PROV namespace.
        prefix: String,
    },

    /// A record kind without a schema section.
    #[error("{kind} not a record type that is valid for SEIS-PROV.")]
    InvalidRecordKind {
        /// The record kind, e.g. `prov:Usage`.
        kind: String,
    },

    /// A type name not defined in the schema section.
    #[error("prov:type '{prov_type}' of record type '{kind}' is not known to SEIS-PROV.")]
    UnknownType {
        /// The stripped type name.
        prov_type: String,
        /// The record kind.
        kind: String,
    },

    // ---- record shape ----
    /// An identifier that does not follow the SEIS-PROV form.
    #[error("The local part of the identifier '{identifier}' does not match the regular expression '{pattern}' as is required by the standard.")]
    InvalidIdentifier {
        /// The full identifier.
        identifier: String,
        /// The expected form.
        pattern: String,
    },

    /// No `prov:label`.
    #[error("Record '{record}' does not have a prov:label set.")]
    MissingLabel {
        /// Record identifier.
        record: String,
    },

    /// Several `prov:label` values.
    #[error("Record '{record}' has {count} prov:label's set. Only one is allowed.")]
    MultipleLabels {
        /// Record identifier.
        record: String,
        /// Number of labels.
        count: usize,
    },

    /// A label other than the definition's.
    #[error("Record '{record}' has label '{found}' instead of '{expected}'.")]
    WrongLabel {
        /// Record identifier.
        record: String,
        /// Label on the record.
        found: String,
        /// Label of the definition.
        expected: String,
    },

    /// Required attributes are absent.
    #[error("Record '{record}' misses the following required attributes in the SEIS-PROV namespace: {}", quoted(.missing))]
    MissingAttributes {
        /// Record identifier.
        record: String,
        /// Missing attribute names, sorted.
        missing: Vec<String>,
    },

    /// An attribute the definition does not declare.
    #[error("Record '{record}' has an additional attribute in the SEIS-PROV namespace: '{attribute}'. This is not allowed for this record type.")]
    UnexpectedAttribute {
        /// Record identifier.
        record: String,
        /// Attribute local part.
        attribute: String,
    },

    // ---- value ----
    /// A value none of the declared types accepts.
    #[error("Attribute '{attribute}' of record '{record}' has an invalid type '{found}'. Valid types: {expected}")]
    InvalidType {
        /// Attribute local part.
        attribute: String,
        /// Record identifier.
        record: String,
        /// Runtime type of the value.
        found: String,
        /// Declared types, comma separated.
        expected: String,
    },

    /// A value that does not match the attribute pattern.
    #[error("Attribute '{attribute}' in record '{record}' with the value '{value}' does not match the regex '{pattern}'.")]
    PatternMismatch {
        /// Attribute local part.
        attribute: String,
        /// Record identifier.
        record: String,
        /// The value text.
        value: String,
        /// The authored pattern.
        pattern: String,
    },

    // ---- document ----
    /// No records at all.
    #[error("File does not contain a single provenance record.")]
    NoRecords,

    /// The SEIS-PROV namespace is not declared (strict policy).
    #[error("SEIS-PROV namespace not found in document!")]
    NamespaceNotFound,

    /// Identifier local parts used more than once.
    #[error("One or more ids have been used more than once: {}", quoted(.ids))]
    DuplicateIds {
        /// Duplicated local parts, sorted, each once.
        ids: Vec<String>,
    },

    // ---- internal ----
    /// The rule schema is broken.
    #[error("Internal schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Both format probes succeeded.
    #[error("Internal error: the input parsed both as JSON and as XML.")]
    AmbiguousFormat,

    /// A pattern on an attribute that does not accept strings.
    #[error("Internal schema error: attribute '{attribute}' of '{definition}' has a pattern but does not accept xsd:string.")]
    PatternOnNonString {
        /// Definition name.
        definition: String,
        /// Attribute name.
        attribute: String,
    },
}

impl ValidationError {
    /// The category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PathNotFound { .. }
            | Self::NotAFile { .. }
            | Self::Read { .. }
            | Self::UnknownFormat => ErrorCategory::Input,
            Self::Parse { .. } | Self::Structure { .. } => ErrorCategory::Structural,
            Self::TooManyTypes { .. }
            | Self::MissingType { .. }
            | Self::ForeignIdentifier { .. }
            | Self::UnsupportedType { .. }
            | Self::ForeignPrefix { .. }
            | Self::InvalidRecordKind { .. }
            | Self::UnknownType { .. } => ErrorCategory::Classification,
            Self::InvalidIdentifier { .. }
            | Self::MissingLabel { .. }
            | Self::MultipleLabels { .. }
            | Self::WrongLabel { .. }
            | Self::MissingAttributes { .. }
            | Self::UnexpectedAttribute { .. } => ErrorCategory::RecordShape,
            Self::InvalidType { .. } | Self::PatternMismatch { .. } => ErrorCategory::Value,
            Self::NoRecords | Self::NamespaceNotFound | Self::DuplicateIds { .. } => {
                ErrorCategory::Document
            }
            Self::Schema(_) | Self::AmbiguousFormat | Self::PatternOnNonString { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    /// True if validation of the document must stop.
    pub fn is_internal(&self) -> bool {
        self.category() == ErrorCategory::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attributes_message() {
        let err = ValidationError::MissingAttributes {
            record: "seis_prov:sp001_sa_9876543".into(),
            missing: vec!["software_version".into(), "website".into()],
        };
        assert_eq!(
            err.to_string(),
            "Record 'seis_prov:sp001_sa_9876543' misses the following required \
             attributes in the SEIS-PROV namespace: 'software_version', 'website'"
        );
        assert_eq!(err.category(), ErrorCategory::RecordShape);
    }

    #[test]
    fn test_duplicate_ids_message() {
        let err = ValidationError::DuplicateIds {
            ids: vec!["sp001_wf_a34j4didj3".into(), "sp002_dt_f8b2h3n4k2".into()],
        };
        assert_eq!(
            err.to_string(),
            "One or more ids have been used more than once: \
             'sp001_wf_a34j4didj3', 'sp002_dt_f8b2h3n4k2'"
        );
    }

    #[test]
    fn test_internal_errors() {
        assert!(ValidationError::AmbiguousFormat.is_internal());
        assert!(ValidationError::Schema(SchemaError::UnknownType("x".into())).is_internal());
        assert!(!ValidationError::NoRecords.is_internal());
        assert_eq!(ValidationError::UnknownFormat.category(), ErrorCategory::Input);
    }
}
