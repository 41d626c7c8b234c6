//! # Record Validation
//!
//! Applies a [`Definition`] to one in-scope record. The checks run as
//! gates; the first failing gate ends validation of the record:
//!
//! 1. classification ([`classify`]);
//! 2. identifier form, then exactly one matching `prov:label`;
//! 3. required attributes, then every attribute in the target namespace
//!    (declared, well typed, matching its pattern).
//!
//! Only records passing every gate report their identifier's local part
//! for duplicate detection.

use seisprov_core::{NamespaceScope, QualifiedName, Record};
use seisprov_schema::{Definition, Schema};

use crate::classify::{classify, Classification};
use crate::error::ValidationError;

/// Outcome of [`validate_record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// Not a SEIS-PROV record.
    OutOfScope,
    /// A valid SEIS-PROV record.
    Valid {
        /// Local part of the identifier.
        local_id: String,
    },
    /// An invalid SEIS-PROV record.
    Invalid {
        /// The first failing check.
        error: ValidationError,
    },
}

impl RecordOutcome {
    /// The identifier local part to use for duplicate detection.
    pub fn local_id(&self) -> Option<&str> {
        match self {
            Self::Valid { local_id } => Some(local_id),
            Self::Invalid { .. } | Self::OutOfScope => None,
        }
    }

    /// The error, for invalid records.
    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Invalid { error } => Some(error),
            _ => None,
        }
    }
}

/// Classify and validate one record.
pub fn validate_record(record: &Record, scope: &NamespaceScope, schema: &Schema) -> RecordOutcome {
    let (definition, id_in_namespace) = match classify(record, scope, schema) {
        Ok(Classification::OutOfScope) => return RecordOutcome::OutOfScope,
        Ok(Classification::InScope {
            definition,
            id_in_namespace,
        }) => (definition, id_in_namespace),
        Err(error) => return RecordOutcome::Invalid { error },
    };

    let local_id = match check_identifier(record, definition, id_in_namespace) {
        Ok(local_id) => local_id,
        Err(error) => return RecordOutcome::Invalid { error },
    };

    let outcome = check_label(record, definition)
        .and_then(|()| check_attributes(record, definition, schema.namespace()));
    match (outcome, local_id) {
        (Ok(()), Some(local_id)) => RecordOutcome::Valid { local_id },
        // In-scope records always carry a namespaced identifier.
        (Ok(()), None) => RecordOutcome::OutOfScope,
        (Err(error), _) => {
            tracing::debug!(record = %record.display_id(), %error, "record failed validation");
            RecordOutcome::Invalid { error }
        }
    }
}

fn check_identifier(
    record: &Record,
    definition: &Definition,
    id_in_namespace: bool,
) -> Result<Option<String>, ValidationError> {
    let Some(identifier) = record.identifier() else {
        return Ok(None);
    };
    if id_in_namespace && !definition.matches_identifier(identifier.local_part()) {
        return Err(ValidationError::InvalidIdentifier {
            identifier: identifier.to_string(),
            pattern: definition.identifier_pattern().to_string(),
        });
    }
    Ok(Some(identifier.local_part().to_string()))
}

fn check_label(record: &Record, definition: &Definition) -> Result<(), ValidationError> {
    let attributes = record.attributes();
    let label_key = QualifiedName::prov("label");
    let labels: Vec<_> = attributes.values_of(&label_key).collect();
    let label = match labels.as_slice() {
        [] => {
            return Err(ValidationError::MissingLabel {
                record: record.display_id(),
            })
        }
        [label] => label.text(),
        _ => {
            return Err(ValidationError::MultipleLabels {
                record: record.display_id(),
                count: labels.len(),
            })
        }
    };
    if !definition.accepts_any_label() && label != definition.label() {
        return Err(ValidationError::WrongLabel {
            record: record.display_id(),
            found: label.into_owned(),
            expected: definition.label().to_string(),
        });
    }
    Ok(())
}

fn check_attributes(
    record: &Record,
    definition: &Definition,
    namespace: &str,
) -> Result<(), ValidationError> {
    let attributes = record.attributes();
    let narrowed: Vec<_> = attributes.in_namespace(namespace).collect();

    let mut missing: Vec<String> = definition
        .required_attributes()
        .map(|attr| attr.name())
        .filter(|name| !narrowed.iter().any(|(key, _)| key.local_part() == *name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        missing.sort();
        missing.dedup();
        return Err(ValidationError::MissingAttributes {
            record: record.display_id(),
            missing,
        });
    }

    for (key, value) in narrowed {
        let name = key.local_part();
        let Some(attr) = definition.attribute(name) else {
            if definition.other_attributes_allowed() {
                continue;
            }
            return Err(ValidationError::UnexpectedAttribute {
                record: record.display_id(),
                attribute: name.to_string(),
            });
        };

        if attr.matching_type(value).is_none() {
            return Err(ValidationError::InvalidType {
                attribute: name.to_string(),
                record: record.display_id(),
                found: value.type_name().into_owned(),
                expected: attr.type_list(),
            });
        }

        if let Some(pattern) = attr.pattern() {
            if !attr.accepts_strings() {
                return Err(ValidationError::PatternOnNonString {
                    definition: definition.name().to_string(),
                    attribute: name.to_string(),
                });
            }
            let text = value.text();
            if !pattern.is_match(&text) {
                return Err(ValidationError::PatternMismatch {
                    attribute: name.to_string(),
                    record: record.display_id(),
                    value: text.into_owned(),
                    pattern: pattern.as_str().to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use seisprov_core::{AttributeValue, Namespace, RecordKind, XsdDateTime};
    use seisprov_schema::default_schema;

    const SP: &str = "http://seisprov.org/seis_prov/0.1/#";

    fn scope() -> NamespaceScope {
        NamespaceScope::with_prov_defaults().child([Namespace::new("seis_prov", SP)])
    }

    fn sp(local: &str) -> QualifiedName {
        QualifiedName::new(Namespace::new("seis_prov", SP), local)
    }

    fn software_agent() -> Record {
        Record::new(RecordKind::Agent, Some(sp("sp001_sa_9876543")))
            .with_attribute(
                QualifiedName::prov("type"),
                AttributeValue::QualifiedName(QualifiedName::prov("SoftwareAgent")),
            )
            .with_attribute(QualifiedName::prov("label"), "ObsPy")
            .with_attribute(sp("software_name"), "ObsPy")
            .with_attribute(sp("software_version"), "0.10.2")
            .with_attribute(sp("website"), "http://www.obspy.org")
    }

    fn waveform_trace() -> Record {
        Record::new(RecordKind::Entity, Some(sp("sp001_wf_a34j4didj3")))
            .with_attribute(
                QualifiedName::prov("type"),
                AttributeValue::QualifiedName(sp("waveform_trace")),
            )
            .with_attribute(QualifiedName::prov("label"), "Waveform Trace")
            .with_attribute(sp("seed_id"), "BW.FURT.00.BHZ")
            .with_attribute(
                sp("start_time"),
                AttributeValue::DateTime(XsdDateTime::parse("2013-01-02T12:10:11").unwrap()),
            )
            .with_attribute(sp("number_of_samples"), AttributeValue::Int(6000))
            .with_attribute(sp("sampling_rate"), AttributeValue::Double(100.0))
    }

    fn check(record: &Record) -> RecordOutcome {
        let schema = default_schema().unwrap();
        validate_record(record, &scope(), &schema)
    }

    // ---- valid records ----

    #[test]
    fn test_valid_records() {
        assert_eq!(
            check(&software_agent()),
            RecordOutcome::Valid {
                local_id: "sp001_sa_9876543".into()
            }
        );
        assert_eq!(check(&waveform_trace()).local_id(), Some("sp001_wf_a34j4didj3"));
        assert!(check(&waveform_trace()).error().is_none());
    }

    // ---- identifier and label ----

    #[test]
    fn test_bad_identifier_is_not_collected() {
        let record = Record::new(RecordKind::Agent, Some(sp("sp1_sa_9876543")))
            .with_attribute(
                QualifiedName::prov("type"),
                AttributeValue::QualifiedName(QualifiedName::prov("SoftwareAgent")),
            );
        let outcome = check(&record);
        assert_eq!(outcome.local_id(), None);
        assert_eq!(
            outcome.error().unwrap().to_string(),
            "The local part of the identifier 'seis_prov:sp1_sa_9876543' does not match the \
             regular expression '^sp\\d{3,5}_sa_[a-z0-9]{7,12}$' as is required by the standard."
        );
    }

    #[test]
    fn test_failed_label_drops_identifier() {
        let record = Record::new(RecordKind::Entity, Some(sp("sp001_wf_a34j4didj3")))
            .with_attribute(
                QualifiedName::prov("type"),
                AttributeValue::QualifiedName(sp("waveform_trace")),
            );
        let outcome = check(&record);
        assert_eq!(outcome.local_id(), None);
        assert!(matches!(outcome.error(), Some(ValidationError::MissingLabel { .. })));

        let twice = waveform_trace().with_attribute(QualifiedName::prov("label"), "Other");
        assert!(matches!(
            check(&twice).error(),
            Some(ValidationError::MultipleLabels { count: 2, .. })
        ));
    }

    #[test]
    fn test_wrong_label() {
        let record = Record::new(RecordKind::Entity, Some(sp("sp001_wf_a34j4didj3")))
            .with_attribute(
                QualifiedName::prov("type"),
                AttributeValue::QualifiedName(sp("waveform_trace")),
            )
            .with_attribute(QualifiedName::prov("label"), "Trace");
        assert_eq!(
            check(&record).error().unwrap().to_string(),
            "Record 'seis_prov:sp001_wf_a34j4didj3' has label 'Trace' instead of 'Waveform Trace'."
        );
    }

    // ---- attributes ----

    #[test]
    fn test_missing_attributes_listed_sorted() {
        let record = Record::new(RecordKind::Agent, Some(sp("sp001_sa_9876543")))
            .with_attribute(
                QualifiedName::prov("type"),
                AttributeValue::QualifiedName(QualifiedName::prov("SoftwareAgent")),
            )
            .with_attribute(QualifiedName::prov("label"), "ObsPy")
            .with_attribute(sp("software_name"), "ObsPy");
        assert_eq!(
            check(&record).error(),
            Some(&ValidationError::MissingAttributes {
                record: "seis_prov:sp001_sa_9876543".into(),
                missing: vec!["software_version".into(), "website".into()],
            })
        );
    }

    #[test]
    fn test_unexpected_attribute() {
        let record = software_agent().with_attribute(sp("colour"), "blue");
        assert!(matches!(
            check(&record).error(),
            Some(ValidationError::UnexpectedAttribute { attribute, .. }) if attribute == "colour"
        ));
    }

    #[test]
    fn test_other_attributes_allowed() {
        let record = Record::new(RecordKind::Entity, Some(sp("sp001_in_abcdefg")))
            .with_attribute(
                QualifiedName::prov("type"),
                AttributeValue::QualifiedName(sp("input_parameters")),
            )
            .with_attribute(QualifiedName::prov("label"), "Input Parameters")
            .with_attribute(sp("NSTEP"), AttributeValue::Int(100));
        assert!(check(&record).error().is_none());
    }

    #[test]
    fn test_type_mismatch() {
        let record = waveform_trace().with_attribute(sp("sampling_rate"), AttributeValue::Int(100));
        let outcome = check(&record);
        assert_eq!(
            outcome.error().unwrap().to_string(),
            "Attribute 'sampling_rate' of record 'seis_prov:sp001_wf_a34j4didj3' has an invalid \
             type 'int'. Valid types: xsd:double"
        );
    }

    #[test]
    fn test_pattern_mismatch() {
        let record = Record::new(RecordKind::Entity, Some(sp("sp001_wf_a34j4didj3")))
            .with_attribute(
                QualifiedName::prov("type"),
                AttributeValue::QualifiedName(sp("waveform_trace")),
            )
            .with_attribute(QualifiedName::prov("label"), "Waveform Trace")
            .with_attribute(sp("seed_id"), "FURT")
            .with_attribute(
                sp("start_time"),
                AttributeValue::DateTime(XsdDateTime::parse("2013-01-02T12:10:11").unwrap()),
            )
            .with_attribute(sp("number_of_samples"), AttributeValue::Int(6000))
            .with_attribute(sp("sampling_rate"), AttributeValue::Double(100.0));
        assert!(matches!(
            check(&record).error(),
            Some(ValidationError::PatternMismatch { value, .. }) if value == "FURT"
        ));
    }

    #[test]
    fn test_foreign_attributes_are_ignored() {
        let ex = QualifiedName::new(Namespace::new("ex", "http://example.org/"), "anything");
        let record = software_agent().with_attribute(ex, AttributeValue::Bool(true));
        assert!(check(&record).error().is_none());
    }
}
