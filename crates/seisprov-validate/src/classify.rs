//! # Record Classification
//!
//! Decides whether a record is a SEIS-PROV record and, if so, which
//! [`Definition`] governs it. A record is in scope as soon as its
//! identifier or one of its `prov:type` values lies in the target
//! namespace. In-scope records must then carry exactly one `prov:type`
//! that names a definition, either directly (`seis_prov:waveform_trace`)
//! or through one of the PROV agent types (`prov:Person`,
//! `prov:SoftwareAgent`, `prov:Organization`).

use seisprov_core::{AttributeValue, NamespaceScope, QualifiedName, Record, RecordKind};
use seisprov_schema::{Definition, Schema};

use crate::error::ValidationError;

/// Outcome of [`classify`].
#[derive(Debug, Clone, Copy)]
pub enum Classification<'s> {
    /// Not a SEIS-PROV record; nothing to validate.
    OutOfScope,
    /// A SEIS-PROV record.
    InScope {
        /// The governing definition.
        definition: &'s Definition,
        /// True if the identifier lies in the target namespace.
        id_in_namespace: bool,
    },
}

/// Map a PROV agent type to its definition name.
fn agent_definition(name: &QualifiedName) -> Option<&'static str> {
    if !name.namespace().is_prov() {
        return None;
    }
    match name.local_part() {
        "Person" => Some("person"),
        "SoftwareAgent" => Some("software_agent"),
        "Organization" => Some("organization"),
        _ => None,
    }
}

/// Resolve a `prov:type` value to a qualified name. Plain text counts only
/// when written with a prefix the scope knows.
fn resolve_type(value: &AttributeValue, scope: &NamespaceScope) -> Option<QualifiedName> {
    match value {
        AttributeValue::QualifiedName(name) => Some(name.clone()),
        AttributeValue::String(text) | AttributeValue::Literal { text, .. } => {
            if text.contains(':') {
                scope.resolve(text).ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

/// The prefix a `prov:type` value was written with.
fn written_prefix(value: &AttributeValue, resolved: &QualifiedName) -> String {
    match value {
        AttributeValue::QualifiedName(name) => name.namespace().prefix().to_string(),
        other => other
            .text()
            .split_once(':')
            .map_or_else(
                || resolved.namespace().prefix().to_string(),
                |(p, _)| p.trim().to_string(),
            ),
    }
}

/// Classify one record of a bundle with the given namespace scope.
///
/// # Errors
///
/// A classification [`ValidationError`] for in-scope records that cannot be
/// mapped to exactly one definition.
pub fn classify<'s>(
    record: &Record,
    scope: &NamespaceScope,
    schema: &'s Schema,
) -> Result<Classification<'s>, ValidationError> {
    let target = schema.namespace();
    let attributes = record.attributes();
    let type_key = QualifiedName::prov("type");
    let types: Vec<&AttributeValue> = attributes.values_of(&type_key).collect();
    let resolved: Vec<Option<QualifiedName>> =
        types.iter().map(|t| resolve_type(t, scope)).collect();

    let id_in_namespace = record.identifier().is_some_and(|id| id.is_in(target));
    let any_type_in_namespace = resolved
        .iter()
        .flatten()
        .any(|name| name.is_in(target));

    if !id_in_namespace && !any_type_in_namespace {
        return Ok(Classification::OutOfScope);
    }

    let record_id = record.display_id();
    if types.len() > 1 {
        return Err(ValidationError::TooManyTypes {
            record: record_id,
            count: types.len(),
        });
    }
    let (Some(prov_type), Some(resolved_type)) = (types.first(), resolved.first()) else {
        return Err(ValidationError::MissingType { record: record_id });
    };

    if matches!(record.kind(), RecordKind::Relation(_)) && record.identifier().is_none() {
        return Ok(Classification::OutOfScope);
    }

    let type_in_namespace = resolved_type.as_ref().is_some_and(|name| name.is_in(target));
    let type_name = match resolved_type {
        Some(name) if type_in_namespace => {
            if !id_in_namespace {
                return Err(ValidationError::ForeignIdentifier { record: record_id });
            }
            let declared = scope
                .find_uri(target)
                .map(|ns| ns.prefix().to_string())
                .unwrap_or_default();
            if written_prefix(prov_type, name) != declared {
                return Err(ValidationError::ForeignPrefix {
                    prov_type: prov_type.text().into_owned(),
                    prefix: declared,
                });
            }
            name.local_part().to_string()
        }
        _ => resolved_type
            .as_ref()
            .and_then(agent_definition)
            .map(str::to_string)
            .ok_or(ValidationError::UnsupportedType { record: record_id })?,
    };

    let kind = record.kind();
    let section = schema
        .section_for(kind)
        .ok_or_else(|| ValidationError::InvalidRecordKind {
            kind: kind.to_string(),
        })?;
    let definition = section
        .get(&type_name)
        .ok_or_else(|| ValidationError::UnknownType {
            prov_type: type_name.clone(),
            kind: kind.to_string(),
        })?;

    tracing::debug!(
        record = %record.display_id(),
        definition = definition.name(),
        "classified SEIS-PROV record"
    );
    Ok(Classification::InScope {
        definition,
        id_in_namespace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use seisprov_core::{Namespace, RelationKind};
    use seisprov_schema::default_schema;

    const SP: &str = "http://seisprov.org/seis_prov/0.1/#";

    fn scope() -> NamespaceScope {
        NamespaceScope::with_prov_defaults().child([
            Namespace::new("seis_prov", SP),
            Namespace::new("ex", "http://example.org/"),
        ])
    }

    fn sp(local: &str) -> QualifiedName {
        QualifiedName::new(Namespace::new("seis_prov", SP), local)
    }

    fn ex(local: &str) -> QualifiedName {
        QualifiedName::new(Namespace::new("ex", "http://example.org/"), local)
    }

    fn definition_name(c: Classification<'_>) -> &str {
        match c {
            Classification::InScope { definition, .. } => definition.name(),
            Classification::OutOfScope => "<out of scope>",
        }
    }

    #[test]
    fn test_foreign_records_are_out_of_scope() {
        let schema = default_schema().unwrap();
        let record = Record::new(RecordKind::Entity, Some(ex("e1")))
            .with_attribute(QualifiedName::prov("type"), AttributeValue::QualifiedName(ex("x")));
        assert!(matches!(
            classify(&record, &scope(), &schema).unwrap(),
            Classification::OutOfScope
        ));
        let untyped = Record::new(RecordKind::Entity, Some(ex("e2")));
        assert!(matches!(
            classify(&untyped, &scope(), &schema).unwrap(),
            Classification::OutOfScope
        ));
    }

    #[test]
    fn test_qualified_type_selects_definition() {
        let schema = default_schema().unwrap();
        let record = Record::new(RecordKind::Entity, Some(sp("sp001_wf_abcdefg")))
            .with_attribute(
                QualifiedName::prov("type"),
                AttributeValue::QualifiedName(sp("waveform_trace")),
            );
        let c = classify(&record, &scope(), &schema).unwrap();
        assert_eq!(definition_name(c), "waveform_trace");
    }

    #[test]
    fn test_string_type_resolves_through_scope() {
        let schema = default_schema().unwrap();
        let record = Record::new(RecordKind::Activity, Some(sp("sp002_dt_abcdefg")))
            .with_attribute(QualifiedName::prov("type"), "seis_prov:detrend");
        let c = classify(&record, &scope(), &schema).unwrap();
        assert_eq!(definition_name(c), "detrend");
    }

    #[test]
    fn test_agent_types_map_to_definitions() {
        let schema = default_schema().unwrap();
        for (local, expected) in [
            ("Person", "person"),
            ("SoftwareAgent", "software_agent"),
            ("Organization", "organization"),
        ] {
            let record = Record::new(RecordKind::Agent, Some(sp("sp001_pp_abcdefg")))
                .with_attribute(
                    QualifiedName::prov("type"),
                    AttributeValue::QualifiedName(QualifiedName::prov(local)),
                );
            let c = classify(&record, &scope(), &schema).unwrap();
            assert_eq!(definition_name(c), expected);
        }
    }

    #[test]
    fn test_namespaced_id_without_type() {
        let schema = default_schema().unwrap();
        let record = Record::new(RecordKind::Entity, Some(sp("sp001_wf_abcdefg")));
        let err = classify(&record, &scope(), &schema).unwrap_err();
        assert!(matches!(err, ValidationError::MissingType { .. }));
    }

    #[test]
    fn test_two_types_rejected() {
        let schema = default_schema().unwrap();
        let record = Record::new(RecordKind::Entity, Some(ex("e1")))
            .with_attribute(QualifiedName::prov("type"), AttributeValue::QualifiedName(sp("file")))
            .with_attribute(QualifiedName::prov("type"), AttributeValue::QualifiedName(ex("x")));
        let err = classify(&record, &scope(), &schema).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooManyTypes {
                record: "ex:e1".into(),
                count: 2
            }
        );
    }

    #[test]
    fn test_namespaced_type_needs_namespaced_id() {
        let schema = default_schema().unwrap();
        let record = Record::new(RecordKind::Entity, Some(ex("e1")))
            .with_attribute(QualifiedName::prov("type"), AttributeValue::QualifiedName(sp("file")));
        let err = classify(&record, &scope(), &schema).unwrap_err();
        assert!(matches!(err, ValidationError::ForeignIdentifier { .. }));
    }

    #[test]
    fn test_namespaced_id_with_foreign_type() {
        let schema = default_schema().unwrap();
        let record = Record::new(RecordKind::Entity, Some(sp("sp001_wf_abcdefg")))
            .with_attribute(QualifiedName::prov("type"), AttributeValue::QualifiedName(ex("x")));
        let err = classify(&record, &scope(), &schema).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
    }

    #[test]
    fn test_unknown_type_and_invalid_kind() {
        let schema = default_schema().unwrap();
        let record = Record::new(RecordKind::Entity, Some(sp("sp001_xx_abcdefg")))
            .with_attribute(
                QualifiedName::prov("type"),
                AttributeValue::QualifiedName(sp("lowpass_filter")),
            );
        let err = classify(&record, &scope(), &schema).unwrap_err();
        assert_eq!(
            err.to_string(),
            "prov:type 'lowpass_filter' of record type 'prov:Entity' is not known to SEIS-PROV."
        );

        let usage = RecordKind::Relation(RelationKind::Usage);
        let relation = Record::new(usage, Some(sp("sp001_us_abcdefg")))
            .with_attribute(QualifiedName::prov("type"), AttributeValue::QualifiedName(sp("file")));
        let err = classify(&relation, &scope(), &schema).unwrap_err();
        assert_eq!(
            err.to_string(),
            "prov:Usage not a record type that is valid for SEIS-PROV."
        );
    }

    #[test]
    fn test_anonymous_relation_is_out_of_scope() {
        let schema = default_schema().unwrap();
        let relation = Record::new(RecordKind::Relation(RelationKind::Generation), None)
            .with_attribute(QualifiedName::prov("type"), AttributeValue::QualifiedName(sp("file")));
        assert!(matches!(
            classify(&relation, &scope(), &schema).unwrap(),
            Classification::OutOfScope
        ));
    }

    #[test]
    fn test_second_prefix_for_target_namespace_is_rejected() {
        let schema = default_schema().unwrap();
        let scope = scope().child([Namespace::new("sp", SP)]);
        let record = Record::new(RecordKind::Entity, Some(sp("sp001_fi_abcdefg")))
            .with_attribute(QualifiedName::prov("type"), "seis_prov:file");
        let err = classify(&record, &scope, &schema).unwrap_err();
        assert!(matches!(err, ValidationError::ForeignPrefix { ref prefix, .. } if prefix == "sp"));
    }
}
