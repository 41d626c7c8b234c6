//! PROV vocabulary shared by the readers, the writer and the structure check.

use seisprov_core::{QualifiedName, RecordKind, RelationKind};

/// Attributes in the PROV namespace that are values, not formal roles.
pub(crate) const PROV_VALUE_ATTRIBUTES: [&str; 5] = ["label", "location", "role", "type", "value"];

/// PROV-XML derivation subtype elements and the `prov:type` each implies.
pub(crate) const DERIVATION_SUBTYPES: [(&str, &str); 3] = [
    ("wasRevisionOf", "Revision"),
    ("wasQuotedFrom", "Quotation"),
    ("hadPrimarySource", "PrimarySource"),
];

/// Map a PROV-XML element name / PROV-JSON key onto a record kind and the
/// `prov:type` it implies, if it is a subtype element such as `person`.
pub(crate) fn statement_kind(name: &str) -> Option<(RecordKind, Option<&'static str>)> {
    if let Some((_, prov_type)) = DERIVATION_SUBTYPES.iter().find(|(element, _)| *element == name) {
        return Some((RecordKind::Relation(RelationKind::Derivation), Some(*prov_type)));
    }
    let subtype = match name {
        "person" => (RecordKind::Agent, "Person"),
        "organization" => (RecordKind::Agent, "Organization"),
        "softwareAgent" => (RecordKind::Agent, "SoftwareAgent"),
        "plan" => (RecordKind::Entity, "Plan"),
        "collection" => (RecordKind::Entity, "Collection"),
        "emptyCollection" => (RecordKind::Entity, "EmptyCollection"),
        "bundle" => (RecordKind::Entity, "Bundle"),
        other => return RecordKind::from_element_name(other).map(|kind| (kind, None)),
    };
    Some((subtype.0, Some(subtype.1)))
}

/// Formal attribute names (PROV namespace local parts) of a record kind.
pub(crate) fn formal_attributes(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::Activity => &["startTime", "endTime"],
        RecordKind::Entity | RecordKind::Agent => &[],
        RecordKind::Relation(relation) => relation.roles(),
    }
}

/// Role element names accepted in place of a formal role, as
/// `(alias, role)`. Revisions name their entities `newer` and `older`.
pub(crate) fn role_aliases(kind: RecordKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        RecordKind::Relation(RelationKind::Derivation) => {
            &[("newer", "generatedEntity"), ("older", "usedEntity")]
        }
        _ => &[],
    }
}

/// The formal attribute of `kind` written as `local`, resolving aliases.
pub(crate) fn formal_role(kind: RecordKind, local: &str) -> Option<&'static str> {
    let local = role_aliases(kind)
        .iter()
        .find(|(alias, _)| *alias == local)
        .map_or(local, |(_, role)| *role);
    formal_attributes(kind).iter().copied().find(|f| *f == local)
}

/// True for formal attributes holding a date-time instead of a reference.
pub(crate) fn is_time_attribute(local: &str) -> bool {
    matches!(local, "time" | "startTime" | "endTime")
}

/// Normalize a datatype name: XML Schema types become `xsd:<local>`, PROV
/// types `prov:<local>`; anything else keeps the form it was written in.
pub(crate) fn normalize_datatype(datatype: &QualifiedName, written: &str) -> String {
    if datatype.namespace().is_xsd() {
        format!("xsd:{}", datatype.local_part())
    } else if datatype.namespace().is_prov() {
        format!("prov:{}", datatype.local_part())
    } else {
        written.to_string()
    }
}

/// True if a normalized datatype denotes a qualified name value.
pub(crate) fn is_qualified_name_type(datatype: &str) -> bool {
    matches!(datatype, "xsd:QName" | "prov:QUALIFIED_NAME")
}

#[cfg(test)]
mod tests {
    use super::*;
    use seisprov_core::Namespace;

    #[test]
    fn test_subtype_elements_imply_prov_type() {
        assert_eq!(
            statement_kind("softwareAgent"),
            Some((RecordKind::Agent, Some("SoftwareAgent")))
        );
        assert_eq!(statement_kind("entity"), Some((RecordKind::Entity, None)));
        assert_eq!(
            statement_kind("wasDerivedFrom"),
            Some((RecordKind::Relation(RelationKind::Derivation), None))
        );
        assert_eq!(statement_kind("bundleContent"), None);
    }

    #[test]
    fn test_derivation_subtypes() {
        let derivation = RecordKind::Relation(RelationKind::Derivation);
        assert_eq!(statement_kind("wasRevisionOf"), Some((derivation, Some("Revision"))));
        assert_eq!(statement_kind("wasQuotedFrom"), Some((derivation, Some("Quotation"))));
        assert_eq!(
            statement_kind("hadPrimarySource"),
            Some((derivation, Some("PrimarySource")))
        );
        assert_eq!(formal_role(derivation, "newer"), Some("generatedEntity"));
        assert_eq!(formal_role(derivation, "older"), Some("usedEntity"));
        assert_eq!(formal_role(derivation, "usage"), Some("usage"));
        assert_eq!(formal_role(RecordKind::Relation(RelationKind::Usage), "newer"), None);
    }

    #[test]
    fn test_normalize_datatype() {
        let xsd = QualifiedName::new(
            Namespace::new("xs", "http://www.w3.org/2001/XMLSchema#"),
            "double",
        );
        assert_eq!(normalize_datatype(&xsd, "xs:double"), "xsd:double");
        let other = QualifiedName::new(Namespace::new("ex", "http://example.org/"), "t");
        assert_eq!(normalize_datatype(&other, "ex:t"), "ex:t");
    }
}
