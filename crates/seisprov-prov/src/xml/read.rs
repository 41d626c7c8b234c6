//! PROV-XML reader.
//!
//! Walks the element tree of a `prov:document`, tracking namespace scopes
//! the way XML defines them (declarations apply to the element and its
//! descendants). Elements outside the PROV vocabulary are skipped here and
//! left to the structure check to report.

use seisprov_core::{
    AttributeValue, Bundle, Namespace, NamespaceScope, ProvDocument, QualifiedName, Record,
    RecordKind, PROV_NS_URI, XSI_NS_URI,
};

use crate::error::ParseError;
use crate::vocab;
use crate::xml::tree::{self, split_qname, XmlElement};

/// Read a PROV-XML document.
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not well-formed XML, the root is
/// not `prov:document`, or a qualified name uses an undeclared prefix.
pub fn read_xml(text: &str) -> Result<ProvDocument, ParseError> {
    let root = tree::parse(text)?;
    let scope = NamespaceScope::new().child(root.namespace_declarations());
    let root_name = qualify(&scope, &root.name, root.line)?;
    if !(root_name.is_in(PROV_NS_URI) && root_name.local_part() == "document") {
        return Err(ParseError::UnexpectedRoot(root.name.clone()));
    }

    let (root_scope, records, bundles) = read_container(&root, scope, false)?;
    let mut document = ProvDocument::new(root_scope);
    for record in records {
        document.root_mut().push_record(record);
    }
    for bundle in bundles {
        document.push_bundle(bundle);
    }
    Ok(document)
}

/// Read the statements of `prov:document` or `prov:bundleContent`.
///
/// Returns the container scope (own declarations plus those of its direct
/// statements, so every namespace used in the container can be found by
/// URI), its records and, for the document, its bundles.
fn read_container(
    container: &XmlElement,
    mut scope: NamespaceScope,
    nested: bool,
) -> Result<(NamespaceScope, Vec<Record>, Vec<Bundle>), ParseError> {
    let mut records = Vec::new();
    let mut bundles = Vec::new();

    for child in &container.children {
        let declarations = child.namespace_declarations();
        let child_scope = scope.child(declarations.iter().cloned());
        let name = qualify(&child_scope, &child.name, child.line)?;
        if !name.is_in(PROV_NS_URI) {
            tracing::debug!(element = %child.name, line = child.line, "skipping non-PROV element");
            continue;
        }

        if name.local_part() == "bundleContent" {
            if nested {
                return Err(ParseError::invalid(
                    format!("line {}", child.line),
                    "bundles cannot be nested",
                ));
            }
            let identifier = prov_attribute(child, &child_scope, "id")?
                .map(|id| qualify(&child_scope, id, child.line))
                .transpose()?;
            let (bundle_scope, bundle_records, _) =
                read_container(child, child_scope, true)?;
            let mut bundle = Bundle::new(identifier, bundle_scope);
            for record in bundle_records {
                bundle.push_record(record);
            }
            bundles.push(bundle);
            continue;
        }

        match vocab::statement_kind(name.local_part()) {
            Some((kind, implied_type)) => {
                records.push(read_record(child, &child_scope, kind, implied_type)?);
                for ns in declarations {
                    if scope.find_uri(ns.uri()).is_none() {
                        scope.declare(ns);
                    }
                }
            }
            None => {
                tracing::debug!(
                    element = %child.name,
                    line = child.line,
                    "skipping unknown PROV element"
                );
            }
        }
    }

    Ok((scope, records, bundles))
}

fn read_record(
    element: &XmlElement,
    scope: &NamespaceScope,
    kind: RecordKind,
    implied_type: Option<&'static str>,
) -> Result<Record, ParseError> {
    let identifier = prov_attribute(element, scope, "id")?
        .map(|id| qualify(scope, id, element.line))
        .transpose()?;
    let mut record = Record::new(kind, identifier);
    if let Some(prov_type) = implied_type {
        record.push_extra(
            QualifiedName::prov("type"),
            AttributeValue::QualifiedName(QualifiedName::prov(prov_type)),
        );
    }

    for child in &element.children {
        let child_scope = scope.child(child.namespace_declarations());
        let key = qualify(&child_scope, &child.name, child.line)?;

        let role = if key.is_in(PROV_NS_URI) {
            vocab::formal_role(kind, key.local_part())
        } else {
            None
        };
        if let Some(role) = role {
            if vocab::is_time_attribute(role) {
                record.push_formal(
                    QualifiedName::prov(role),
                    AttributeValue::from_typed_text("xsd:dateTime", &child.text),
                );
            } else if let Some(reference) = prov_attribute(child, &child_scope, "ref")? {
                let target = qualify(&child_scope, reference, child.line)?;
                record.push_formal(
                    QualifiedName::prov(role),
                    AttributeValue::QualifiedName(target),
                );
            }
            continue;
        }

        let value = typed_value(child, &child_scope)?;
        record.push_extra(key, value);
    }
    Ok(record)
}

/// Build the value of an attribute element from its text and `xsi:type`.
fn typed_value(
    element: &XmlElement,
    scope: &NamespaceScope,
) -> Result<AttributeValue, ParseError> {
    let Some(written) = attribute_in(element, scope, XSI_NS_URI, "type")? else {
        return Ok(AttributeValue::String(element.text.clone()));
    };
    let datatype = qualify(scope, written, element.line)?;
    let normalized = vocab::normalize_datatype(&datatype, written);
    if vocab::is_qualified_name_type(&normalized) {
        return qualify(scope, &element.text, element.line).map(AttributeValue::QualifiedName);
    }
    Ok(AttributeValue::from_typed_text(&normalized, &element.text))
}

/// The value of the attribute `prov:<local>`, whatever prefix it is written with.
fn prov_attribute<'e>(
    element: &'e XmlElement,
    scope: &NamespaceScope,
    local: &str,
) -> Result<Option<&'e str>, ParseError> {
    attribute_in(element, scope, PROV_NS_URI, local)
}

fn attribute_in<'e>(
    element: &'e XmlElement,
    scope: &NamespaceScope,
    uri: &str,
    local: &str,
) -> Result<Option<&'e str>, ParseError> {
    for (key, value) in element.plain_attributes() {
        let (prefix, name) = split_qname(key);
        if prefix.is_empty() || name != local {
            continue;
        }
        let ns = scope
            .resolve_prefix(prefix)
            .ok_or_else(|| ParseError::Name {
                line: element.line,
                source: seisprov_core::CoreError::UnknownPrefix {
                    prefix: prefix.to_string(),
                    name: key.to_string(),
                },
            })?;
        if ns.uri() == uri {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Resolve a name as written in XML. Unprefixed names without a default
/// namespace are in no namespace.
pub(crate) fn qualify(
    scope: &NamespaceScope,
    written: &str,
    line: usize,
) -> Result<QualifiedName, ParseError> {
    let written = written.trim();
    if !written.contains(':') && scope.resolve_prefix("").is_none() {
        return Ok(QualifiedName::new(Namespace::new("", ""), written));
    }
    scope
        .resolve(written)
        .map_err(|source| ParseError::Name { line, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use seisprov_core::RelationKind;

    const SP: &str = "http://seisprov.org/seis_prov/0.1/#";

    const AGENT_XML: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<prov:document xmlns:prov="http://www.w3.org/ns/prov#" xmlns:seis_prov="http://seisprov.org/seis_prov/0.1/#" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <prov:softwareAgent prov:id="seis_prov:sp001_sa_9345084">
    <prov:label>ObsPy</prov:label>
    <seis_prov:software_name>ObsPy</seis_prov:software_name>
    <seis_prov:software_version>0.10.2</seis_prov:software_version>
    <seis_prov:website xsi:type="xsd:anyURI">http://www.obspy.org</seis_prov:website>
  </prov:softwareAgent>
  <prov:entity prov:id="seis_prov:sp001_wf_f4e2a9c8b0">
    <prov:label>Waveform Trace</prov:label>
    <prov:type xsi:type="xsd:QName">seis_prov:waveform_trace</prov:type>
    <seis_prov:number_of_samples xsi:type="xsd:positiveInteger">6000</seis_prov:number_of_samples>
    <seis_prov:sampling_rate xsi:type="xsd:double">100.0</seis_prov:sampling_rate>
  </prov:entity>
  <prov:wasAttributedTo>
    <prov:entity prov:ref="seis_prov:sp001_wf_f4e2a9c8b0"/>
    <prov:agent prov:ref="seis_prov:sp001_sa_9345084"/>
  </prov:wasAttributedTo>
</prov:document>
"#;

    #[test]
    fn test_read_elements_and_relations() {
        let doc = read_xml(AGENT_XML).unwrap();
        let records = doc.root().records();
        assert_eq!(records.len(), 3);
        assert!(doc.find_namespace(SP).is_some());

        let agent = &records[0];
        assert_eq!(agent.kind(), RecordKind::Agent);
        assert_eq!(agent.display_id(), "seis_prov:sp001_sa_9345084");
        let types: Vec<_> = agent
            .attributes()
            .values_of(&QualifiedName::prov("type"))
            .cloned()
            .collect();
        assert_eq!(
            types,
            vec![AttributeValue::QualifiedName(QualifiedName::prov("SoftwareAgent"))]
        );

        let entity = &records[1];
        let attrs = entity.attributes();
        let sp = |local: &str| QualifiedName::new(Namespace::new("seis_prov", SP), local);
        assert_eq!(
            attrs.values_of(&sp("number_of_samples")).next(),
            Some(&AttributeValue::literal("xsd:positiveInteger", "6000"))
        );
        assert_eq!(
            attrs.values_of(&sp("sampling_rate")).next(),
            Some(&AttributeValue::Double(100.0))
        );
        assert_eq!(
            attrs.values_of(&QualifiedName::prov("type")).next(),
            Some(&AttributeValue::QualifiedName(sp("waveform_trace")))
        );

        let relation = &records[2];
        assert_eq!(
            relation.kind(),
            RecordKind::Relation(RelationKind::Attribution)
        );
        assert!(relation.identifier().is_none());
        assert_eq!(relation.formal_attributes().len(), 2);
    }

    #[test]
    fn test_read_bundle_with_own_namespace() {
        let xml = r#"<prov:document xmlns:prov="http://www.w3.org/ns/prov#" xmlns:ex="http://example.org/">
  <prov:bundleContent prov:id="ex:b1" xmlns:seis_prov="http://seisprov.org/seis_prov/0.1/#">
    <prov:entity prov:id="seis_prov:sp001_wf_aaaaaaa"/>
  </prov:bundleContent>
</prov:document>"#;
        let doc = read_xml(xml).unwrap();
        assert_eq!(doc.root().records().len(), 0);
        assert_eq!(doc.bundles().len(), 1);
        assert_eq!(doc.bundles()[0].records().len(), 1);
        assert!(doc.root().namespaces().find_uri(SP).is_none());
        assert!(doc.find_namespace(SP).is_some());
    }

    #[test]
    fn test_activity_times_are_formal() {
        let xml = r#"<prov:document xmlns:prov="http://www.w3.org/ns/prov#" xmlns:ex="http://example.org/">
  <prov:activity prov:id="ex:a">
    <prov:startTime>2014-02-02T12:15:03</prov:startTime>
  </prov:activity>
</prov:document>"#;
        let doc = read_xml(xml).unwrap();
        let activity = &doc.root().records()[0];
        assert_eq!(activity.formal_attributes().len(), 1);
        assert!(matches!(
            activity.formal_attributes()[0].1,
            AttributeValue::DateTime(_)
        ));
    }

    #[test]
    fn test_revision_reads_as_typed_derivation() {
        let xml = r#"<prov:document xmlns:prov="http://www.w3.org/ns/prov#" xmlns:ex="http://example.org/">
  <prov:wasRevisionOf>
    <prov:newer prov:ref="ex:v2"/>
    <prov:older prov:ref="ex:v1"/>
  </prov:wasRevisionOf>
</prov:document>"#;
        let doc = read_xml(xml).unwrap();
        let revision = &doc.root().records()[0];
        assert_eq!(revision.kind(), RecordKind::Relation(RelationKind::Derivation));
        let roles: Vec<_> = revision
            .formal_attributes()
            .iter()
            .map(|(key, value)| (key.local_part().to_string(), value.text().into_owned()))
            .collect();
        assert_eq!(
            roles,
            vec![
                ("generatedEntity".to_string(), "ex:v2".to_string()),
                ("usedEntity".to_string(), "ex:v1".to_string()),
            ]
        );
        assert_eq!(
            revision.attributes().values_of(&QualifiedName::prov("type")).next(),
            Some(&AttributeValue::QualifiedName(QualifiedName::prov("Revision")))
        );
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let err = read_xml("<root><a/></root>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedRoot(_)));
    }

    #[test]
    fn test_undeclared_prefix_is_rejected() {
        let xml = r#"<prov:document xmlns:prov="http://www.w3.org/ns/prov#">
  <prov:entity prov:id="nope:x"/>
</prov:document>"#;
        assert!(matches!(read_xml(xml), Err(ParseError::Name { line: 2, .. })));
    }
}
