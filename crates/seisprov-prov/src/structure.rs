//! # Structural Validation
//!
//! Generic PROV-XML structure checks, independent of any domain schema.
//! [`StructuralValidator`] is the seam; [`ProvXmlStructure`] is the
//! built-in implementation covering what the PROV-XML schema enforces for
//! the statements this workspace reads:
//!
//! - the root is `prov:document`, statements are known PROV elements;
//! - entities, activities, agents and bundles carry `prov:id`;
//! - relations carry their required roles, each role as `prov:ref`;
//! - bundles are not nested;
//! - time elements and values typed with an XML Schema datatype are
//!   lexically valid for that datatype.
//!
//! Every problem is collected with its line number; the check does not stop
//! at the first one.

use std::collections::HashMap;
use std::sync::OnceLock;

use seisprov_core::{
    NamespaceScope, RecordKind, RelationKind, XsdDateTime, PROV_NS_URI, XSI_NS_URI,
};

use crate::error::{Diagnostics, StructureDiagnostic, StructureError};
use crate::vocab;
use crate::xml::read::qualify;
use crate::xml::tree::{self, split_qname, XmlElement};

/// Checks a PROV-XML document against a generic structure.
pub trait StructuralValidator: Send + Sync {
    /// Check the serialized document.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::Invalid`] with every diagnostic found, or
    /// [`StructureError::Malformed`] if the XML cannot be read.
    fn check(&self, xml: &str) -> Result<(), StructureError>;
}

/// The built-in PROV-XML structure checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvXmlStructure;

/// What a statement element may and must contain.
#[derive(Debug)]
struct ElementRule {
    requires_id: bool,
    roles: Vec<&'static str>,
    required_roles: &'static [&'static str],
    aliases: &'static [(&'static str, &'static str)],
    times: Vec<&'static str>,
}

fn rule_table() -> &'static HashMap<&'static str, ElementRule> {
    static RULES: OnceLock<HashMap<&'static str, ElementRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        let mut rules = HashMap::new();
        let elements = [
            "entity",
            "activity",
            "agent",
            "person",
            "organization",
            "softwareAgent",
            "plan",
            "collection",
            "emptyCollection",
            "bundle",
        ];
        for name in elements {
            let times = match vocab::statement_kind(name) {
                Some((RecordKind::Activity, _)) => vec!["startTime", "endTime"],
                _ => Vec::new(),
            };
            rules.insert(
                name,
                ElementRule {
                    requires_id: true,
                    roles: Vec::new(),
                    required_roles: &[],
                    aliases: &[],
                    times,
                },
            );
        }
        let subtypes = vocab::DERIVATION_SUBTYPES
            .into_iter()
            .map(|(name, _)| (name, RelationKind::Derivation));
        let relations = RelationKind::ALL
            .into_iter()
            .map(|kind| (kind.element_name(), kind))
            .chain(subtypes);
        for (name, kind) in relations {
            let (times, roles): (Vec<&'static str>, Vec<&'static str>) = kind
                .roles()
                .iter()
                .copied()
                .partition(|role| vocab::is_time_attribute(role));
            rules.insert(
                name,
                ElementRule {
                    requires_id: false,
                    roles,
                    required_roles: kind.required_roles(),
                    aliases: vocab::role_aliases(RecordKind::Relation(kind)),
                    times,
                },
            );
        }
        rules
    })
}

impl StructuralValidator for ProvXmlStructure {
    fn check(&self, xml: &str) -> Result<(), StructureError> {
        let root = tree::parse(xml)?;
        let mut diagnostics = Vec::new();
        let scope = NamespaceScope::new().child(root.namespace_declarations());

        let mut report = |element: &XmlElement, message: String| {
            diagnostics.push(StructureDiagnostic {
                line: element.line,
                element: element.name.clone(),
                message,
            });
        };

        match qualify(&scope, &root.name, root.line) {
            Ok(name) if name.is_in(PROV_NS_URI) && name.local_part() == "document" => {
                for child in &root.children {
                    check_statement(child, &scope, false, &mut report);
                }
            }
            Ok(_) => report(&root, "root element must be prov:document".to_string()),
            Err(e) => report(&root, e.to_string()),
        }

        if diagnostics.is_empty() {
            Ok(())
        } else {
            Err(StructureError::Invalid {
                diagnostics: Diagnostics { items: diagnostics },
            })
        }
    }
}

fn check_statement(
    element: &XmlElement,
    parent_scope: &NamespaceScope,
    in_bundle: bool,
    report: &mut impl FnMut(&XmlElement, String),
) {
    let scope = parent_scope.child(element.namespace_declarations());
    let name = match qualify(&scope, &element.name, element.line) {
        Ok(name) => name,
        Err(e) => return report(element, e.to_string()),
    };
    if !name.is_in(PROV_NS_URI) {
        let message = "element is not expected here; expected a PROV statement";
        return report(element, message.to_string());
    }
    let local = name.local_part();

    if local == "other" {
        return;
    }
    if local == "bundleContent" {
        if in_bundle {
            report(element, "bundles cannot be nested".to_string());
        }
        check_identifier(element, &scope, report);
        for child in &element.children {
            check_statement(child, &scope, true, report);
        }
        return;
    }

    let Some(rule) = rule_table().get(local) else {
        return report(element, format!("unknown PROV element 'prov:{local}'"));
    };

    if rule.requires_id || prov_attribute(element, &scope, "id").is_some() {
        check_identifier(element, &scope, report);
    }

    let mut seen_roles: Vec<&str> = Vec::new();
    for child in &element.children {
        let child_scope = scope.child(child.namespace_declarations());
        let key = match qualify(&child_scope, &child.name, child.line) {
            Ok(key) => key,
            Err(e) => {
                report(child, e.to_string());
                continue;
            }
        };
        if !key.is_in(PROV_NS_URI) {
            check_typed_value(child, &child_scope, report);
            continue;
        }
        let child_local = rule
            .aliases
            .iter()
            .find(|(alias, _)| *alias == key.local_part())
            .map_or(key.local_part(), |(_, role)| *role);
        if let Some(role) = rule.roles.iter().find(|role| **role == child_local) {
            if seen_roles.contains(role) {
                report(child, format!("role 'prov:{role}' given more than once"));
            }
            seen_roles.push(*role);
            match prov_attribute(child, &child_scope, "ref") {
                Some(reference) => {
                    if let Err(e) = qualify(&child_scope, reference, child.line) {
                        report(child, e.to_string());
                    }
                }
                None => report(child, "missing required attribute 'prov:ref'".to_string()),
            }
        } else if rule.times.iter().any(|t| *t == child_local) {
            if XsdDateTime::parse(&child.text).is_err() {
                report(child, format!("'{}' is not a valid xsd:dateTime", child.text));
            }
        } else if vocab::PROV_VALUE_ATTRIBUTES.iter().any(|a| *a == child_local) {
            check_typed_value(child, &child_scope, report);
        } else {
            report(
                child,
                format!("element 'prov:{child_local}' is not allowed in 'prov:{local}'"),
            );
        }
    }

    for required in rule.required_roles {
        if !seen_roles.contains(required) {
            report(element, format!("missing required element 'prov:{required}'"));
        }
    }
}

fn check_identifier(
    element: &XmlElement,
    scope: &NamespaceScope,
    report: &mut impl FnMut(&XmlElement, String),
) {
    match prov_attribute(element, scope, "id") {
        Some(id) => {
            if let Err(e) = qualify(scope, id, element.line) {
                report(element, e.to_string());
            }
        }
        None => report(element, "missing required attribute 'prov:id'".to_string()),
    }
}

/// Check the text of an element typed with an XML Schema `xsi:type`.
fn check_typed_value(
    element: &XmlElement,
    scope: &NamespaceScope,
    report: &mut impl FnMut(&XmlElement, String),
) {
    let Some(written) = attribute_in(element, scope, XSI_NS_URI, "type") else {
        return;
    };
    let datatype = match qualify(scope, written, element.line) {
        Ok(datatype) => datatype,
        Err(e) => return report(element, e.to_string()),
    };
    if !datatype.namespace().is_xsd() {
        return;
    }
    let text = element.text.trim();
    let valid = match datatype.local_part() {
        "int" | "long" | "short" | "integer" | "byte" => text.parse::<i64>().is_ok(),
        "nonNegativeInteger" | "unsignedInt" | "unsignedLong" => text.parse::<u64>().is_ok(),
        "positiveInteger" => text.parse::<u64>().is_ok_and(|v| v > 0),
        "double" | "float" => {
            matches!(text, "INF" | "-INF" | "NaN") || text.parse::<f64>().is_ok()
        }
        "decimal" => is_decimal(text),
        "boolean" => matches!(text, "true" | "false" | "1" | "0"),
        "dateTime" => XsdDateTime::parse(text).is_ok(),
        "QName" => qualify(scope, text, element.line).is_ok(),
        _ => true,
    };
    if !valid {
        report(
            element,
            format!(
                "'{}' is not a valid value of type 'xsd:{}'",
                element.text,
                datatype.local_part()
            ),
        );
    }
}

fn is_decimal(text: &str) -> bool {
    let digits = text.strip_prefix(&['+', '-'][..]).unwrap_or(text);
    let mut parts = digits.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();
    !(whole.is_empty() && fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

fn prov_attribute<'e>(
    element: &'e XmlElement,
    scope: &NamespaceScope,
    local: &str,
) -> Option<&'e str> {
    attribute_in(element, scope, PROV_NS_URI, local)
}

fn attribute_in<'e>(
    element: &'e XmlElement,
    scope: &NamespaceScope,
    uri: &str,
    local: &str,
) -> Option<&'e str> {
    element.plain_attributes().find_map(|(key, value)| {
        let (prefix, name) = split_qname(key);
        let bound = scope.resolve_prefix(prefix)?;
        (!prefix.is_empty() && name == local && bound.uri() == uri).then_some(value)
    })
}
