//! # PROV-JSON Reader
//!
//! Reads the W3C PROV-JSON serialization:
//!
//! ```json
//! {
//!   "prefix": { "seis_prov": "http://seisprov.org/seis_prov/0.1/#" },
//!   "entity": {
//!     "seis_prov:sp001_wf_f4e2a9c8b0": {
//!       "prov:label": "Waveform Trace",
//!       "prov:type": "seis_prov:waveform_trace",
//!       "seis_prov:number_of_samples": { "$": "6000", "type": "xsd:positiveInteger" }
//!     }
//!   },
//!   "wasGeneratedBy": { "_:id1": { "prov:entity": "...", "prov:activity": "..." } },
//!   "bundle": { "ex:b1": { "prefix": { }, "entity": { } } }
//! }
//! ```
//!
//! `prov` and `xsd` are predeclared. Record ids starting with `_:` are
//! blank and read as anonymous records. Plain JSON strings stay strings,
//! including `prov:type` values; only formal relation roles are resolved to
//! qualified names. Arrays give an attribute several values.

use serde_json::{Map, Value};

use seisprov_core::{
    AttributeValue, Bundle, Namespace, NamespaceScope, ProvDocument, QualifiedName, Record,
    RecordKind, PROV_NS_URI,
};

use crate::error::ParseError;
use crate::vocab;

/// Read a PROV-JSON document.
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not JSON, is not a PROV-JSON
/// object, uses an unknown record type key, or uses an undeclared prefix.
pub fn read_json(text: &str) -> Result<ProvDocument, ParseError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ParseError::MalformedJson(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(ParseError::invalid(
            "PROV-JSON",
            "the top-level value is not an object",
        ));
    };

    let scope = declare_prefixes(NamespaceScope::with_prov_defaults(), &map)?;
    let mut document = ProvDocument::new(scope.clone());
    let (records, bundles) = read_container(&map, &scope, false)?;
    for record in records {
        document.root_mut().push_record(record);
    }
    for bundle in bundles {
        document.push_bundle(bundle);
    }
    Ok(document)
}

fn declare_prefixes(
    parent: NamespaceScope,
    container: &Map<String, Value>,
) -> Result<NamespaceScope, ParseError> {
    let Some(prefixes) = container.get("prefix") else {
        return Ok(parent);
    };
    let Value::Object(prefixes) = prefixes else {
        return Err(ParseError::invalid("prefix", "expected an object"));
    };
    let mut declared = Vec::with_capacity(prefixes.len());
    for (prefix, uri) in prefixes {
        let uri = uri.as_str().ok_or_else(|| {
            ParseError::invalid(format!("prefix '{prefix}'"), "URI is not a string")
        })?;
        let prefix = if prefix == "default" { "" } else { prefix.as_str() };
        declared.push(Namespace::new(prefix, uri));
    }
    Ok(parent.child(declared))
}

fn read_container(
    container: &Map<String, Value>,
    scope: &NamespaceScope,
    nested: bool,
) -> Result<(Vec<Record>, Vec<Bundle>), ParseError> {
    let mut records = Vec::new();
    let mut bundles = Vec::new();

    for (key, content) in container {
        match key.as_str() {
            "prefix" => continue,
            "bundle" => {
                if nested {
                    return Err(ParseError::invalid("bundle", "bundles cannot be nested"));
                }
                for (bundle_id, bundle_content) in as_object(key, content)? {
                    let bundle_map = as_object(bundle_id, bundle_content)?;
                    let bundle_scope = declare_prefixes(scope.clone(), bundle_map)?;
                    let identifier = resolve(&bundle_scope, bundle_id)?;
                    let (bundle_records, _) = read_container(bundle_map, &bundle_scope, true)?;
                    let mut bundle = Bundle::new(Some(identifier), bundle_scope);
                    for record in bundle_records {
                        bundle.push_record(record);
                    }
                    bundles.push(bundle);
                }
            }
            name => {
                let (kind, implied_type) = vocab::statement_kind(name).ok_or_else(|| {
                    ParseError::invalid(format!("'{name}'"), "not a PROV-JSON record type")
                })?;
                for (record_id, body) in as_object(key, content)? {
                    let bodies: Vec<&Value> = match body {
                        Value::Array(items) => items.iter().collect(),
                        other => vec![other],
                    };
                    for body in bodies {
                        let body = as_object(record_id, body)?;
                        records.push(read_record(kind, implied_type, record_id, body, scope)?);
                    }
                }
            }
        }
    }
    Ok((records, bundles))
}

fn read_record(
    kind: RecordKind,
    implied_type: Option<&'static str>,
    record_id: &str,
    body: &Map<String, Value>,
    scope: &NamespaceScope,
) -> Result<Record, ParseError> {
    let identifier = if record_id.starts_with("_:") {
        None
    } else {
        Some(resolve(scope, record_id)?)
    };
    let mut record = Record::new(kind, identifier);
    if let Some(prov_type) = implied_type {
        record.push_extra(
            QualifiedName::prov("type"),
            AttributeValue::QualifiedName(QualifiedName::prov(prov_type)),
        );
    }

    for (attribute, raw) in body {
        let key = resolve(scope, attribute)?;
        let values: Vec<&Value> = match raw {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        let role = if key.is_in(PROV_NS_URI) {
            vocab::formal_role(kind, key.local_part())
        } else {
            None
        };
        for raw in values {
            let Some(local) = role else {
                record.push_extra(key.clone(), json_value(raw, scope, attribute)?);
                continue;
            };
            let text = scalar_text(raw).ok_or_else(|| {
                ParseError::invalid(format!("{record_id}/{attribute}"), "expected a string")
            })?;
            let value = if vocab::is_time_attribute(local) {
                AttributeValue::from_typed_text("xsd:dateTime", &text)
            } else {
                AttributeValue::QualifiedName(resolve(scope, &text)?)
            };
            record.push_formal(QualifiedName::prov(local), value);
        }
    }
    Ok(record)
}

/// Map a PROV-JSON attribute value onto an [`AttributeValue`].
fn json_value(
    raw: &Value,
    scope: &NamespaceScope,
    context: &str,
) -> Result<AttributeValue, ParseError> {
    match raw {
        Value::String(s) => Ok(AttributeValue::String(s.clone())),
        Value::Bool(b) => Ok(AttributeValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(AttributeValue::Int(i)),
            None => n
                .as_f64()
                .map(AttributeValue::Double)
                .ok_or_else(|| ParseError::invalid(context, format!("number {n} out of range"))),
        },
        Value::Object(typed) => {
            let text = typed.get("$").and_then(scalar_text).ok_or_else(|| {
                ParseError::invalid(context, "typed value without a '$' member")
            })?;
            let Some(written) = typed.get("type").and_then(Value::as_str) else {
                return Ok(AttributeValue::String(text));
            };
            let datatype = resolve(scope, written)?;
            let normalized = vocab::normalize_datatype(&datatype, written);
            if vocab::is_qualified_name_type(&normalized) {
                return resolve(scope, &text).map(AttributeValue::QualifiedName);
            }
            Ok(AttributeValue::from_typed_text(&normalized, &text))
        }
        Value::Null | Value::Array(_) => Err(ParseError::invalid(
            context,
            "attribute values must be scalars or typed objects",
        )),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_object<'v>(context: &str, value: &'v Value) -> Result<&'v Map<String, Value>, ParseError> {
    value
        .as_object()
        .ok_or_else(|| ParseError::invalid(format!("'{context}'"), "expected an object"))
}

fn resolve(scope: &NamespaceScope, text: &str) -> Result<QualifiedName, ParseError> {
    scope
        .resolve(text)
        .map_err(|source| ParseError::Name { line: 0, source })
}
