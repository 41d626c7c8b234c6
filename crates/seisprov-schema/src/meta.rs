//! Meta-schema checks for rule schemas and single record definitions.
//!
//! Both meta-schemas are draft-07 documents embedded at compile time. They
//! are compiled once per process; a compile failure is cached as well.

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;

use crate::error::{SchemaError, Violation, Violations};

/// Meta-schema of a complete rule schema.
pub const RULE_META_SCHEMA: &str = include_str!("../../../schemas/seis_prov.schema.json");

/// Meta-schema of one record definition file.
pub const DEFINITION_META_SCHEMA: &str = include_str!("../../../schemas/definition.schema.json");

static RULE_VALIDATOR: OnceLock<Result<Validator, SchemaError>> = OnceLock::new();
static DEFINITION_VALIDATOR: OnceLock<Result<Validator, SchemaError>> = OnceLock::new();

fn compile(schema_name: &str, text: &str) -> Result<Validator, SchemaError> {
    let value: Value = serde_json::from_str(text).map_err(|e| SchemaError::ValidatorBuild {
        schema_name: schema_name.to_string(),
        reason: format!("invalid JSON: {e}"),
    })?;
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft7);
    opts.build(&value).map_err(|e| SchemaError::ValidatorBuild {
        schema_name: schema_name.to_string(),
        reason: e.to_string(),
    })
}

fn cached(
    cell: &'static OnceLock<Result<Validator, SchemaError>>,
    schema_name: &str,
    text: &str,
) -> Result<&'static Validator, SchemaError> {
    cell.get_or_init(|| compile(schema_name, text))
        .as_ref()
        .map_err(Clone::clone)
}

fn check_with(
    validator: &Validator,
    instance: &Value,
    source_name: &str,
) -> Result<(), SchemaError> {
    let violations: Vec<Violation> = validator
        .iter_errors(instance)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::MetaSchema {
            source_name: source_name.to_string(),
            violations: Violations::new(violations),
        })
    }
}

/// Check a complete rule schema against its meta-schema.
pub(crate) fn check_rule_schema(instance: &Value, source_name: &str) -> Result<(), SchemaError> {
    let validator = cached(&RULE_VALIDATOR, "seis_prov.schema.json", RULE_META_SCHEMA)?;
    check_with(validator, instance, source_name)
}

/// Check one record definition against its meta-schema.
pub(crate) fn check_definition(instance: &Value, source_name: &str) -> Result<(), SchemaError> {
    let validator = cached(
        &DEFINITION_VALIDATOR,
        "definition.schema.json",
        DEFINITION_META_SCHEMA,
    )?;
    check_with(validator, instance, source_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_meta_schemas_compile() {
        assert!(cached(&RULE_VALIDATOR, "seis_prov.schema.json", RULE_META_SCHEMA).is_ok());
        assert!(cached(
            &DEFINITION_VALIDATOR,
            "definition.schema.json",
            DEFINITION_META_SCHEMA
        )
        .is_ok());
    }

    #[test]
    fn test_rule_schema_requires_sections() {
        let err = check_rule_schema(&json!({"_metainformation": {"namespace": "x"}}), "t")
            .unwrap_err();
        match err {
            SchemaError::MetaSchema { violations, .. } => assert!(!violations.is_empty()),
            other => panic!("expected MetaSchema, got {other:?}"),
        }
    }

    #[test]
    fn test_definition_rejects_unknown_type_name() {
        let def = json!({
            "name": "decimate",
            "type": "activity",
            "two_letter_code": "dc",
            "label": "Decimate",
            "description": "",
            "other_seis_prov_attributes_allowed": false,
            "attributes": [
                {"name": "factor", "types": ["xsd:gYear"], "required": true, "description": ""}
            ]
        });
        assert!(check_definition(&def, "decimate.json").is_err());
    }
}
