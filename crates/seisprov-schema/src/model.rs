//! # Rule Schema Model
//!
//! The typed form of a SEIS-PROV rule schema: three sections (entities,
//! activities, agents), each mapping a type name to a [`Definition`].
//!
//! Loading goes through three gates, each reported as a [`SchemaError`]:
//!
//! 1. JSON parse.
//! 2. Meta-schema check against `schemas/seis_prov.schema.json`.
//! 3. Semantic checks the meta-schema cannot express: section placement,
//!    unique two letter codes, supported type names, patterns only on
//!    string-typed attributes, compilable patterns.
//!
//! A loaded [`Schema`] is immutable.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use regex::Regex;
use seisprov_core::{AttributeValue, RecordKind};
use serde::Deserialize;
use serde_json::Value;

use crate::error::SchemaError;
use crate::meta;
use crate::types::{first_match, XsdType};

/// Label marker meaning "any label is acceptable".
pub const ANY_LABEL: &str = "*";

// ---- raw serde shapes ----

#[derive(Debug, Deserialize)]
struct RawSchema {
    #[serde(rename = "_metainformation")]
    meta: RawMeta,
    entities: BTreeMap<String, RawDefinition>,
    activities: BTreeMap<String, RawDefinition>,
    agents: BTreeMap<String, RawDefinition>,
}

#[derive(Debug, Deserialize)]
struct RawMeta {
    namespace: String,
}

#[derive(Debug, Deserialize)]
struct RawDefinition {
    name: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    two_letter_code: String,
    label: String,
    #[serde(default)]
    description: String,
    other_seis_prov_attributes_allowed: bool,
    attributes: Vec<RawAttribute>,
}

#[derive(Debug, Deserialize)]
struct RawAttribute {
    name: String,
    types: Vec<String>,
    required: bool,
    #[serde(default)]
    description: String,
    #[serde(default)]
    example_value: Option<Value>,
    #[serde(default)]
    pattern: Option<String>,
}

// ---- sections ----

/// One of the three definition maps of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaSection {
    /// `entities`
    Entities,
    /// `activities`
    Activities,
    /// `agents`
    Agents,
}

impl SchemaSection {
    /// All sections in schema order.
    pub const ALL: [SchemaSection; 3] = [Self::Entities, Self::Activities, Self::Agents];

    /// The JSON key of the section.
    pub fn key(self) -> &'static str {
        match self {
            Self::Entities => "entities",
            Self::Activities => "activities",
            Self::Agents => "agents",
        }
    }

    /// The singular `type` value of definitions in this section.
    pub fn record_type(self) -> &'static str {
        match self {
            Self::Entities => "entity",
            Self::Activities => "activity",
            Self::Agents => "agent",
        }
    }

    /// The section for a `type` value, if it names one.
    pub fn from_record_type(record_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.record_type() == record_type)
    }

    /// The section holding definitions for a record kind. Relations have
    /// none.
    pub fn for_kind(kind: RecordKind) -> Option<Self> {
        match kind {
            RecordKind::Entity => Some(Self::Entities),
            RecordKind::Activity => Some(Self::Activities),
            RecordKind::Agent => Some(Self::Agents),
            RecordKind::Relation(_) => None,
        }
    }
}

impl fmt::Display for SchemaSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---- definitions ----

/// A compiled attribute pattern.
///
/// Matching is anchored at the start of the text only; an authored
/// pattern anchors its end with `$` if it needs to.
#[derive(Debug, Clone)]
pub struct AttributePattern {
    source: String,
    regex: Regex,
}

impl AttributePattern {
    fn compile(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: source.to_string(),
            regex: Regex::new(&format!("^(?:{source})"))?,
        })
    }

    /// The pattern as authored.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if the start of `text` matches.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// One attribute of a record definition.
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    name: String,
    required: bool,
    types: Vec<XsdType>,
    pattern: Option<AttributePattern>,
    description: String,
    example_value: Option<Value>,
}

impl AttributeDefinition {
    /// Attribute name, the local part in the SEIS-PROV namespace.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if a record must carry this attribute.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Accepted types in declared order.
    pub fn types(&self) -> &[XsdType] {
        &self.types
    }

    /// The value pattern, if any.
    pub fn pattern(&self) -> Option<&AttributePattern> {
        self.pattern.as_ref()
    }

    /// Free-text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Example value from the schema, for documentation.
    pub fn example_value(&self) -> Option<&Value> {
        self.example_value.as_ref()
    }

    /// True if `xsd:string` is among the accepted types.
    pub fn accepts_strings(&self) -> bool {
        self.types.contains(&XsdType::String)
    }

    /// The first declared type that accepts `value`.
    pub fn matching_type(&self, value: &AttributeValue) -> Option<XsdType> {
        first_match(&self.types, value)
    }

    /// The accepted type names joined for messages: `xsd:a, xsd:b`.
    pub fn type_list(&self) -> String {
        self.types
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The rules for one SEIS-PROV record type.
#[derive(Debug, Clone)]
pub struct Definition {
    name: String,
    section: SchemaSection,
    label: String,
    two_letter_code: String,
    description: String,
    other_attributes_allowed: bool,
    attributes: Vec<AttributeDefinition>,
    identifier_pattern: String,
    identifier_regex: Regex,
}

impl Definition {
    /// Type name, e.g. `waveform_trace`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Section the definition belongs to.
    pub fn section(&self) -> SchemaSection {
        self.section
    }

    /// Required label, or [`ANY_LABEL`].
    pub fn label(&self) -> &str {
        &self.label
    }

    /// True if the label is not constrained.
    pub fn accepts_any_label(&self) -> bool {
        self.label == ANY_LABEL
    }

    /// Two letter code used in identifiers.
    pub fn two_letter_code(&self) -> &str {
        &self.two_letter_code
    }

    /// Free-text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// True if undeclared attributes in the SEIS-PROV namespace are allowed.
    pub fn other_attributes_allowed(&self) -> bool {
        self.other_attributes_allowed
    }

    /// All declared attributes in schema order.
    pub fn attributes(&self) -> &[AttributeDefinition] {
        &self.attributes
    }

    /// Look up a declared attribute.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Declared attributes a record must carry.
    pub fn required_attributes(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.iter().filter(|a| a.required)
    }

    /// The identifier regular expression, for messages.
    pub fn identifier_pattern(&self) -> &str {
        &self.identifier_pattern
    }

    /// True if an identifier local part has the form
    /// `sp<3-5 digits>_<code>_<7-12 lowercase alphanumerics>`.
    pub fn matches_identifier(&self, local_part: &str) -> bool {
        self.identifier_regex.is_match(local_part)
    }

    fn from_raw(
        key: &str,
        section: SchemaSection,
        raw: RawDefinition,
    ) -> Result<Self, SchemaError> {
        if raw.name != key {
            return Err(SchemaError::Misplaced {
                name: raw.name,
                section: section.key().to_string(),
                reason: format!("stored under key '{key}'"),
            });
        }
        if let Some(kind) = raw.kind.as_deref() {
            if kind != section.record_type() {
                return Err(SchemaError::Misplaced {
                    name: raw.name,
                    section: section.key().to_string(),
                    reason: format!("declares type '{kind}'"),
                });
            }
        }

        let mut attributes = Vec::with_capacity(raw.attributes.len());
        for attr in raw.attributes {
            let types = attr
                .types
                .iter()
                .map(|name| {
                    name.parse::<XsdType>()
                        .map_err(|_| SchemaError::UnsupportedType {
                            definition: raw.name.clone(),
                            attribute: attr.name.clone(),
                            type_name: name.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let pattern = match attr.pattern.as_deref() {
                None => None,
                Some(source) => {
                    if !types.contains(&XsdType::String) {
                        return Err(SchemaError::PatternWithoutString {
                            definition: raw.name.clone(),
                            attribute: attr.name.clone(),
                        });
                    }
                    let compiled = AttributePattern::compile(source).map_err(|e| {
                        SchemaError::InvalidPattern {
                            definition: raw.name.clone(),
                            attribute: attr.name.clone(),
                            pattern: source.to_string(),
                            reason: e.to_string(),
                        }
                    })?;
                    Some(compiled)
                }
            };

            attributes.push(AttributeDefinition {
                name: attr.name,
                required: attr.required,
                types,
                pattern,
                description: attr.description,
                example_value: attr.example_value,
            });
        }

        let identifier_pattern = format!(
            r"^sp\d{{3,5}}_{}_[a-z0-9]{{7,12}}$",
            regex::escape(&raw.two_letter_code)
        );
        let identifier_regex =
            Regex::new(&identifier_pattern).map_err(|e| SchemaError::InvalidPattern {
                definition: raw.name.clone(),
                attribute: "two_letter_code".to_string(),
                pattern: identifier_pattern.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            name: raw.name,
            section,
            label: raw.label,
            two_letter_code: raw.two_letter_code,
            description: raw.description,
            other_attributes_allowed: raw.other_seis_prov_attributes_allowed,
            attributes,
            identifier_pattern,
            identifier_regex,
        })
    }
}

// ---- schema ----

/// A loaded, self-checked rule schema.
#[derive(Debug, Clone)]
pub struct Schema {
    namespace: String,
    source_name: String,
    sections: BTreeMap<SchemaSection, BTreeMap<String, Definition>>,
}

impl Schema {
    /// Parse and check a rule schema.
    ///
    /// `namespace` is the target namespace URI the schema is used for;
    /// `None` takes the one recorded in `_metainformation.namespace`.
    ///
    /// # Errors
    ///
    /// Any [`SchemaError`] from the three load gates.
    pub fn load(
        text: &str,
        source_name: &str,
        namespace: Option<&str>,
    ) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(text).map_err(|e| SchemaError::Load {
            source_name: source_name.to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;
        Self::from_value(value, source_name, namespace)
    }

    /// Check and convert an already parsed rule schema.
    ///
    /// # Errors
    ///
    /// As [`Schema::load`], minus the JSON parse.
    pub fn from_value(
        value: Value,
        source_name: &str,
        namespace: Option<&str>,
    ) -> Result<Self, SchemaError> {
        meta::check_rule_schema(&value, source_name)?;
        let raw: RawSchema = serde_json::from_value(value).map_err(|e| SchemaError::Load {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })?;

        let namespace = namespace.map_or(raw.meta.namespace, str::to_string);
        let mut sections = BTreeMap::new();
        let mut codes: BTreeMap<String, String> = BTreeMap::new();
        let raw_sections = [
            (SchemaSection::Entities, raw.entities),
            (SchemaSection::Activities, raw.activities),
            (SchemaSection::Agents, raw.agents),
        ];
        for (section, definitions) in raw_sections {
            let mut map = BTreeMap::new();
            for (key, raw_def) in definitions {
                let def = Definition::from_raw(&key, section, raw_def)?;
                if let Some(first) = codes.get(&def.two_letter_code) {
                    return Err(SchemaError::DuplicateCode {
                        code: def.two_letter_code.clone(),
                        first: first.clone(),
                        second: def.name.clone(),
                    });
                }
                codes.insert(def.two_letter_code.clone(), def.name.clone());
                map.insert(key, def);
            }
            sections.insert(section, map);
        }

        tracing::debug!(
            source = source_name,
            namespace = %namespace,
            definitions = codes.len(),
            "loaded SEIS-PROV rule schema"
        );

        Ok(Self {
            namespace,
            source_name: source_name.to_string(),
            sections,
        })
    }

    /// Load a rule schema from a file.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Load`] if the file cannot be read, otherwise as
    /// [`Schema::load`].
    pub fn from_path(path: &Path, namespace: Option<&str>) -> Result<Self, SchemaError> {
        let source_name = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::Load {
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;
        Self::load(&text, &source_name, namespace)
    }

    /// Target namespace URI.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Where the schema was loaded from.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// The definitions of one section.
    pub fn section(&self, section: SchemaSection) -> Option<&BTreeMap<String, Definition>> {
        self.sections.get(&section)
    }

    /// The definitions applicable to a record kind; `None` for kinds the
    /// schema has no section for.
    pub fn section_for(&self, kind: RecordKind) -> Option<&BTreeMap<String, Definition>> {
        SchemaSection::for_kind(kind).and_then(|section| self.section(section))
    }

    /// Look up a definition by section and type name.
    pub fn lookup(&self, section: SchemaSection, name: &str) -> Option<&Definition> {
        self.section(section).and_then(|defs| defs.get(name))
    }

    /// All definitions, section by section.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.sections.values().flat_map(|defs| defs.values())
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }

    /// True if the schema has no definitions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
