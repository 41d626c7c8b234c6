//! # Definition Assembly
//!
//! Rule schemas are authored as one JSON file per record type under a
//! directory tree (`definitions/{entities,activities,agents}/*.json`).
//! [`assemble`] checks every file and combines them into a rule schema.
//!
//! Per file:
//!
//! - it conforms to `schemas/definition.schema.json`;
//! - `name` equals the file stem;
//! - agents use the label `*`, every other record the capitalized words of
//!   its name (`bandpass_filter` gives `Bandpass Filter`);
//! - attribute names are unique.
//!
//! Across files: two letter codes and type names are unique. When no issue
//! was found the result is loaded as a [`Schema`] as a last check.
//!
//! Issues are collected, not returned as errors, so one run reports every
//! broken file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{AssemblyError, SchemaError};
use crate::meta;
use crate::model::{Schema, SchemaSection, ANY_LABEL};

/// A problem found in the definitions tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyIssue {
    /// The offending file, `None` for problems spanning files.
    pub path: Option<PathBuf>,
    /// What is wrong.
    pub message: String,
}

impl fmt::Display for AssemblyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "File '{}': {}", path.display(), self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Outcome of [`assemble`].
#[derive(Debug, Clone)]
pub struct Assembly {
    schema: Value,
    files: Vec<PathBuf>,
    issues: Vec<AssemblyIssue>,
}

impl Assembly {
    /// True if no issue was found.
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// All issues in discovery order.
    pub fn issues(&self) -> &[AssemblyIssue] {
        &self.issues
    }

    /// The definition files that were read, sorted.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// The assembled rule schema. Files with issues are left out.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// The assembled rule schema as pretty-printed JSON with sorted keys.
    pub fn to_json_string(&self) -> String {
        let mut text = serde_json::to_string_pretty(&self.schema).unwrap_or_default();
        text.push('\n');
        text
    }
}

/// The label a non-agent definition must carry.
pub fn expected_label(name: &str) -> String {
    name.split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Check and combine every definition file below `dir`.
///
/// `namespace` is written to `_metainformation.namespace`.
///
/// # Errors
///
/// [`AssemblyError`] if the tree cannot be read. Problems with individual
/// files are reported through [`Assembly::issues`].
pub fn assemble(dir: &Path, namespace: &str) -> Result<Assembly, AssemblyError> {
    if !dir.is_dir() {
        return Err(AssemblyError::NotADirectory(dir.display().to_string()));
    }
    let mut files = Vec::new();
    collect_json_files(dir, &mut files)?;
    files.sort();

    let mut issues = Vec::new();
    let mut sections: BTreeMap<SchemaSection, Map<String, Value>> = SchemaSection::ALL
        .into_iter()
        .map(|section| (section, Map::new()))
        .collect();
    let mut codes: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for path in &files {
        let text = std::fs::read_to_string(path).map_err(|source| AssemblyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match check_file(path, &text) {
            Ok((section, code, value)) => {
                codes.entry(code).or_default().push(path.clone());
                let name = value["name"].as_str().unwrap_or_default().to_string();
                let map = sections.entry(section).or_default();
                if map.contains_key(&name) {
                    issues.push(AssemblyIssue {
                        path: Some(path.clone()),
                        message: format!("Type name '{name}' is defined in more than one file."),
                    });
                } else {
                    map.insert(name, value);
                }
            }
            Err(message) => issues.push(AssemblyIssue {
                path: Some(path.clone()),
                message,
            }),
        }
    }

    for (code, paths) in &codes {
        if paths.len() > 1 {
            let listed: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            issues.push(AssemblyIssue {
                path: None,
                message: format!(
                    "Two letter code '{code}' is used in {} files: {}",
                    paths.len(),
                    listed.join(", ")
                ),
            });
        }
    }

    let mut root = Map::new();
    let mut meta_info = Map::new();
    meta_info.insert("namespace".into(), Value::String(namespace.to_string()));
    root.insert("_metainformation".into(), Value::Object(meta_info));
    for (section, map) in sections {
        root.insert(section.key().into(), Value::Object(map));
    }
    let schema = Value::Object(root);

    if issues.is_empty() {
        let origin = dir.display().to_string();
        if let Err(e) = Schema::from_value(schema.clone(), &origin, Some(namespace)) {
            issues.push(AssemblyIssue {
                path: None,
                message: format!("The assembled schema does not load: {e}"),
            });
        }
    }

    tracing::info!(
        dir = %dir.display(),
        files = files.len(),
        issues = issues.len(),
        "assembled SEIS-PROV definitions"
    );

    Ok(Assembly {
        schema,
        files,
        issues,
    })
}

fn check_file(path: &Path, text: &str) -> Result<(SchemaSection, String, Value), String> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| format!("Could not parse JSON: {e}"))?;
    meta::check_definition(&value, &path.display().to_string()).map_err(|e| match e {
        SchemaError::MetaSchema { violations, .. } => {
            format!("Does not conform to the definition schema:\n{violations}")
        }
        other => other.to_string(),
    })?;

    // The meta-schema guarantees these fields and their types.
    let name = value["name"].as_str().unwrap_or_default();
    let record_type = value["type"].as_str().unwrap_or_default();
    let label = value["label"].as_str().unwrap_or_default();
    let code = value["two_letter_code"].as_str().unwrap_or_default().to_string();

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if name != stem {
        return Err(format!(
            "'name' attribute '{name}' does not correspond to the filename."
        ));
    }

    let section = SchemaSection::from_record_type(record_type)
        .ok_or_else(|| format!("Unknown record type '{record_type}'."))?;
    let expected = if section == SchemaSection::Agents {
        ANY_LABEL.to_string()
    } else {
        expected_label(name)
    };
    if label != expected {
        return Err(format!(
            "'label' attribute '{label}' is not equal to the expected value '{expected}'."
        ));
    }

    let mut seen: Vec<&str> = Vec::new();
    let mut duplicates: Vec<&str> = Vec::new();
    for attr in value["attributes"].as_array().into_iter().flatten() {
        let attr_name = attr["name"].as_str().unwrap_or_default();
        if seen.contains(&attr_name) {
            if !duplicates.contains(&attr_name) {
                duplicates.push(attr_name);
            }
        } else {
            seen.push(attr_name);
        }
    }
    if !duplicates.is_empty() {
        duplicates.sort_unstable();
        let listed: Vec<String> = duplicates.iter().map(|d| format!("'{d}'")).collect();
        return Err(format!("Duplicate attributes: {}", listed.join(", ")));
    }

    Ok((section, code, value))
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), AssemblyError> {
    let io_err = |source| AssemblyError::Io {
        path: dir.display().to_string(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
            continue;
        }
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if is_json && file_name != "schema.json" && !file_name.ends_with(".schema.json") {
            out.push(path);
        }
    }
    Ok(())
}
