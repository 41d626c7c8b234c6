//! Error types for schema loading and definition assembly.

use std::fmt;

use thiserror::Error;

/// A single meta-schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating value.
    pub instance_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// All violations of one document against a meta-schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    items: Vec<Violation>,
}

impl Violations {
    pub(crate) fn new(items: Vec<Violation>) -> Self {
        Self { items }
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if there are none.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The violations in the order the validator reported them.
    pub fn violations(&self) -> &[Violation] {
        &self.items
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Errors raised while loading a rule schema or checking a value type.
///
/// Every variant describes a defect of the schema itself, never of a
/// validated document. `Clone` so a failed load can be cached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema text could not be read or parsed.
    #[error("schema load error for '{source_name}': {reason}")]
    Load {
        /// File name or `<embedded>` marker.
        source_name: String,
        /// Underlying reason.
        reason: String,
    },

    /// The schema does not conform to its meta-schema.
    #[error("schema '{source_name}' does not conform to its meta-schema:\n{violations}")]
    MetaSchema {
        /// File name or `<embedded>` marker.
        source_name: String,
        /// Structured list of violations.
        violations: Violations,
    },

    /// A meta-schema could not be compiled.
    #[error("validator build error for meta-schema '{schema_name}': {reason}")]
    ValidatorBuild {
        /// Name of the meta-schema.
        schema_name: String,
        /// Reason reported by the compiler.
        reason: String,
    },

    /// A definition sits in a section that does not match its `type` or key.
    #[error("definition '{name}' is misplaced in section '{section}': {reason}")]
    Misplaced {
        /// Definition name.
        name: String,
        /// Section the definition was found in.
        section: String,
        /// What does not match.
        reason: String,
    },

    /// Two definitions share a two letter code.
    #[error("two letter code '{code}' is used by both '{first}' and '{second}'")]
    DuplicateCode {
        /// The shared code.
        code: String,
        /// Definition seen first.
        first: String,
        /// Definition seen second.
        second: String,
    },

    /// An attribute declares a type name without a checker.
    #[error("attribute '{attribute}' of '{definition}' declares unsupported type '{type_name}'")]
    UnsupportedType {
        /// Definition name.
        definition: String,
        /// Attribute name.
        attribute: String,
        /// The unsupported type name.
        type_name: String,
    },

    /// A pattern on an attribute that does not accept `xsd:string`.
    #[error("attribute '{attribute}' of '{definition}' has a pattern but does not accept xsd:string")]
    PatternWithoutString {
        /// Definition name.
        definition: String,
        /// Attribute name.
        attribute: String,
    },

    /// A pattern that is not a valid regular expression.
    #[error("attribute '{attribute}' of '{definition}' has an invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Definition name.
        definition: String,
        /// Attribute name.
        attribute: String,
        /// The authored pattern.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// A type name with no checker, asked for at check time.
    #[error("unsupported type '{0}'")]
    UnknownType(String),
}

/// Errors that stop definition assembly before any file is checked.
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// The definitions root is missing or not a directory.
    #[error("definitions directory '{0}' does not exist or is not a directory")]
    NotADirectory(String),

    /// A directory or file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// The path being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
