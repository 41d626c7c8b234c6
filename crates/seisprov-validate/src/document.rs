//! # Document Validation
//!
//! Runs the full pipeline on one input:
//!
//! 1. open the input and detect its serialization;
//! 2. read it into a [`ProvDocument`];
//! 3. check the PROV-XML structure (JSON input is re-serialized first);
//! 4. require at least one record and the target namespace;
//! 5. validate every record of the root bundle and all named bundles;
//! 6. reject identifiers used more than once.
//!
//! Steps 1 to 4 stop at the first problem. Step 5 collects one error per
//! invalid record and continues, unless the schema itself turns out to be
//! broken.

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use seisprov_core::ProvDocument;
use seisprov_prov::{
    read_document, sniff_format, structural_source, DocumentFormat, ProvXmlStructure, Sniffed,
    StructuralValidator, StructureError,
};
use seisprov_schema::{Schema, SchemaRegistry};

use crate::config::ValidatorConfig;
use crate::error::ValidationError;
use crate::record::{validate_record, RecordOutcome};
use crate::report::{ValidationResult, NO_SEIS_PROV_RECORDS};

/// A seekable byte stream.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek + ?Sized> ReadSeek for T {}

/// Something to validate.
pub enum ValidationInput<'a> {
    /// A file on disk.
    Path(&'a Path),
    /// An in-memory document.
    Bytes(&'a [u8]),
    /// An open stream, read from its current position.
    Reader(&'a mut dyn ReadSeek),
}

impl<'a> From<&'a Path> for ValidationInput<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for ValidationInput<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Self::Path(path.as_path())
    }
}

impl<'a> From<&'a [u8]> for ValidationInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for ValidationInput<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::Bytes(bytes.as_slice())
    }
}

/// A configured SEIS-PROV validator.
///
/// Cheap to share: the rule schema sits behind an `Arc` and the
/// structural checker is stateless.
pub struct Validator {
    config: ValidatorConfig,
    schema: Arc<Schema>,
    structure: Box<dyn StructuralValidator>,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.config)
            .field("schema", &self.schema.source_name())
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Build a validator, loading the rule schema through the process-wide
    /// [`SchemaRegistry`].
    ///
    /// # Errors
    ///
    /// [`ValidationError::Schema`] if the rule schema cannot be loaded.
    pub fn new(config: ValidatorConfig) -> Result<Self, ValidationError> {
        let schema = SchemaRegistry::global()
            .get_or_load(config.schema_path.as_deref(), &config.namespace)?;
        Ok(Self::with_schema(config, schema))
    }

    /// Build a validator around an already loaded schema. The schema's
    /// namespace is the target namespace.
    pub fn with_schema(config: ValidatorConfig, schema: Arc<Schema>) -> Self {
        Self {
            config,
            schema,
            structure: Box::new(ProvXmlStructure),
        }
    }

    /// Replace the structural checker.
    pub fn with_structural_validator(mut self, structure: Box<dyn StructuralValidator>) -> Self {
        self.structure = structure;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// The rule schema in use.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validate one input.
    pub fn validate<'a>(&self, input: impl Into<ValidationInput<'a>>) -> ValidationResult {
        let mut result = ValidationResult::default();
        if let Err(error) = self.run(input.into(), &mut result) {
            result.push_error(error);
        }
        tracing::info!(
            valid = result.is_valid(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validated document"
        );
        result
    }

    fn run(
        &self,
        input: ValidationInput<'_>,
        result: &mut ValidationResult,
    ) -> Result<(), ValidationError> {
        let (format, bytes) = open(input)?;
        tracing::debug!(%format, bytes = bytes.len(), "detected serialization");

        let document = read_document(&bytes, format).map_err(|e| ValidationError::Parse {
            reason: e.to_string(),
        })?;
        let source = structural_source(&bytes, format, &document).map_err(structure_error)?;
        self.structure.check(&source).map_err(structure_error)?;

        if document.record_count() == 0 {
            return Err(ValidationError::NoRecords);
        }

        let target = self.schema.namespace();
        if document.find_namespace(target).is_none() {
            if self.config.is_strict() {
                return Err(ValidationError::NamespaceNotFound);
            }
            result.push_warning(NO_SEIS_PROV_RECORDS);
            return Ok(());
        }

        let (in_scope, ids) = self.validate_records(&document, result)?;
        if in_scope == 0 {
            result.push_warning(NO_SEIS_PROV_RECORDS);
            return Ok(());
        }

        let duplicates = duplicate_ids(ids);
        if !duplicates.is_empty() {
            result.push_error(ValidationError::DuplicateIds { ids: duplicates });
        }
        Ok(())
    }

    /// Validate every record. Returns the number of in-scope records and
    /// the identifier local parts of the valid ones.
    fn validate_records(
        &self,
        document: &ProvDocument,
        result: &mut ValidationResult,
    ) -> Result<(usize, Vec<String>), ValidationError> {
        let mut in_scope = 0;
        let mut ids = Vec::new();
        for bundle in document.all_bundles() {
            for record in bundle.records() {
                let outcome = validate_record(record, bundle.namespaces(), &self.schema);
                if !matches!(outcome, RecordOutcome::OutOfScope) {
                    in_scope += 1;
                }
                match outcome {
                    RecordOutcome::Valid { local_id } => ids.push(local_id),
                    RecordOutcome::Invalid { error } if error.is_internal() => return Err(error),
                    RecordOutcome::Invalid { error } => result.push_error(error),
                    RecordOutcome::OutOfScope => {}
                }
            }
        }
        Ok((in_scope, ids))
    }
}

/// Validate with the default configuration.
///
/// Schema problems are reported inside the result, never as a panic.
pub fn validate<'a>(input: impl Into<ValidationInput<'a>>) -> ValidationResult {
    match Validator::new(ValidatorConfig::default()) {
        Ok(validator) => validator.validate(input),
        Err(error) => {
            let mut result = ValidationResult::default();
            result.push_error(error);
            result
        }
    }
}

fn open(input: ValidationInput<'_>) -> Result<(DocumentFormat, Vec<u8>), ValidationError> {
    match input {
        ValidationInput::Path(path) => {
            let shown = path.display().to_string();
            if !path.exists() {
                return Err(ValidationError::PathNotFound { path: shown });
            }
            if !path.is_file() {
                return Err(ValidationError::NotAFile { path: shown });
            }
            let mut file = File::open(path).map_err(|e| ValidationError::Read {
                source_name: shown.clone(),
                reason: e.to_string(),
            })?;
            load(&mut file, &shown)
        }
        ValidationInput::Bytes(bytes) => load(&mut Cursor::new(bytes), "<bytes>"),
        ValidationInput::Reader(mut reader) => load(&mut reader, "<stream>"),
    }
}

fn load<R: Read + Seek>(
    stream: &mut R,
    source_name: &str,
) -> Result<(DocumentFormat, Vec<u8>), ValidationError> {
    let read_error = |e: std::io::Error| ValidationError::Read {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    };
    let format = match sniff_format(stream).map_err(read_error)? {
        Sniffed::Format(format) => format,
        Sniffed::Neither => return Err(ValidationError::UnknownFormat),
        Sniffed::Both => return Err(ValidationError::AmbiguousFormat),
    };
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).map_err(read_error)?;
    Ok((format, bytes))
}

fn structure_error(error: StructureError) -> ValidationError {
    let details = match error {
        StructureError::Invalid { diagnostics } => diagnostics.to_string(),
        other => other.to_string(),
    };
    ValidationError::Structure { details }
}

/// Each identifier used more than once, sorted.
fn duplicate_ids(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    let mut duplicates: Vec<String> = ids
        .windows(2)
        .filter(|pair| pair[0] == pair[1])
        .map(|pair| pair[0].clone())
        .collect();
    duplicates.dedup();
    duplicates
}
