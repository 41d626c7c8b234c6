//! The result of validating one document.

use std::fmt;

use crate::error::{ErrorCategory, ValidationError};

/// Warning for documents that are valid PROV but contain no SEIS-PROV
/// record.
pub const NO_SEIS_PROV_RECORDS: &str =
    "The document is a valid W3C PROV document but not a single SEIS-PROV record has been found.";

/// Errors and warnings of one validation run.
///
/// `Display` prints the errors, then each warning prefixed with
/// `WARNING: `, then `VALID SEIS-PROV FILE!` if there is no error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Error messages in the order they were found.
    pub errors: Vec<String>,
    /// Warning messages in the order they were found.
    pub warnings: Vec<String>,
    categories: Vec<ErrorCategory>,
}

impl ValidationResult {
    /// True if no error was found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The category of each entry of [`ValidationResult::errors`].
    pub fn categories(&self) -> &[ErrorCategory] {
        &self.categories
    }

    /// True if validation stopped on a defect of the schema or validator.
    pub fn has_internal_error(&self) -> bool {
        self.categories.contains(&ErrorCategory::Internal)
    }

    pub(crate) fn push_error(&mut self, error: ValidationError) {
        self.categories.push(error.category());
        self.errors.push(error.to_string());
    }

    pub(crate) fn push_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = self.errors.clone();
        lines.extend(self.warnings.iter().map(|w| format!("WARNING: {w}")));
        if self.is_valid() {
            lines.push("VALID SEIS-PROV FILE!".to_string());
        }
        f.write_str(lines.join("\n").trim())
    }
}
