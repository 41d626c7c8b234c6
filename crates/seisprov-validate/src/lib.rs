//! # seisprov-validate — SEIS-PROV Validator
//!
//! Validates PROV-XML and PROV-JSON documents against the SEIS-PROV rule
//! schema.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let result = seisprov_validate::validate(Path::new("trace.xml"));
//! println!("{result}");
//! ```
//!
//! - [`document`]: the pipeline from bytes to [`ValidationResult`].
//! - [`classify`]: which records are SEIS-PROV records.
//! - [`record`]: the per-record rules.
//! - [`config`]: [`ValidatorConfig`] from YAML, environment, and code.
//!
//! ## Crate Policy
//!
//! - Never exits the process and never panics on bad input; every problem
//!   ends up in the [`ValidationResult`].
//! - Errors of different records are collected. Each record stops at its
//!   first failing check.
//! - A broken rule schema stops validation immediately.

pub mod classify;
pub mod config;
pub mod document;
pub mod error;
pub mod record;
pub mod report;

pub use classify::{classify, Classification};
pub use config::{ConfigError, NamespacePolicy, ValidatorConfig, ENV_SCHEMA, ENV_STRICT};
pub use document::{validate, ReadSeek, ValidationInput, Validator};
pub use error::{ErrorCategory, ValidationError};
pub use record::{validate_record, RecordOutcome};
pub use report::{ValidationResult, NO_SEIS_PROV_RECORDS};
