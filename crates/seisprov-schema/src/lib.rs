//! # seisprov-schema — SEIS-PROV Rule Schema
//!
//! The rule schema says which SEIS-PROV record types exist, which
//! attributes they carry and which values those attributes accept.
//!
//! - [`model`]: the typed [`Schema`], loaded and self-checked against
//!   `schemas/seis_prov.schema.json`.
//! - [`types`]: one checker per supported XML Schema type.
//! - [`registry`]: process-wide caches ([`default_schema`],
//!   [`SchemaRegistry`]).
//! - [`definitions`]: assembling a rule schema from per-record files.
//!
//! ## Crate Policy
//!
//! - Depends only on `seisprov-core` internally.
//! - Every [`SchemaError`] is a defect of a schema, never of a validated
//!   document.
//! - Loaded schemas are immutable and shared through `Arc`.

pub mod definitions;
pub mod error;
pub mod model;
pub mod registry;
pub mod types;

mod meta;

pub use definitions::{assemble, expected_label, Assembly, AssemblyIssue};
pub use error::{AssemblyError, SchemaError, Violation, Violations};
pub use meta::{DEFINITION_META_SCHEMA, RULE_META_SCHEMA};
pub use model::{
    AttributeDefinition, AttributePattern, Definition, Schema, SchemaSection, ANY_LABEL,
};
pub use registry::{default_schema, SchemaRegistry, DEFAULT_NAMESPACE, EMBEDDED_SCHEMA};
pub use types::{check, first_match, XsdType};
