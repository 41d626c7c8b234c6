//! # seisprov-core — Foundational PROV Types
//!
//! This crate defines the in-memory provenance graph that every other
//! crate in the workspace operates on. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Namespaces compare by URI.** Two [`Namespace`] values with the same
//!    URI are equal regardless of the prefix a document binds them to.
//!
//! 2. **Tagged attribute values.** [`AttributeValue`] is an explicit enum
//!    (native string, integer, double, boolean, dateTime, qualified name,
//!    URI, or a typed literal kept as text). Type checks pattern-match on
//!    the variant instead of probing the shape of a value.
//!
//! 3. **One attribute view.** PROV readers keep formal attributes (relation
//!    roles, activity times) apart from extra attributes. Validation only
//!    ever sees their union, an [`AttributeSet`] deduplicated on
//!    `(qualified name, value)`.
//!
//! 4. **Immutable after parsing.** Records and bundles are built once by a
//!    reader and only read afterwards.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `seisprov-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod namespace;
pub mod record;
pub mod temporal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use document::{Bundle, ProvDocument};
pub use error::CoreError;
pub use namespace::{Namespace, NamespaceScope, QualifiedName, PROV_NS_URI, XSD_NS_URI, XSI_NS_URI};
pub use record::{AttributeSet, Record, RecordKind, RelationKind};
pub use temporal::XsdDateTime;
pub use value::AttributeValue;
