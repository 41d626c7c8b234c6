//! # Schema Cache
//!
//! Loading a rule schema parses JSON, runs a meta-schema check and compiles
//! regular expressions, so schemas are loaded once and shared:
//!
//! - [`default_schema`] holds the embedded schema for the default
//!   namespace. It is computed on first use; a failure is cached too.
//! - [`SchemaRegistry`] holds schemas keyed by (file path, namespace).
//!   Entries are never mutated after insertion; [`SchemaRegistry::reload`]
//!   replaces one explicitly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::error::SchemaError;
use crate::model::Schema;

/// Namespace URI of SEIS-PROV 0.1.
pub const DEFAULT_NAMESPACE: &str = "http://seisprov.org/seis_prov/0.1/#";

/// The rule schema shipped with the crate.
pub const EMBEDDED_SCHEMA: &str = include_str!("../../../schemas/seis_prov.json");

/// Source name reported for the embedded schema.
pub const EMBEDDED_SOURCE_NAME: &str = "<embedded seis_prov.json>";

static DEFAULT_SCHEMA: OnceLock<Result<Arc<Schema>, SchemaError>> = OnceLock::new();
static GLOBAL_REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();

impl Schema {
    /// Load the embedded rule schema for a namespace (`None`: the one it
    /// records).
    ///
    /// # Errors
    ///
    /// As [`Schema::load`]. The shipped schema passes all checks.
    pub fn embedded(namespace: Option<&str>) -> Result<Self, SchemaError> {
        Self::load(EMBEDDED_SCHEMA, EMBEDDED_SOURCE_NAME, namespace)
    }
}

/// The embedded schema for [`DEFAULT_NAMESPACE`], loaded once per process.
///
/// # Errors
///
/// The cached load error, on every call, if the embedded schema is broken.
pub fn default_schema() -> Result<Arc<Schema>, SchemaError> {
    DEFAULT_SCHEMA
        .get_or_init(|| Schema::embedded(Some(DEFAULT_NAMESPACE)).map(Arc::new))
        .clone()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RegistryKey {
    path: Option<PathBuf>,
    namespace: String,
}

/// Thread-safe cache of loaded rule schemas.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: RwLock<HashMap<RegistryKey, Arc<Schema>>>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static SchemaRegistry {
        GLOBAL_REGISTRY.get_or_init(SchemaRegistry::new)
    }

    /// The schema for `path` (`None`: the embedded one) and `namespace`,
    /// loading it on first request.
    ///
    /// # Errors
    ///
    /// Any load error. Failures are not cached here, so a fixed file is
    /// picked up by the next call.
    pub fn get_or_load(
        &self,
        path: Option<&Path>,
        namespace: &str,
    ) -> Result<Arc<Schema>, SchemaError> {
        if path.is_none() && namespace == DEFAULT_NAMESPACE {
            return default_schema();
        }
        let key = RegistryKey {
            path: path.map(Path::to_path_buf),
            namespace: namespace.to_string(),
        };
        if let Some(schema) = self.entries.read().get(&key) {
            return Ok(Arc::clone(schema));
        }
        let loaded = Arc::new(load(path, namespace)?);
        let mut guard = self.entries.write();
        Ok(Arc::clone(guard.entry(key).or_insert(loaded)))
    }

    /// Load the schema again and replace any cached entry.
    ///
    /// # Errors
    ///
    /// Any load error; the previous entry is kept in that case.
    pub fn reload(&self, path: Option<&Path>, namespace: &str) -> Result<Arc<Schema>, SchemaError> {
        let loaded = Arc::new(load(path, namespace)?);
        let key = RegistryKey {
            path: path.map(Path::to_path_buf),
            namespace: namespace.to_string(),
        };
        self.entries.write().insert(key, Arc::clone(&loaded));
        tracing::info!(source = loaded.source_name(), namespace, "reloaded rule schema");
        Ok(loaded)
    }

    /// Drop all cached entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn load(path: Option<&Path>, namespace: &str) -> Result<Schema, SchemaError> {
    match path {
        Some(path) => Schema::from_path(path, Some(namespace)),
        None => Schema::embedded(Some(namespace)),
    }
}
