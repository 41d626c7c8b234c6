//! # Documents and Bundles
//!
//! A [`ProvDocument`] is a root [`Bundle`] plus any number of named
//! bundles. PROV does not nest bundles, so the structure is two levels deep.
//! Each bundle carries the namespace scope its records were read in.

use crate::namespace::{Namespace, NamespaceScope, QualifiedName};
use crate::record::Record;

/// A set of records read under one namespace scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    identifier: Option<QualifiedName>,
    namespaces: NamespaceScope,
    records: Vec<Record>,
}

impl Bundle {
    /// Create an empty bundle.
    pub fn new(identifier: Option<QualifiedName>, namespaces: NamespaceScope) -> Self {
        Self {
            identifier,
            namespaces,
            records: Vec::new(),
        }
    }

    /// The bundle identifier (`None` for the document root).
    pub fn identifier(&self) -> Option<&QualifiedName> {
        self.identifier.as_ref()
    }

    /// Namespace bindings in scope for the records of this bundle.
    pub fn namespaces(&self) -> &NamespaceScope {
        &self.namespaces
    }

    /// Records in document order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Append a record.
    pub fn push_record(&mut self, record: Record) {
        self.records.push(record);
    }
}

/// A parsed PROV document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvDocument {
    root: Bundle,
    bundles: Vec<Bundle>,
}

impl ProvDocument {
    /// Create an empty document with the given root namespace scope.
    pub fn new(namespaces: NamespaceScope) -> Self {
        Self {
            root: Bundle::new(None, namespaces),
            bundles: Vec::new(),
        }
    }

    /// The root bundle.
    pub fn root(&self) -> &Bundle {
        &self.root
    }

    /// Mutable access to the root bundle, for readers.
    pub fn root_mut(&mut self) -> &mut Bundle {
        &mut self.root
    }

    /// Named bundles in document order.
    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    /// Append a named bundle.
    pub fn push_bundle(&mut self, bundle: Bundle) {
        self.bundles.push(bundle);
    }

    /// The root bundle followed by all named bundles.
    pub fn all_bundles(&self) -> impl Iterator<Item = &Bundle> {
        std::iter::once(&self.root).chain(self.bundles.iter())
    }

    /// Total number of records across root and bundles.
    pub fn record_count(&self) -> usize {
        self.all_bundles().map(|b| b.records().len()).sum()
    }

    /// Find a declared namespace by URI anywhere in the document.
    pub fn find_namespace(&self, uri: &str) -> Option<&Namespace> {
        self.all_bundles()
            .find_map(|bundle| bundle.namespaces().find_uri(uri))
    }
}
