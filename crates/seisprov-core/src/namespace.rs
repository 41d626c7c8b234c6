//! # Namespaces and Qualified Names
//!
//! A [`Namespace`] is a `(prefix, uri)` pair whose identity is the URI.
//! A [`QualifiedName`] pairs a namespace with a local part and renders as
//! `prefix:local`.
//!
//! [`NamespaceScope`] holds the prefix bindings visible at one point of a
//! document (the document root, or a bundle which inherits the root
//! bindings and may add its own).

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The W3C PROV namespace.
pub const PROV_NS_URI: &str = "http://www.w3.org/ns/prov#";

/// The XML Schema datatypes namespace as used by PROV-XML.
pub const XSD_NS_URI: &str = "http://www.w3.org/2001/XMLSchema";

/// The XML Schema instance namespace (`xsi:type`).
pub const XSI_NS_URI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// A namespace: a prefix bound to a URI.
///
/// Equality and hashing only consider the URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace {
    prefix: String,
    uri: String,
}

impl Namespace {
    /// Create a namespace binding. An empty prefix denotes the default namespace.
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// The `prov` namespace.
    pub fn prov() -> Self {
        Self::new("prov", PROV_NS_URI)
    }

    /// The `xsd` namespace.
    pub fn xsd() -> Self {
        Self::new("xsd", XSD_NS_URI)
    }

    /// The prefix this namespace is bound to.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The namespace URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// True if this is the PROV namespace.
    pub fn is_prov(&self) -> bool {
        self.uri == PROV_NS_URI
    }

    /// True if this is the XML Schema namespace. PROV-JSON writes the URI
    /// with a trailing `#`, PROV-XML without; both are accepted.
    pub fn is_xsd(&self) -> bool {
        self.uri.trim_end_matches('#') == XSD_NS_URI
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for Namespace {}

impl Hash for Namespace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: <{}>", self.prefix, self.uri)
    }
}

/// A name qualified by a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    namespace: Namespace,
    local: String,
}

impl QualifiedName {
    /// Create a qualified name.
    pub fn new(namespace: Namespace, local: impl Into<String>) -> Self {
        Self {
            namespace,
            local: local.into(),
        }
    }

    /// A name in the PROV namespace, e.g. `prov:type`.
    pub fn prov(local: impl Into<String>) -> Self {
        Self::new(Namespace::prov(), local)
    }

    /// The namespace of this name.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The local part.
    pub fn local_part(&self) -> &str {
        &self.local
    }

    /// Full URI (namespace URI + local part).
    pub fn uri(&self) -> String {
        format!("{}{}", self.namespace.uri(), self.local)
    }

    /// True if this name is in the namespace with the given URI.
    pub fn is_in(&self, uri: &str) -> bool {
        self.namespace.uri() == uri
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.prefix().is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{}:{}", self.namespace.prefix(), self.local)
        }
    }
}

/// Prefix bindings visible at one point of a document.
///
/// Later bindings shadow earlier ones with the same prefix, so a bundle
/// scope is built by appending its own declarations to the parent's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceScope {
    bindings: Vec<Namespace>,
}

impl NamespaceScope {
    /// An empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope with the `prov` and `xsd` prefixes predeclared, as PROV-JSON
    /// defines them implicitly.
    pub fn with_prov_defaults() -> Self {
        let mut scope = Self::new();
        scope.declare(Namespace::prov());
        scope.declare(Namespace::new("xsd", format!("{XSD_NS_URI}#")));
        scope
    }

    /// A child scope: all bindings of `self` plus `own`.
    pub fn child(&self, own: impl IntoIterator<Item = Namespace>) -> Self {
        let mut scope = self.clone();
        for ns in own {
            scope.declare(ns);
        }
        scope
    }

    /// Add a binding. A rebinding of an existing prefix shadows it.
    pub fn declare(&mut self, namespace: Namespace) {
        self.bindings
            .retain(|existing| existing.prefix() != namespace.prefix());
        self.bindings.push(namespace);
    }

    /// All bindings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Namespace> {
        self.bindings.iter()
    }

    /// Look up the namespace bound to `prefix` (`""` is the default namespace).
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&Namespace> {
        self.bindings.iter().rev().find(|ns| ns.prefix() == prefix)
    }

    /// Find the binding for a namespace URI, if any prefix is bound to it.
    pub fn find_uri(&self, uri: &str) -> Option<&Namespace> {
        self.bindings.iter().rev().find(|ns| ns.uri() == uri)
    }

    /// Resolve `prefix:local` (or an unprefixed name against the default
    /// namespace) into a [`QualifiedName`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownPrefix`] for an undeclared prefix and
    /// [`CoreError::NoDefaultNamespace`] for an unprefixed name without a
    /// default namespace.
    pub fn resolve(&self, text: &str) -> Result<QualifiedName, CoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::InvalidQualifiedName(text.to_string()));
        }
        match text.split_once(':') {
            Some((prefix, local)) => {
                if prefix.is_empty() {
                    return Err(CoreError::InvalidQualifiedName(text.to_string()));
                }
                let ns = self
                    .resolve_prefix(prefix)
                    .ok_or_else(|| CoreError::UnknownPrefix {
                        prefix: prefix.to_string(),
                        name: text.to_string(),
                    })?;
                Ok(QualifiedName::new(ns.clone(), local))
            }
            None => {
                let ns = self
                    .resolve_prefix("")
                    .ok_or_else(|| CoreError::NoDefaultNamespace(text.to_string()))?;
                Ok(QualifiedName::new(ns.clone(), text))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SP: &str = "http://seisprov.org/seis_prov/0.1/#";

    #[test]
    fn test_namespace_equality_ignores_prefix() {
        assert_eq!(Namespace::new("seis_prov", SP), Namespace::new("sp", SP));
        assert_ne!(Namespace::new("seis_prov", SP), Namespace::prov());
    }

    #[test]
    fn test_qualified_name_display() {
        let name = QualifiedName::new(Namespace::new("seis_prov", SP), "sp001_sa_9345084");
        assert_eq!(name.to_string(), "seis_prov:sp001_sa_9345084");
        assert_eq!(name.uri(), format!("{SP}sp001_sa_9345084"));
    }

    #[test]
    fn test_qualified_name_equality_uses_uri() {
        let a = QualifiedName::new(Namespace::new("a", SP), "x");
        let b = QualifiedName::new(Namespace::new("b", SP), "x");
        assert_eq!(a, b);
    }

    #[test]
    fn test_scope_resolves_prefixed_name() {
        let mut scope = NamespaceScope::with_prov_defaults();
        scope.declare(Namespace::new("seis_prov", SP));
        let name = scope.resolve("seis_prov:waveform_trace").unwrap();
        assert!(name.is_in(SP));
        assert_eq!(name.local_part(), "waveform_trace");

        let person = scope.resolve("prov:Person").unwrap();
        assert_eq!(person, QualifiedName::prov("Person"));
    }

    #[test]
    fn test_scope_unknown_prefix() {
        let scope = NamespaceScope::with_prov_defaults();
        let err = scope.resolve("nope:thing").unwrap_err();
        assert!(matches!(err, CoreError::UnknownPrefix { .. }));
    }

    #[test]
    fn test_scope_default_namespace() {
        let mut scope = NamespaceScope::new();
        assert!(matches!(
            scope.resolve("thing"),
            Err(CoreError::NoDefaultNamespace(_))
        ));
        scope.declare(Namespace::new("", "http://example.org/"));
        let name = scope.resolve("thing").unwrap();
        assert_eq!(name.uri(), "http://example.org/thing");
        assert_eq!(name.to_string(), "thing");
    }

    #[test]
    fn test_child_scope_shadows_parent() {
        let mut root = NamespaceScope::new();
        root.declare(Namespace::new("ex", "http://example.org/a#"));
        let child = root.child([Namespace::new("ex", "http://example.org/b#")]);
        assert_eq!(child.resolve_prefix("ex").unwrap().uri(), "http://example.org/b#");
        assert_eq!(root.resolve_prefix("ex").unwrap().uri(), "http://example.org/a#");
        assert_eq!(child.iter().count(), 1);
    }

    #[test]
    fn test_xsd_namespace_variants() {
        assert!(Namespace::xsd().is_xsd());
        assert!(Namespace::new("xsd", "http://www.w3.org/2001/XMLSchema#").is_xsd());
        assert!(!Namespace::prov().is_xsd());
    }
}
