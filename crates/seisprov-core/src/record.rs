//! # Records
//!
//! A [`Record`] is one PROV statement: an element (entity, activity, agent)
//! or a relation. Readers fill two attribute lists, mirroring PROV's own
//! split between formal attributes (relation roles, activity times) and
//! extra attributes. [`Record::attributes`] returns the union of both as an
//! [`AttributeSet`], which is the only view the validator uses.

use std::fmt;

use crate::namespace::QualifiedName;
use crate::value::AttributeValue;

/// PROV relation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// `wasGeneratedBy`
    Generation,
    /// `used`
    Usage,
    /// `wasInformedBy`
    Communication,
    /// `wasStartedBy`
    Start,
    /// `wasEndedBy`
    End,
    /// `wasInvalidatedBy`
    Invalidation,
    /// `wasDerivedFrom`
    Derivation,
    /// `wasAttributedTo`
    Attribution,
    /// `wasAssociatedWith`
    Association,
    /// `actedOnBehalfOf`
    Delegation,
    /// `wasInfluencedBy`
    Influence,
    /// `specializationOf`
    Specialization,
    /// `alternateOf`
    Alternate,
    /// `hadMember`
    Membership,
    /// `mentionOf`
    Mention,
}

impl RelationKind {
    /// Every relation kind, in PROV-DM order.
    pub const ALL: [RelationKind; 15] = [
        Self::Generation,
        Self::Usage,
        Self::Communication,
        Self::Start,
        Self::End,
        Self::Invalidation,
        Self::Derivation,
        Self::Attribution,
        Self::Association,
        Self::Delegation,
        Self::Influence,
        Self::Specialization,
        Self::Alternate,
        Self::Membership,
        Self::Mention,
    ];

    /// Element name in PROV-XML and key in PROV-JSON.
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Generation => "wasGeneratedBy",
            Self::Usage => "used",
            Self::Communication => "wasInformedBy",
            Self::Start => "wasStartedBy",
            Self::End => "wasEndedBy",
            Self::Invalidation => "wasInvalidatedBy",
            Self::Derivation => "wasDerivedFrom",
            Self::Attribution => "wasAttributedTo",
            Self::Association => "wasAssociatedWith",
            Self::Delegation => "actedOnBehalfOf",
            Self::Influence => "wasInfluencedBy",
            Self::Specialization => "specializationOf",
            Self::Alternate => "alternateOf",
            Self::Membership => "hadMember",
            Self::Mention => "mentionOf",
        }
    }

    /// PROV-DM type name, e.g. `Usage`.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Generation => "Generation",
            Self::Usage => "Usage",
            Self::Communication => "Communication",
            Self::Start => "Start",
            Self::End => "End",
            Self::Invalidation => "Invalidation",
            Self::Derivation => "Derivation",
            Self::Attribution => "Attribution",
            Self::Association => "Association",
            Self::Delegation => "Delegation",
            Self::Influence => "Influence",
            Self::Specialization => "Specialization",
            Self::Alternate => "Alternate",
            Self::Membership => "Membership",
            Self::Mention => "Mention",
        }
    }

    /// Formal attribute local names (in the PROV namespace), in schema order.
    /// `time` is a value; every other entry is a reference to another record.
    pub fn roles(self) -> &'static [&'static str] {
        match self {
            Self::Generation => &["entity", "activity", "time"],
            Self::Usage => &["activity", "entity", "time"],
            Self::Communication => &["informed", "informant"],
            Self::Start => &["activity", "trigger", "starter", "time"],
            Self::End => &["activity", "trigger", "ender", "time"],
            Self::Invalidation => &["entity", "activity", "time"],
            Self::Derivation => &[
                "generatedEntity",
                "usedEntity",
                "activity",
                "generation",
                "usage",
            ],
            Self::Attribution => &["entity", "agent"],
            Self::Association => &["activity", "agent", "plan"],
            Self::Delegation => &["delegate", "responsible", "activity"],
            Self::Influence => &["influencee", "influencer"],
            Self::Specialization => &["specificEntity", "generalEntity"],
            Self::Alternate => &["alternate1", "alternate2"],
            Self::Membership => &["collection", "entity"],
            Self::Mention => &["specificEntity", "generalEntity", "bundle"],
        }
    }

    /// Roles that must be present.
    pub fn required_roles(self) -> &'static [&'static str] {
        match self {
            Self::Generation | Self::Invalidation => &["entity"],
            Self::Usage | Self::Start | Self::End | Self::Association => &["activity"],
            Self::Communication => &["informed", "informant"],
            Self::Derivation => &["generatedEntity", "usedEntity"],
            Self::Attribution => &["entity", "agent"],
            Self::Delegation => &["delegate", "responsible"],
            Self::Influence => &["influencee", "influencer"],
            Self::Specialization => &["specificEntity", "generalEntity"],
            Self::Alternate => &["alternate1", "alternate2"],
            Self::Membership => &["collection", "entity"],
            Self::Mention => &["specificEntity", "generalEntity", "bundle"],
        }
    }

    /// Look up a relation by its PROV-XML element name / PROV-JSON key.
    pub fn from_element_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.element_name() == name)
    }
}

/// The kind of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// `prov:Entity`
    Entity,
    /// `prov:Activity`
    Activity,
    /// `prov:Agent`
    Agent,
    /// Any relation.
    Relation(RelationKind),
}

impl RecordKind {
    /// Element name in PROV-XML and key in PROV-JSON.
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Activity => "activity",
            Self::Agent => "agent",
            Self::Relation(kind) => kind.element_name(),
        }
    }

    /// Look up a record kind by element name.
    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "entity" => Some(Self::Entity),
            "activity" => Some(Self::Activity),
            "agent" => Some(Self::Agent),
            other => RelationKind::from_element_name(other).map(Self::Relation),
        }
    }

    /// True for entities, activities and agents.
    pub fn is_element(self) -> bool {
        !matches!(self, Self::Relation(_))
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity => f.write_str("prov:Entity"),
            Self::Activity => f.write_str("prov:Activity"),
            Self::Agent => f.write_str("prov:Agent"),
            Self::Relation(kind) => write!(f, "prov:{}", kind.type_name()),
        }
    }
}

/// An ordered set of `(qualified name, value)` pairs.
///
/// Insertion ignores a pair that is already present, so the union of two
/// attribute lists never double-counts a shared entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    entries: Vec<(QualifiedName, AttributeValue)>,
}

impl AttributeSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair. Returns `false` if it was already present.
    pub fn insert(&mut self, key: QualifiedName, value: AttributeValue) -> bool {
        if self.contains(&key, &value) {
            return false;
        }
        self.entries.push((key, value));
        true
    }

    /// True if exactly this pair is present.
    pub fn contains(&self, key: &QualifiedName, value: &AttributeValue) -> bool {
        self.entries.iter().any(|(k, v)| k == key && v == value)
    }

    /// All values stored under `key`, in insertion order.
    pub fn values_of<'a>(
        &'a self,
        key: &'a QualifiedName,
    ) -> impl Iterator<Item = &'a AttributeValue> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Pairs whose key lies in the namespace with the given URI.
    pub fn in_namespace<'a>(
        &'a self,
        uri: &'a str,
    ) -> impl Iterator<Item = &'a (QualifiedName, AttributeValue)> + 'a {
        self.entries.iter().filter(move |(k, _)| k.is_in(uri))
    }

    /// Iterate over all pairs.
    pub fn iter(&self) -> impl Iterator<Item = &(QualifiedName, AttributeValue)> {
        self.entries.iter()
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<(QualifiedName, AttributeValue)> for AttributeSet {
    fn extend<T: IntoIterator<Item = (QualifiedName, AttributeValue)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl FromIterator<(QualifiedName, AttributeValue)> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = (QualifiedName, AttributeValue)>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// One PROV statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: RecordKind,
    identifier: Option<QualifiedName>,
    formal: Vec<(QualifiedName, AttributeValue)>,
    extra: Vec<(QualifiedName, AttributeValue)>,
}

impl Record {
    /// Create a record without attributes.
    pub fn new(kind: RecordKind, identifier: Option<QualifiedName>) -> Self {
        Self {
            kind,
            identifier,
            formal: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Add a formal (PROV-defined) attribute.
    pub fn push_formal(&mut self, key: QualifiedName, value: AttributeValue) {
        self.formal.push((key, value));
    }

    /// Add an extra attribute.
    pub fn push_extra(&mut self, key: QualifiedName, value: AttributeValue) {
        self.extra.push((key, value));
    }

    /// Builder form of [`Record::push_extra`].
    pub fn with_attribute(mut self, key: QualifiedName, value: impl Into<AttributeValue>) -> Self {
        self.push_extra(key, value.into());
        self
    }

    /// The record kind.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// The identifier, if the record has one.
    pub fn identifier(&self) -> Option<&QualifiedName> {
        self.identifier.as_ref()
    }

    /// Formal attributes as read.
    pub fn formal_attributes(&self) -> &[(QualifiedName, AttributeValue)] {
        &self.formal
    }

    /// Extra attributes as read.
    pub fn extra_attributes(&self) -> &[(QualifiedName, AttributeValue)] {
        &self.extra
    }

    /// Union of formal and extra attributes.
    pub fn attributes(&self) -> AttributeSet {
        self.formal
            .iter()
            .chain(self.extra.iter())
            .cloned()
            .collect()
    }

    /// The identifier as `prefix:local`, or `(anonymous)`.
    pub fn display_id(&self) -> String {
        self.identifier
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "(anonymous)".to_string())
    }
}
