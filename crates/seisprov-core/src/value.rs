//! # Attribute Values
//!
//! PROV attribute values as an explicit tagged union. Readers map each
//! serialized value onto exactly one variant:
//!
//! | Serialized as | Variant |
//! |---------------|---------|
//! | untyped text / JSON string / `xsd:string` | [`AttributeValue::String`] |
//! | `xsd:int`, `xsd:long`, `xsd:short`, `xsd:integer`, JSON integer | [`AttributeValue::Int`] |
//! | `xsd:double`, `xsd:float`, JSON float | [`AttributeValue::Double`] |
//! | `xsd:boolean`, JSON boolean | [`AttributeValue::Bool`] |
//! | `xsd:dateTime` | [`AttributeValue::DateTime`] |
//! | `xsd:QName`, `prov:QUALIFIED_NAME` | [`AttributeValue::QualifiedName`] |
//! | `xsd:anyURI` | [`AttributeValue::Uri`] |
//! | any other datatype | [`AttributeValue::Literal`] |
//!
//! A native variant whose text does not parse (e.g. `xsd:int` with text
//! `abc`) falls back to [`AttributeValue::Literal`] so no information is lost.

use std::borrow::Cow;
use std::fmt;

use crate::namespace::QualifiedName;
use crate::temporal::XsdDateTime;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// A plain string.
    String(String),
    /// A native integer.
    Int(i64),
    /// A native IEEE double.
    Double(f64),
    /// A native boolean.
    Bool(bool),
    /// A structured date-time.
    DateTime(XsdDateTime),
    /// A qualified name (carries a URI).
    QualifiedName(QualifiedName),
    /// A URI value.
    Uri(String),
    /// A typed literal without a native mapping, kept as its lexical text.
    Literal {
        /// Declared datatype as written, normalized to `xsd:` for XML Schema types.
        datatype: String,
        /// Raw lexical text.
        text: String,
    },
}

impl AttributeValue {
    /// Build a typed literal.
    pub fn literal(datatype: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Literal {
            datatype: datatype.into(),
            text: text.into(),
        }
    }

    /// Map a datatype name and its lexical text onto the matching variant.
    ///
    /// `datatype` must already be normalized (`xsd:int`, not a URI). Qualified
    /// names need a namespace scope and are resolved by the readers, not here.
    pub fn from_typed_text(datatype: &str, text: &str) -> Self {
        let trimmed = text.trim();
        match datatype {
            "xsd:string" => Self::String(text.to_string()),
            "xsd:int" | "xsd:long" | "xsd:short" | "xsd:integer" => trimmed
                .parse::<i64>()
                .map(Self::Int)
                .unwrap_or_else(|_| Self::literal(datatype, text)),
            "xsd:double" | "xsd:float" => trimmed
                .parse::<f64>()
                .map(Self::Double)
                .unwrap_or_else(|_| Self::literal(datatype, text)),
            "xsd:boolean" => match trimmed {
                "true" | "1" => Self::Bool(true),
                "false" | "0" => Self::Bool(false),
                _ => Self::literal(datatype, text),
            },
            "xsd:dateTime" => XsdDateTime::parse(trimmed)
                .map(Self::DateTime)
                .unwrap_or_else(|_| Self::literal(datatype, text)),
            "xsd:anyURI" => Self::Uri(trimmed.to_string()),
            _ => Self::literal(datatype, text),
        }
    }

    /// Name of the runtime variant, used in error messages.
    pub fn type_name(&self) -> Cow<'static, str> {
        match self {
            Self::String(_) => Cow::Borrowed("string"),
            Self::Int(_) => Cow::Borrowed("int"),
            Self::Double(_) => Cow::Borrowed("double"),
            Self::Bool(_) => Cow::Borrowed("boolean"),
            Self::DateTime(_) => Cow::Borrowed("dateTime"),
            Self::QualifiedName(_) => Cow::Borrowed("QualifiedName"),
            Self::Uri(_) => Cow::Borrowed("anyURI"),
            Self::Literal { datatype, .. } => Cow::Owned(format!("Literal({datatype})")),
        }
    }

    /// The datatype to declare when serializing, `None` for plain strings.
    pub fn datatype(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::String(_) => None,
            Self::Int(_) => Some(Cow::Borrowed("xsd:int")),
            Self::Double(_) => Some(Cow::Borrowed("xsd:double")),
            Self::Bool(_) => Some(Cow::Borrowed("xsd:boolean")),
            Self::DateTime(_) => Some(Cow::Borrowed("xsd:dateTime")),
            Self::QualifiedName(_) => Some(Cow::Borrowed("xsd:QName")),
            Self::Uri(_) => Some(Cow::Borrowed("xsd:anyURI")),
            Self::Literal { datatype, .. } => Some(Cow::Borrowed(datatype.as_str())),
        }
    }

    /// The lexical text of the value.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::String(s) | Self::Uri(s) => Cow::Borrowed(s.as_str()),
            Self::Literal { text, .. } => Cow::Borrowed(text.as_str()),
            Self::Int(i) => Cow::Owned(i.to_string()),
            Self::Double(d) => Cow::Owned(format!("{d:?}")),
            Self::Bool(b) => Cow::Owned(b.to_string()),
            Self::DateTime(dt) => Cow::Owned(dt.to_xsd_string()),
            Self::QualifiedName(name) => Cow::Owned(name.to_string()),
        }
    }

    /// The string payload of a [`AttributeValue::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The name payload of a [`AttributeValue::QualifiedName`].
    pub fn as_qualified_name(&self) -> Option<&QualifiedName> {
        match self {
            Self::QualifiedName(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for AttributeValue {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<QualifiedName> for AttributeValue {
    fn from(name: QualifiedName) -> Self {
        Self::QualifiedName(name)
    }
}

impl From<XsdDateTime> for AttributeValue {
    fn from(dt: XsdDateTime) -> Self {
        Self::DateTime(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_text_maps_native_variants() {
        assert_eq!(AttributeValue::from_typed_text("xsd:int", "6000"), AttributeValue::Int(6000));
        assert_eq!(
            AttributeValue::from_typed_text("xsd:double", "100.0"),
            AttributeValue::Double(100.0)
        );
        assert_eq!(
            AttributeValue::from_typed_text("xsd:boolean", "false"),
            AttributeValue::Bool(false)
        );
        assert!(matches!(
            AttributeValue::from_typed_text("xsd:dateTime", "2013-01-02T12:10:11"),
            AttributeValue::DateTime(_)
        ));
        assert_eq!(
            AttributeValue::from_typed_text("xsd:anyURI", "http://www.obspy.org"),
            AttributeValue::Uri("http://www.obspy.org".into())
        );
    }

    #[test]
    fn test_typed_text_keeps_unknown_datatypes_as_literal() {
        assert_eq!(
            AttributeValue::from_typed_text("xsd:positiveInteger", "4"),
            AttributeValue::literal("xsd:positiveInteger", "4")
        );
    }

    #[test]
    fn test_unparseable_native_falls_back_to_literal() {
        assert_eq!(
            AttributeValue::from_typed_text("xsd:int", "four"),
            AttributeValue::literal("xsd:int", "four")
        );
        assert_eq!(
            AttributeValue::from_typed_text("xsd:dateTime", "yesterday"),
            AttributeValue::literal("xsd:dateTime", "yesterday")
        );
    }

    #[test]
    fn test_text_and_type_name() {
        assert_eq!(AttributeValue::Double(0.05).text(), "0.05");
        assert_eq!(AttributeValue::Double(100.0).text(), "100.0");
        assert_eq!(AttributeValue::Int(-3).type_name(), "int");
        assert_eq!(
            AttributeValue::literal("xsd:decimal", "1.5").type_name(),
            "Literal(xsd:decimal)"
        );
        assert_eq!(AttributeValue::from("m/s").datatype(), None);
    }
}
