//! # Type Checkers
//!
//! One checker per XML Schema type a SEIS-PROV attribute may declare. A
//! checker answers "does this value fit", it never fails on an ill-typed
//! value. Unsupported type names are rejected when a schema is loaded;
//! [`check`] reports them as [`SchemaError::UnknownType`] for callers that
//! work with raw names.
//!
//! | Type | Accepts |
//! |------|---------|
//! | `xsd:double` | native doubles only |
//! | `xsd:decimal` | typed literals whose text parses as a float |
//! | `xsd:integer` | non-negative ints, digit strings, digit literals |
//! | `xsd:positiveInteger` | non-negative ints, digit literals |
//! | `xsd:string` | non-empty strings |
//! | `xsd:dateTime` | structured date-times |
//! | `xsd:anyURI` | URI reference strings, URIs, qualified names |

use std::fmt;
use std::str::FromStr;

use seisprov_core::AttributeValue;
use url::Url;

use crate::error::SchemaError;

const RELATIVE_BASE: &str = "http://relative.invalid/";

/// A supported attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XsdType {
    /// `xsd:double`
    Double,
    /// `xsd:decimal`
    Decimal,
    /// `xsd:integer`
    Integer,
    /// `xsd:positiveInteger`
    PositiveInteger,
    /// `xsd:string`
    String,
    /// `xsd:dateTime`
    DateTime,
    /// `xsd:anyURI`
    AnyUri,
}

impl XsdType {
    /// Every supported type.
    pub const ALL: [XsdType; 7] = [
        Self::Double,
        Self::Decimal,
        Self::Integer,
        Self::PositiveInteger,
        Self::String,
        Self::DateTime,
        Self::AnyUri,
    ];

    /// The prefixed type name as it appears in a schema.
    pub fn name(self) -> &'static str {
        match self {
            Self::Double => "xsd:double",
            Self::Decimal => "xsd:decimal",
            Self::Integer => "xsd:integer",
            Self::PositiveInteger => "xsd:positiveInteger",
            Self::String => "xsd:string",
            Self::DateTime => "xsd:dateTime",
            Self::AnyUri => "xsd:anyURI",
        }
    }

    /// True if `value` is valid for this type.
    pub fn accepts(self, value: &AttributeValue) -> bool {
        match self {
            Self::Double => matches!(value, AttributeValue::Double(_)),
            Self::Decimal => match value {
                AttributeValue::Literal { text, .. } => text.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            Self::Integer => match value {
                AttributeValue::Int(i) => *i >= 0,
                AttributeValue::String(s) => is_digits(s),
                AttributeValue::Literal { text, .. } => is_digits(text),
                _ => false,
            },
            Self::PositiveInteger => match value {
                AttributeValue::Int(i) => *i >= 0,
                AttributeValue::Literal { text, .. } => {
                    is_digits(text) && text.parse::<u64>().is_ok()
                }
                _ => false,
            },
            Self::String => matches!(value, AttributeValue::String(s) if !s.is_empty()),
            Self::DateTime => matches!(value, AttributeValue::DateTime(_)),
            Self::AnyUri => match value {
                AttributeValue::Uri(_) | AttributeValue::QualifiedName(_) => true,
                AttributeValue::String(s) => is_uri_reference(s),
                _ => false,
            },
        }
    }
}

impl fmt::Display for XsdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for XsdType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| SchemaError::UnknownType(s.to_string()))
    }
}

/// Check a value against a type given by name.
///
/// # Errors
///
/// Returns [`SchemaError::UnknownType`] if no checker exists for `type_name`.
pub fn check(type_name: &str, value: &AttributeValue) -> Result<bool, SchemaError> {
    Ok(type_name.parse::<XsdType>()?.accepts(value))
}

/// The first of `types` that accepts `value`, in declared order.
pub fn first_match(types: &[XsdType], value: &AttributeValue) -> Option<XsdType> {
    types.iter().copied().find(|t| t.accepts(value))
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn is_uri_reference(text: &str) -> bool {
    if text.is_empty() || text.chars().any(char::is_whitespace) {
        return false;
    }
    if Url::parse(text).is_ok() {
        return true;
    }
    Url::parse(RELATIVE_BASE)
        .and_then(|base| base.join(text))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use seisprov_core::{Namespace, QualifiedName, XsdDateTime};

    // ---- numeric ----

    #[test]
    fn test_double_accepts_only_native_doubles() {
        assert!(XsdType::Double.accepts(&AttributeValue::Double(100.0)));
        assert!(!XsdType::Double.accepts(&AttributeValue::Int(100)));
        assert!(!XsdType::Double.accepts(&AttributeValue::String("100.0".into())));
        assert!(!XsdType::Double.accepts(&AttributeValue::literal("xsd:decimal", "1.5")));
    }

    #[test]
    fn test_decimal_accepts_float_literals() {
        assert!(XsdType::Decimal.accepts(&AttributeValue::literal("xsd:decimal", "1.5")));
        assert!(XsdType::Decimal.accepts(&AttributeValue::literal("xsd:decimal", "-2")));
        assert!(!XsdType::Decimal.accepts(&AttributeValue::literal("xsd:decimal", "abc")));
        assert!(!XsdType::Decimal.accepts(&AttributeValue::Double(1.5)));
    }

    #[test]
    fn test_integer_uses_textual_form() {
        assert!(XsdType::Integer.accepts(&AttributeValue::Int(12)));
        assert!(XsdType::Integer.accepts(&AttributeValue::String("12".into())));
        assert!(XsdType::Integer.accepts(&AttributeValue::literal("xsd:long", "12")));
        assert!(!XsdType::Integer.accepts(&AttributeValue::Int(-3)));
        assert!(!XsdType::Integer.accepts(&AttributeValue::String(String::new())));
        assert!(!XsdType::Integer.accepts(&AttributeValue::String("1.0".into())));
    }

    #[test]
    fn test_positive_integer() {
        assert!(XsdType::PositiveInteger.accepts(&AttributeValue::Int(6000)));
        assert!(XsdType::PositiveInteger.accepts(&AttributeValue::Int(0)));
        assert!(XsdType::PositiveInteger
            .accepts(&AttributeValue::literal("xsd:positiveInteger", "4")));
        assert!(!XsdType::PositiveInteger.accepts(&AttributeValue::Int(-1)));
        assert!(!XsdType::PositiveInteger
            .accepts(&AttributeValue::literal("xsd:positiveInteger", "-4")));
        assert!(!XsdType::PositiveInteger.accepts(&AttributeValue::String("4".into())));
        assert!(!XsdType::PositiveInteger.accepts(&AttributeValue::Double(4.0)));
    }

    // ---- textual ----

    #[test]
    fn test_string_must_be_non_empty() {
        assert!(XsdType::String.accepts(&AttributeValue::String("ObsPy".into())));
        assert!(!XsdType::String.accepts(&AttributeValue::String(String::new())));
        assert!(!XsdType::String.accepts(&AttributeValue::Int(1)));
    }

    #[test]
    fn test_date_time_needs_structured_value() {
        let dt = XsdDateTime::parse("2013-01-02T12:10:11").unwrap();
        assert!(XsdType::DateTime.accepts(&AttributeValue::DateTime(dt)));
        assert!(!XsdType::DateTime.accepts(&AttributeValue::String("2013-01-02T12:10:11".into())));
    }

    #[test]
    fn test_any_uri() {
        assert!(XsdType::AnyUri.accepts(&AttributeValue::String("http://www.obspy.org".into())));
        assert!(XsdType::AnyUri.accepts(&AttributeValue::String("relative/path.h5".into())));
        assert!(XsdType::AnyUri.accepts(&AttributeValue::Uri("http://www.obspy.org".into())));
        let name = QualifiedName::new(Namespace::new("ex", "http://example.org/"), "x");
        assert!(XsdType::AnyUri.accepts(&AttributeValue::QualifiedName(name)));
        assert!(!XsdType::AnyUri.accepts(&AttributeValue::String("has space".into())));
        assert!(!XsdType::AnyUri.accepts(&AttributeValue::String(String::new())));
        assert!(!XsdType::AnyUri.accepts(&AttributeValue::Double(1.0)));
    }

    // ---- names ----

    #[test]
    fn test_names_round_trip() {
        for t in XsdType::ALL {
            assert_eq!(t.name().parse::<XsdType>().unwrap(), t);
        }
    }

    #[test]
    fn test_check_rejects_unknown_type_name() {
        let err = check("xsd:gYear", &AttributeValue::Int(2015)).unwrap_err();
        assert_eq!(err, SchemaError::UnknownType("xsd:gYear".into()));
        assert!(check("xsd:double", &AttributeValue::Double(1.0)).unwrap());
        assert!(!check("xsd:double", &AttributeValue::Int(1)).unwrap());
    }

    #[test]
    fn test_first_match_respects_declared_order() {
        let types = [XsdType::Integer, XsdType::String];
        assert_eq!(
            first_match(&types, &AttributeValue::String("42".into())),
            Some(XsdType::Integer)
        );
        assert_eq!(
            first_match(&types, &AttributeValue::String("forty-two".into())),
            Some(XsdType::String)
        );
        assert_eq!(first_match(&types, &AttributeValue::Double(1.0)), None);
    }
}
