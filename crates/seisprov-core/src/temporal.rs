//! # Temporal Values — `xsd:dateTime`
//!
//! PROV attributes typed `xsd:dateTime` are parsed into [`XsdDateTime`]
//! when a document is read. The timezone is optional in XML Schema, so the
//! value keeps the local date-time and an optional offset instead of
//! forcing everything to UTC.
//!
//! Accepted lexical forms:
//!
//! - `2013-01-02T12:10:11` (no timezone)
//! - `2013-01-02T12:10:11.250` (fractional seconds)
//! - `2013-01-02T12:10:11Z`, `2013-01-02T12:10:11+02:00` (RFC 3339)

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::error::CoreError;

/// A parsed `xsd:dateTime` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XsdDateTime {
    local: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl XsdDateTime {
    /// Build from a naive local date-time and an optional offset.
    pub fn new(local: NaiveDateTime, offset: Option<FixedOffset>) -> Self {
        Self { local, offset }
    }

    /// Parse the lexical form of an `xsd:dateTime`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDateTime`] if the text is neither an RFC 3339
    /// timestamp nor a timezone-less `YYYY-MM-DDTHH:MM:SS[.fff]` value.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let text = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self::from_fixed(dt));
        }
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|local| Self { local, offset: None })
            .map_err(|e| CoreError::InvalidDateTime {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }

    /// Build from a timezone-aware chrono value.
    pub fn from_fixed(dt: DateTime<FixedOffset>) -> Self {
        Self {
            local: dt.naive_local(),
            offset: Some(*dt.offset()),
        }
    }

    /// The local date-time as written.
    pub fn local(&self) -> &NaiveDateTime {
        &self.local
    }

    /// The timezone offset, if the value carried one.
    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// Render in the `xsd:dateTime` lexical form.
    pub fn to_xsd_string(&self) -> String {
        let base = self.local.format("%Y-%m-%dT%H:%M:%S%.f").to_string();
        match self.offset {
            Some(offset) if offset.local_minus_utc() == 0 => format!("{base}Z"),
            Some(offset) => format!("{base}{offset}"),
            None => base,
        }
    }
}

impl fmt::Display for XsdDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xsd_string())
    }
}
