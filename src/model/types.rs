//! Annotation entity structs.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single annotation as delivered by the annotation service.
///
/// Everything except `id` defaults when absent so that partially populated
/// records (drafts, replies loaded without their parent) still deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Annotation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub user_info: Option<UserInfo>,
    #[serde(default)]
    pub updated: Option<Timestamp>,
    #[serde(default)]
    pub target: Vec<Target>,
}

impl Annotation {
    /// Identifier usable in results; empty ids count as missing.
    pub fn usable_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Display name of the author, if the service supplied one.
    pub fn display_name(&self) -> Option<&str> {
        self.user_info
            .as_ref()
            .and_then(|info| info.display_name.as_deref())
    }

    /// The quoted source text: `exact` of the first `TextQuoteSelector` on
    /// the first target.
    pub fn quote(&self) -> Option<&str> {
        let target = self.target.first()?;
        target.selector.iter().find_map(|selector| match selector {
            Selector::TextQuote { exact, .. } => Some(exact.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Target {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub selector: Vec<Selector>,
}

/// Anchoring selectors. Only the quote selector matters for filtering; the
/// remaining kinds are kept so documents round-trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Selector {
    #[serde(rename = "TextQuoteSelector")]
    TextQuote {
        exact: String,
        #[serde(default)]
        prefix: Option<String>,
        #[serde(default)]
        suffix: Option<String>,
    },
    #[serde(rename = "TextPositionSelector")]
    TextPosition { start: u64, end: u64 },
    #[serde(rename = "RangeSelector")]
    Range {
        #[serde(rename = "startContainer", default)]
        start_container: String,
        #[serde(rename = "endContainer", default)]
        end_container: String,
        #[serde(rename = "startOffset", default)]
        start_offset: u64,
        #[serde(rename = "endOffset", default)]
        end_offset: u64,
    },
    #[serde(other)]
    Unknown,
}

/// Last-modified instant as it appears on the wire.
///
/// Deserialization never fails: shapes that cannot be a timestamp land in
/// [`Timestamp::Invalid`] so one bad record leaves the rest of a batch usable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Timestamp {
    EpochMillis(i64),
    FractionalMillis(f64),
    Iso(String),
    Invalid(serde_json::Value),
}

impl Timestamp {
    /// Convert to epoch milliseconds, `None` if the value is not a usable instant.
    pub fn to_epoch_millis(&self) -> Option<i64> {
        match self {
            Timestamp::EpochMillis(ms) => Some(*ms),
            Timestamp::FractionalMillis(ms) => ms.is_finite().then(|| ms.round() as i64),
            Timestamp::Iso(raw) => parse_iso_millis(raw.trim()),
            Timestamp::Invalid(_) => None,
        }
    }
}

/// ISO-8601 in the forms annotation services emit. Values without an offset
/// are read as UTC; a bare date is midnight UTC.
fn parse_iso_millis(raw: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.timestamp_millis());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

impl From<DateTime<chrono::Utc>> for Timestamp {
    fn from(dt: DateTime<chrono::Utc>) -> Self {
        Timestamp::Iso(dt.to_rfc3339())
    }
}
