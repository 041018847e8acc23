use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::enums::Rating;

/// An appointment as returned by `GET appointments/`.
///
/// Fields the dashboard does not read are ignored. Missing, null or
/// wrongly typed values fall back to "no date", "no rating", `false`, so a
/// single odd record never rejects the whole collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_code")]
    pub rate: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub feestatus: bool,
}

impl Appointment {
    /// The parsed rating, `None` for missing or unknown codes.
    pub fn rating(&self) -> Option<Rating> {
        self.rate.as_deref().and_then(|code| code.parse().ok())
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, or anything starting with a
/// `YYYY-MM-DD` prefix. Unparseable values become `None`.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) => parse_date(&raw),
        _ => None,
    })
}

/// Rating codes are kept only when they arrive as strings.
fn lenient_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(code) => Some(code),
        _ => None,
    })
}

/// Anything other than JSON `true` reads as `false`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
