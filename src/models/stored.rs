//! Deserializers for records written by older versions of the app.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer};

/// Image lists may be missing, `null`, or hold `null` entries where no image
/// was picked. Those entries are dropped; backfilling is left to the caller.
pub(crate) fn images<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let uris = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(uris.unwrap_or_default().into_iter().flatten().collect())
}

/// Parse an ISO-8601 stay date. Full timestamps keep their instant; a bare
/// `YYYY-MM-DD` (or a timestamp without an offset) is read as UTC.
pub fn parse_stay_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub(crate) fn stay_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_stay_date(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 date: {}", raw)))
}
