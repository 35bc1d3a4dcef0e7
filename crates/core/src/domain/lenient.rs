//! Best-effort field decoding for records that come out of browser storage or
//! a loosely typed remote API.
//!
//! Missing, `null`, negative or otherwise malformed numeric values decode to
//! zero and unparseable timestamps decode to `None`; nothing here returns a
//! data error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value).unwrap_or(Decimal::ZERO))
}

pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value).unwrap_or(0))
}

pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(timestamp_from_value))
}

pub(crate) fn decimal_from_value(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Some(Decimal::from(int))
            } else if let Some(uint) = number.as_u64() {
                Some(Decimal::from(uint))
            } else {
                number.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(raw) => {
            let trimmed = raw.trim();
            trimmed
                .parse::<Decimal>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(Decimal::from_f64))
        }
        _ => None,
    }?;

    (!parsed.is_sign_negative()).then_some(parsed)
}

pub(crate) fn count_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => {
            if let Some(uint) = number.as_u64() {
                u32::try_from(uint).ok()
            } else {
                number.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.trunc() as u32)
            }
        }
        Value::String(raw) => raw.trim().parse::<u32>().ok(),
        _ => None,
    }
}

pub(crate) fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(raw) => parse_timestamp(raw),
        Value::Number(number) => {
            number.as_i64().and_then(|millis| Utc.timestamp_millis_opt(millis).single())
        }
        _ => None,
    }
}

/// Accepts RFC 3339, an offset-less date-time (read as UTC) or a bare date
/// (UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
