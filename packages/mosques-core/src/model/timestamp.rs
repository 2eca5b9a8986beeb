//! Timestamps as the API writes them.
//!
//! Some deployments emit RFC 3339 with an offset, others a naive
//! `YYYY-MM-DDTHH:MM:SS[.f]` that is UTC by convention. Both are accepted.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// `deserialize_with` helper for optional timestamps.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) => parse(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_accepts_offset_and_naive() {
        let with_offset = parse("2025-03-01T10:00:00+01:00").unwrap();
        assert_eq!(with_offset.hour(), 9);

        let naive = parse("2025-03-01T10:00:00.123456").unwrap();
        assert_eq!((naive.day(), naive.hour()), (1, 10));

        assert!(parse("yesterday").is_none());
    }
}
