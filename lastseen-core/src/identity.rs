//! Identity and time types

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Stable identifier of an accessed resource (e.g. a video id).
pub type ResourceId = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Offset-carrying layouts accepted after RFC 3339.
/// Postgres renders `timestamptz` as `2024-01-01 00:00:00+00`.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Offset-less layouts, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 style timestamp into UTC.
///
/// Accepts RFC 3339, Postgres `timestamptz` text, offset-less date-times
/// (taken as UTC) and bare dates (midnight UTC). Returns `None` for anything
/// else; callers decide how a malformed value degrades.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(raw, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339_zulu() {
        let ts = parse_timestamp("2024-01-01T01:00:00Z").expect("valid rfc3339");
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_with_offset_normalizes_to_utc() {
        let ts = parse_timestamp("2024-01-01T03:00:00+02:00").expect("valid offset");
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_postgres_timestamptz() {
        let ts = parse_timestamp("2024-01-01 00:30:00.123456+00").expect("postgres text");
        assert_eq!(ts.timestamp(), 1_704_069_000);
    }

    #[test]
    fn test_parse_naive_is_utc() {
        let ts = parse_timestamp("2024-01-01T00:30:00").expect("naive");
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_date_only() {
        let ts = parse_timestamp("2024-02-29").expect("date only");
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-13-45T99:00:00Z").is_none());
    }
}
