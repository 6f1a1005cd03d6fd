//! Lenient parsing of backend date strings.
//!
//! The backend emits ISO-8601 timestamps, but older records carry bare
//! dates and some fields are null. Transformers must never fail on a bad
//! date, so parsing degrades to `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parses an ISO-8601 timestamp, a `YYYY-MM-DDTHH:MM:SS` local timestamp,
/// or a bare `YYYY-MM-DD` date. Anything else yields `None`.
pub fn parse_datetime(value: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&midnight));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_datetime(Some("2025-03-01T12:30:00Z")).unwrap();
        assert_eq!(parsed.hour(), 12);
    }

    #[test]
    fn test_parse_with_offset() {
        let parsed = parse_datetime(Some("2025-03-01T12:30:00+02:00")).unwrap();
        assert_eq!(parsed.hour(), 10);
    }

    #[test]
    fn test_parse_bare_date() {
        let parsed = parse_datetime(Some("2025-03-01")).unwrap();
        assert_eq!(parsed.hour(), 0);
    }

    #[test]
    fn test_parse_naive_timestamp() {
        let parsed = parse_datetime(Some("2025-03-01T08:15:00")).unwrap();
        assert_eq!(parsed.hour(), 8);
    }

    #[test]
    fn test_invalid_inputs_degrade_to_none() {
        assert_eq!(parse_datetime(None), None);
        assert_eq!(parse_datetime(Some("")), None);
        assert_eq!(parse_datetime(Some("   ")), None);
        assert_eq!(parse_datetime(Some("not-a-date")), None);
        assert_eq!(parse_datetime(Some("2025-13-99")), None);
    }
}
