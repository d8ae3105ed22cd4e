//! Date/time helpers for timestamps stored by SQLite.

use chrono::{DateTime, NaiveDateTime, Utc};

/// SQLite `datetime('now')` output format.
const SQLITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert a SQLite UTC datetime string to RFC 3339.
///
/// Input like `2024-01-15 10:30:00` becomes `2024-01-15T10:30:00Z`. Strings
/// that are already RFC 3339 are normalised to the same `Z` form; anything
/// unparseable is returned unchanged.
pub fn to_rfc3339(datetime_str: &str) -> String {
    match parse_utc(datetime_str) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => datetime_str.to_string(),
    }
}

/// Parse a stored timestamp (SQLite or RFC 3339 form) as UTC.
fn parse_utc(datetime_str: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(datetime_str) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(datetime_str, SQLITE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rfc3339() {
        assert_eq!(to_rfc3339("2024-01-15 10:30:00"), "2024-01-15T10:30:00Z");
        assert_eq!(to_rfc3339("2024-12-31 23:59:59"), "2024-12-31T23:59:59Z");
    }

    #[test]
    fn test_to_rfc3339_already_rfc3339() {
        assert_eq!(
            to_rfc3339("2024-01-15T19:30:00+09:00"),
            "2024-01-15T10:30:00Z"
        );
    }

    #[test]
    fn test_to_rfc3339_invalid_passthrough() {
        assert_eq!(to_rfc3339("yesterday"), "yesterday");
    }

    #[test]
    fn test_parse_utc() {
        let dt = parse_utc("2024-01-15 10:30:00").unwrap();
        assert_eq!(dt.timestamp(), 1705314600);
        assert!(parse_utc("").is_none());
    }
}
