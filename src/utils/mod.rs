//! Utility functions for the school-pages application

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a datetime from RFC3339 or bare SQLite format.
///
/// The store writes RFC3339; the naive fallback tolerates rows written by
/// external tooling. Anything else is a decode failure the caller must treat
/// as a corrupt entry, not as absence.
pub fn parse_datetime(datetime_str: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(datetime_str) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive_dt) = NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S") {
        return Ok(DateTime::from_naive_utc_and_offset(naive_dt, Utc));
    }

    Err(format!("unable to parse datetime: {datetime_str}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_datetime("2025-08-20T10:30:00+02:00").unwrap();
        assert_eq!(parsed.hour(), 8);
    }

    #[test]
    fn parses_naive_sqlite_format_as_utc() {
        let parsed = parse_datetime("2025-08-20 10:30:00").unwrap();
        assert_eq!(parsed.hour(), 10);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_datetime("not-a-timestamp").is_err());
    }
}
