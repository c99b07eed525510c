//! Timestamp text format
//!
//! Timestamps are stored as RFC 3339 UTC text with millisecond precision
//! (`2026-08-06T12:34:56.789Z`). The shape matches SQLite's
//! `strftime('%Y-%m-%dT%H:%M:%fZ', ...)` output exactly, so relative-time
//! comparisons inside queries stay correct under text collation.

use chrono::{DateTime, SecondsFormat, Utc};

use super::errors::StorageError;

/// Formats a timestamp for storage.
pub(crate) fn fmt_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a stored timestamp.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(format!("bad timestamp '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_round_trip() {
        let ts = Utc.with_ymd_and_hms(2026, 8, 6, 12, 34, 56).unwrap();
        let text = fmt_timestamp(ts);
        assert_eq!(parse_timestamp(&text).unwrap(), ts);
    }

    #[test]
    fn test_format_shape() {
        let ts = Utc.with_ymd_and_hms(2026, 8, 6, 12, 34, 56).unwrap();
        assert_eq!(fmt_timestamp(ts), "2026-08-06T12:34:56.000Z");
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        assert!(parse_timestamp("yesterday").is_err());
    }
}
