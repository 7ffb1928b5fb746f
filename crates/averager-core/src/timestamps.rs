use chrono::NaiveDateTime;

use crate::error::{AveragerError, Result};

/// Layout of a date field and a time field joined by a single space.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Parses the split date/time columns found in batch log rows.
pub struct TimestampProcessor;

impl TimestampProcessor {
    /// Join `date` and `time` with a space and parse the result.
    ///
    /// Both parts must already be unquoted. No timezone is attached: log
    /// timestamps are wall-clock local times of the producing machine.
    pub fn parse_parts(date: &str, time: &str) -> Result<NaiveDateTime> {
        Self::parse_str(&format!("{} {}", date, time))
    }

    /// Parse a full `YYYY-MM-DD HH:MM:SS` string.
    pub fn parse_str(s: &str) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .map_err(|_| AveragerError::TimestampParse(s.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_parts_valid() {
        let dt = TimestampProcessor::parse_parts("2024-01-15", "10:30:45").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 15));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (10, 30, 45));
    }

    #[test]
    fn test_parse_parts_rejects_impossible_date() {
        let err = TimestampProcessor::parse_parts("2024-02-30", "10:00:00").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid timestamp format: 2024-02-30 10:00:00"
        );
    }

    #[test]
    fn test_parse_parts_rejects_missing_seconds() {
        assert!(TimestampProcessor::parse_parts("2024-01-15", "10:30").is_err());
    }

    #[test]
    fn test_parse_parts_rejects_other_layouts() {
        assert!(TimestampProcessor::parse_parts("15/01/2024", "10:30:00").is_err());
        assert!(TimestampProcessor::parse_str("2024-01-15T10:30:00").is_err());
    }

    #[test]
    fn test_parse_parts_rejects_empty() {
        assert!(TimestampProcessor::parse_parts("", "").is_err());
    }

    #[test]
    fn test_parse_parts_rejects_surrounding_whitespace() {
        assert!(TimestampProcessor::parse_parts("2024-01-15", "10:30:45 junk").is_err());
    }
}
