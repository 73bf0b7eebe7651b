//! Shared types and result types for the database layer

pub mod errors;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

pub use errors::DatabaseError;

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Current time truncated to the precision stored in the database, so a
/// freshly written entity compares equal to the same row read back.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 rendering (`2024-01-01T00:00:00.000000Z`). Every
/// timestamp column is written through this so string order matches time
/// order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Reject blank values and values longer than `max_chars` characters.
pub(crate) fn validate_text(field: &str, value: &str, max_chars: Option<usize>) -> DatabaseResult<()> {
    if value.trim().is_empty() {
        return Err(DatabaseError::ValidationError(format!("{field} must not be empty")));
    }
    match max_chars {
        Some(max) => validate_length(field, value, max),
        None => Ok(()),
    }
}

/// Length check only; blank values pass.
pub(crate) fn validate_length(field: &str, value: &str, max_chars: usize) -> DatabaseResult<()> {
    if value.chars().count() > max_chars {
        return Err(DatabaseError::ValidationError(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamps_are_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(&whole), "2024-01-01T00:00:00.000000Z");
        assert_eq!(format_timestamp(&now()).len(), format_timestamp(&whole).len());
    }

    #[test]
    fn test_validate_text() {
        assert!(validate_text("name", "Rust", Some(200)).is_ok());
        assert!(validate_text("name", "   ", Some(200)).is_err());
        assert!(validate_text("name", &"a".repeat(201), Some(200)).is_err());
        assert!(validate_text("body", &"a".repeat(10_000), None).is_ok());

        assert!(validate_length("name", "", 200).is_ok());
        assert!(validate_length("name", "  ", 200).is_ok());
        assert!(validate_length("name", &"é".repeat(200), 200).is_ok());
        assert!(validate_length("name", &"é".repeat(201), 200).is_err());
    }
}
