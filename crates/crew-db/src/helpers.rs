//! Row-to-entity parsing helpers.
//!
//! Repos convert `libsql::Row` (column-indexed) into typed entity structs.
//! These helpers isolate the parsing logic, handle the dual datetime format
//! (`SQLite`'s `datetime('now')` vs RFC 3339) and fix the format we write so
//! stored timestamps sort lexicographically.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use crew_core::entities::{Claim, TaskMetadata};

use crate::error::DatabaseError;

/// Current time, truncated to the precision we store (microseconds).
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Format a timestamp for storage: RFC 3339, microseconds, `Z` suffix.
#[must_use]
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00.000000Z"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all crew-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Extract an optional JSON value from a TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string contains invalid JSON.
pub fn parse_optional_json(s: Option<&str>) -> Result<Option<serde_json::Value>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => {
            let val = serde_json::from_str(s)
                .map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))?;
            Ok(Some(val))
        }
        _ => Ok(None),
    }
}

/// Parse the `tags` JSON array column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the column is not a JSON array of strings.
pub fn parse_tags(s: &str) -> Result<BTreeSet<String>, DatabaseError> {
    if s.is_empty() {
        return Ok(BTreeSet::new());
    }
    serde_json::from_str(s).map_err(|e| DatabaseError::Query(format!("Invalid tags '{s}': {e}")))
}

/// Parse the `metadata` JSON object column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the column is not a JSON object.
pub fn parse_metadata(s: &str) -> Result<TaskMetadata, DatabaseError> {
    if s.is_empty() {
        return Ok(TaskMetadata::default());
    }
    serde_json::from_str(s)
        .map_err(|e| DatabaseError::Query(format!("Invalid task metadata: {e}")))
}

/// Combine the `claimed_by` / `claimed_at` columns into a claim.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` when only one of the two is set.
pub fn parse_claim(
    claimed_by: Option<String>,
    claimed_at: Option<&str>,
) -> Result<Option<Claim>, DatabaseError> {
    match (claimed_by, parse_optional_datetime(claimed_at)?) {
        (Some(claimed_by), Some(claimed_at)) => Ok(Some(Claim {
            claimed_by,
            claimed_at,
        })),
        (None, None) => Ok(None),
        (Some(by), None) => Err(DatabaseError::InvalidState(format!(
            "claim by '{by}' has no claimed_at"
        ))),
        (None, Some(at)) => Err(DatabaseError::InvalidState(format!(
            "claimed_at {at} has no claimed_by"
        ))),
    }
}

/// Serialize a value into a JSON TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if serialization fails.
pub fn to_json_text<T: serde::Serialize>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::Other(e.into()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use crew_core::enums::TaskPriority;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_both_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 2, 9, 14, 30, 0).unwrap();
        assert_eq!(parse_datetime("2026-02-09T14:30:00Z").unwrap(), expected);
        assert_eq!(parse_datetime("2026-02-09T14:30:00+00:00").unwrap(), expected);
        assert_eq!(parse_datetime("2026-02-09 14:30:00").unwrap(), expected);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn stored_format_roundtrips_and_sorts() {
        let earlier = now();
        let later = earlier + chrono::TimeDelta::milliseconds(5);
        assert_eq!(parse_datetime(&format_datetime(earlier)).unwrap(), earlier);
        assert!(format_datetime(earlier) < format_datetime(later));
        assert!(format_datetime(earlier).ends_with('Z'));
    }

    #[test]
    fn half_claims_are_rejected() {
        assert!(matches!(
            parse_claim(Some("agent-1".into()), None),
            Err(DatabaseError::InvalidState(_))
        ));
        assert!(matches!(
            parse_claim(None, Some("2026-02-09T14:30:00Z")),
            Err(DatabaseError::InvalidState(_))
        ));
        assert_eq!(parse_claim(None, None).unwrap(), None);
        let claim = parse_claim(Some("agent-1".into()), Some("2026-02-09T14:30:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(claim.claimed_by, "agent-1");
    }

    #[test]
    fn parses_enums_tags_and_metadata() {
        let priority: TaskPriority = parse_enum("urgent").unwrap();
        assert_eq!(priority, TaskPriority::Urgent);
        assert!(parse_enum::<TaskPriority>("critical").is_err());

        let tags = parse_tags(r#"["ui","backend"]"#).unwrap();
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["backend", "ui"]);
        assert!(parse_tags("").unwrap().is_empty());

        let meta = parse_metadata(r#"{"release_note":"stale"}"#).unwrap();
        assert_eq!(meta.release_note.as_deref(), Some("stale"));
        assert_eq!(parse_metadata("{}").unwrap(), TaskMetadata::default());
    }
}
