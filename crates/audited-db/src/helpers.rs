//! Column value conversion helpers.
//!
//! Records move between typed fields and `libsql::Value`s in two places:
//! `Model::columns` / `Model::assign_column`, and `Table::from_row`. These
//! helpers keep the conversions in one place and handle the dual datetime
//! format issue (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use chrono::{DateTime, Utc};
use libsql::Value;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Parse a TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
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

#[must_use]
pub fn datetime_value(dt: &DateTime<Utc>) -> Value {
    Value::Text(dt.to_rfc3339())
}

#[must_use]
pub fn opt_datetime_value(dt: Option<&DateTime<Utc>>) -> Value {
    dt.map_or(Value::Null, datetime_value)
}

/// The nil UUID is stored as NULL.
#[must_use]
pub fn uuid_value(id: Uuid) -> Value {
    if id.is_nil() {
        Value::Null
    } else {
        Value::Text(id.to_string())
    }
}

#[must_use]
pub fn opt_text_value(s: Option<&str>) -> Value {
    s.map_or(Value::Null, |s| Value::Text(s.to_string()))
}

fn invalid(column: &str, expected: &str, value: &Value) -> DatabaseError {
    DatabaseError::InvalidValue {
        column: column.to_string(),
        reason: format!("expected {expected}, got {value:?}"),
    }
}

/// # Errors
///
/// Returns `DatabaseError::InvalidValue` for non-TEXT values and
/// `DatabaseError::Query` for unparseable text.
pub fn value_to_datetime(column: &str, value: &Value) -> Result<DateTime<Utc>, DatabaseError> {
    match value {
        Value::Text(s) => parse_datetime(s),
        other => Err(invalid(column, "datetime text", other)),
    }
}

/// NULL and the empty string both read as `None`.
///
/// # Errors
///
/// See [`value_to_datetime`].
pub fn value_to_opt_datetime(
    column: &str,
    value: &Value,
) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match value {
        Value::Null => Ok(None),
        Value::Text(s) if s.is_empty() => Ok(None),
        other => value_to_datetime(column, other).map(Some),
    }
}

/// NULL reads as the nil UUID.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidValue` for non-UUID values.
pub fn value_to_uuid(column: &str, value: &Value) -> Result<Uuid, DatabaseError> {
    match value {
        Value::Null => Ok(Uuid::nil()),
        Value::Text(s) => Uuid::parse_str(s).map_err(|e| DatabaseError::InvalidValue {
            column: column.to_string(),
            reason: e.to_string(),
        }),
        other => Err(invalid(column, "uuid text", other)),
    }
}

/// NULL reads as `0`.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidValue` for values that are not integers.
pub fn value_to_i64(column: &str, value: &Value) -> Result<i64, DatabaseError> {
    match value {
        Value::Null => Ok(0),
        Value::Integer(i) => Ok(*i),
        Value::Text(s) => s.parse().map_err(|e: std::num::ParseIntError| {
            DatabaseError::InvalidValue {
                column: column.to_string(),
                reason: e.to_string(),
            }
        }),
        other => Err(invalid(column, "integer", other)),
    }
}

/// # Errors
///
/// Returns `DatabaseError::InvalidValue` for non-TEXT values.
pub fn value_to_string(column: &str, value: &Value) -> Result<String, DatabaseError> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        other => Err(invalid(column, "text", other)),
    }
}

/// NULL and the empty string both read as `None`.
///
/// # Errors
///
/// See [`value_to_string`].
pub fn value_to_opt_string(column: &str, value: &Value) -> Result<Option<String>, DatabaseError> {
    match value {
        Value::Null => Ok(None),
        Value::Text(s) if s.is_empty() => Ok(None),
        other => value_to_string(column, other).map(Some),
    }
}

/// Whether `name` is safe to splice into SQL as a table or column name.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn parses_both_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 2, 9, 14, 30, 0).unwrap();
        assert_eq!(parse_datetime("2026-02-09T14:30:00+00:00").unwrap(), expected);
        assert_eq!(parse_datetime("2026-02-09 14:30:00").unwrap(), expected);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn nil_uuid_is_null() {
        assert!(matches!(uuid_value(Uuid::nil()), Value::Null));
        assert_eq!(value_to_uuid("created_by_id", &Value::Null).unwrap(), Uuid::nil());

        let id = Uuid::new_v4();
        let stored = uuid_value(id);
        assert_eq!(value_to_uuid("created_by_id", &stored).unwrap(), id);
    }

    #[test]
    fn integers_accept_text_and_null() {
        assert_eq!(value_to_i64("role", &Value::Integer(7)).unwrap(), 7);
        assert_eq!(value_to_i64("role", &Value::Text("12".into())).unwrap(), 12);
        assert_eq!(value_to_i64("role", &Value::Null).unwrap(), 0);
        assert!(value_to_i64("role", &Value::Text("admin".into())).is_err());
        assert!(value_to_i64("role", &Value::Real(1.5)).is_err());
    }

    #[test]
    fn empty_text_is_none() {
        assert_eq!(value_to_opt_string("body", &Value::Text(String::new())).unwrap(), None);
        assert_eq!(value_to_opt_datetime("deleted_at", &Value::Null).unwrap(), None);
    }

    #[rstest]
    #[case("notes", true)]
    #[case("_private", true)]
    #[case("created_by_id", true)]
    #[case("1st", false)]
    #[case("", false)]
    #[case("notes; DROP TABLE notes", false)]
    #[case("na-me", false)]
    fn identifier_check(#[case] name: &str, #[case] ok: bool) {
        assert_eq!(is_identifier(name), ok);
    }
}
