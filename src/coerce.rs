//! Best-effort conversion of field values into the representation a
//! constraint needs.
//!
//! Numeric coercion reports failure as `None` so the caller can treat a
//! bound as inapplicable. Text coercion always succeeds. Timestamp coercion
//! returns a [`CoercionError`] because a value that cannot be read with the
//! requested layout is itself a violation.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::value::FieldValue;

/// Layout used to read a timestamp out of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeLayout {
    /// `YYYY-MM-DD`, read as midnight UTC.
    Date,
    /// `HH:MM:SS`, read on the epoch date in UTC.
    Time,
    /// RFC 3339 with an explicit offset.
    DateTime,
    /// A caller supplied `strftime` layout.
    Custom(String),
}

impl TimeLayout {
    /// Returns the `strftime` layout, or `None` for RFC 3339.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            TimeLayout::Date => Some("%Y-%m-%d"),
            TimeLayout::Time => Some("%H:%M:%S"),
            TimeLayout::DateTime => None,
            TimeLayout::Custom(layout) => Some(layout),
        }
    }

    /// Returns the human readable form used in messages.
    pub fn describe(&self) -> &str {
        match self {
            TimeLayout::Date => "YYYY-MM-DD",
            TimeLayout::Time => "HH:MM:SS",
            TimeLayout::DateTime => "RFC 3339",
            TimeLayout::Custom(layout) => layout,
        }
    }
}

/// Failure to read a value as a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    /// The text form did not match the layout.
    #[error("'{value}' does not match time layout '{layout}': {source}")]
    Timestamp {
        value: String,
        layout: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Converts a value to a signed integer.
///
/// Integers of any width pass, finite floats truncate toward zero, and text
/// is parsed as a base-10 integer. Magnitudes beyond the `i64` range
/// saturate to `i64::MIN` or `i64::MAX`. NaN and everything else is `None`.
///
/// # Example
///
/// ```rust
/// use verdict::{coerce, FieldValue};
///
/// assert_eq!(coerce::to_integer(&FieldValue::Float(-2.9)), Some(-2));
/// assert_eq!(coerce::to_integer(&FieldValue::from("42")), Some(42));
/// assert_eq!(coerce::to_integer(&FieldValue::from("4.2")), None);
/// assert_eq!(coerce::to_integer(&FieldValue::Bool(true)), None);
/// ```
pub fn to_integer(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Int(n) => Some(*n),
        FieldValue::UInt(n) => Some(i64::try_from(*n).unwrap_or(i64::MAX)),
        // float to int `as` casts truncate and saturate
        FieldValue::Float(n) if !n.is_nan() => Some(*n as i64),
        FieldValue::Text(s) => s.trim().parse::<i128>().ok().map(saturate),
        _ => None,
    }
}

fn saturate(n: i128) -> i64 {
    n.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Converts a value to text. Never fails.
pub fn to_text(value: &FieldValue) -> Cow<'_, str> {
    match value {
        FieldValue::Text(s) => Cow::Borrowed(s.as_str()),
        FieldValue::Bytes(bytes) => String::from_utf8_lossy(bytes),
        other => Cow::Owned(other.to_string()),
    }
}

/// Reads a value as a timestamp using `layout`.
///
/// Native timestamps pass through for any layout. Everything else is read
/// from its text form.
pub fn to_timestamp(
    value: &FieldValue,
    layout: &TimeLayout,
) -> Result<DateTime<FixedOffset>, CoercionError> {
    if let FieldValue::Timestamp(t) = value {
        return Ok(*t);
    }

    let text = to_text(value);
    let text = text.trim();
    let parsed = match layout {
        TimeLayout::DateTime => DateTime::parse_from_rfc3339(text),
        TimeLayout::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(|d| d.and_time(NaiveTime::default()).and_utc().fixed_offset()),
        TimeLayout::Time => NaiveTime::parse_from_str(text, "%H:%M:%S")
            .map(|t| NaiveDate::default().and_time(t).and_utc().fixed_offset()),
        TimeLayout::Custom(pattern) => parse_custom(text, pattern),
    };

    parsed.map_err(|source| CoercionError::Timestamp {
        value: text.to_string(),
        layout: layout.describe().to_string(),
        source,
    })
}

/// Tries the layout as offset-aware, then naive date-time, then date, then
/// time. Naive results are taken as UTC.
fn parse_custom(text: &str, pattern: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    let first = match DateTime::parse_from_str(text, pattern) {
        Ok(t) => return Ok(t),
        Err(e) => e,
    };
    if let Ok(t) = NaiveDateTime::parse_from_str(text, pattern) {
        return Ok(t.and_utc().fixed_offset());
    }
    if let Ok(d) = NaiveDate::parse_from_str(text, pattern) {
        return Ok(d.and_time(NaiveTime::default()).and_utc().fixed_offset());
    }
    if let Ok(t) = NaiveTime::parse_from_str(text, pattern) {
        return Ok(NaiveDate::default().and_time(t).and_utc().fixed_offset());
    }
    Err(first)
}

/// Returns true for absent or zero values.
///
/// Null, empty text/bytes/collections, `0`, `0.0` and `false` are empty.
/// Timestamps are never empty.
pub fn is_empty(value: &FieldValue) -> bool {
    match value {
        FieldValue::Null => true,
        FieldValue::Bool(b) => !b,
        FieldValue::Int(n) => *n == 0,
        FieldValue::UInt(n) => *n == 0,
        FieldValue::Float(n) => *n == 0.0,
        FieldValue::Text(s) => s.is_empty(),
        FieldValue::Bytes(b) => b.is_empty(),
        FieldValue::Timestamp(_) => false,
        FieldValue::List(items) => items.is_empty(),
        FieldValue::Map(entries) => entries.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike, Utc};
    use indexmap::IndexMap;

    #[test]
    fn test_to_integer_from_integers() {
        assert_eq!(to_integer(&FieldValue::Int(-7)), Some(-7));
        assert_eq!(to_integer(&FieldValue::UInt(7)), Some(7));
        assert_eq!(to_integer(&FieldValue::UInt(u64::MAX)), Some(i64::MAX));
    }

    #[test]
    fn test_to_integer_truncates_floats() {
        assert_eq!(to_integer(&FieldValue::Float(3.99)), Some(3));
        assert_eq!(to_integer(&FieldValue::Float(-3.99)), Some(-3));
        assert_eq!(to_integer(&FieldValue::Float(f64::NAN)), None);
        assert_eq!(to_integer(&FieldValue::Float(f64::INFINITY)), Some(i64::MAX));
        assert_eq!(to_integer(&FieldValue::Float(1e30)), Some(i64::MAX));
        assert_eq!(to_integer(&FieldValue::Float(-1e30)), Some(i64::MIN));
    }

    #[test]
    fn test_to_integer_from_text() {
        assert_eq!(to_integer(&FieldValue::from("18")), Some(18));
        assert_eq!(to_integer(&FieldValue::from(" -4 ")), Some(-4));
        assert_eq!(
            to_integer(&FieldValue::from("99999999999999999999")),
            Some(i64::MAX)
        );
        assert_eq!(to_integer(&FieldValue::from("abc")), None);
        assert_eq!(to_integer(&FieldValue::from("")), None);
    }

    #[test]
    fn test_to_integer_rejects_other_types() {
        assert_eq!(to_integer(&FieldValue::Null), None);
        assert_eq!(to_integer(&FieldValue::Bool(true)), None);
        assert_eq!(to_integer(&FieldValue::List(vec![])), None);
        assert_eq!(to_integer(&FieldValue::Bytes(b"12".to_vec())), None);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&FieldValue::from("plain")), "plain");
        assert_eq!(to_text(&FieldValue::Bytes(b"bytes".to_vec())), "bytes");
        assert_eq!(to_text(&FieldValue::Int(12)), "12");
        assert_eq!(to_text(&FieldValue::Bool(false)), "false");
        assert!(matches!(to_text(&FieldValue::from("x")), Cow::Borrowed(_)));
    }

    #[test]
    fn test_to_timestamp_date_layout() {
        let t = to_timestamp(&FieldValue::from("2024-02-29"), &TimeLayout::Date).unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2024, 2, 29));
        assert_eq!(t.hour(), 0);

        assert!(to_timestamp(&FieldValue::from("2023-02-29"), &TimeLayout::Date).is_err());
        assert!(to_timestamp(&FieldValue::from("29/02/2024"), &TimeLayout::Date).is_err());
    }

    #[test]
    fn test_to_timestamp_time_layout() {
        let t = to_timestamp(&FieldValue::from("23:59:01"), &TimeLayout::Time).unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (23, 59, 1));

        assert!(to_timestamp(&FieldValue::from("24:00:00"), &TimeLayout::Time).is_err());
        assert!(to_timestamp(&FieldValue::from("12:00"), &TimeLayout::Time).is_err());
    }

    #[test]
    fn test_to_timestamp_datetime_layout() {
        let t = to_timestamp(
            &FieldValue::from("2024-05-01T10:00:00+02:00"),
            &TimeLayout::DateTime,
        )
        .unwrap();
        assert_eq!(t.offset().local_minus_utc(), 2 * 3600);

        let err = to_timestamp(&FieldValue::from("2024-05-01 10:00"), &TimeLayout::DateTime)
            .unwrap_err();
        assert!(err.to_string().contains("RFC 3339"));
    }

    #[test]
    fn test_to_timestamp_custom_layout() {
        let layout = TimeLayout::Custom("%d/%m/%Y".to_string());
        let t = to_timestamp(&FieldValue::from("01/05/2024"), &layout).unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2024, 5, 1));

        let layout = TimeLayout::Custom("%Y-%m-%d %H:%M".to_string());
        let t = to_timestamp(&FieldValue::from("2024-05-01 08:15"), &layout).unwrap();
        assert_eq!((t.hour(), t.minute()), (8, 15));

        assert!(to_timestamp(&FieldValue::from("nope"), &layout).is_err());
    }

    #[test]
    fn test_to_timestamp_passes_native_values() {
        let native = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap().fixed_offset();
        let value = FieldValue::Timestamp(native);
        assert_eq!(to_timestamp(&value, &TimeLayout::Time).unwrap(), native);
    }

    #[test]
    fn test_is_empty() {
        assert!(is_empty(&FieldValue::Null));
        assert!(is_empty(&FieldValue::from("")));
        assert!(is_empty(&FieldValue::Int(0)));
        assert!(is_empty(&FieldValue::UInt(0)));
        assert!(is_empty(&FieldValue::Float(0.0)));
        assert!(is_empty(&FieldValue::Bool(false)));
        assert!(is_empty(&FieldValue::List(vec![])));
        assert!(is_empty(&FieldValue::Map(IndexMap::new())));
        assert!(is_empty(&FieldValue::Bytes(vec![])));

        assert!(!is_empty(&FieldValue::from(" ")));
        assert!(!is_empty(&FieldValue::Int(-1)));
        assert!(!is_empty(&FieldValue::Bool(true)));
        assert!(!is_empty(&FieldValue::from(Utc::now())));
    }
}
