//! Constraint constructors for the programmatic authoring path.
//!
//! Each function builds the same [`Constraint`] the grammar produces for the
//! matching rule name, so a builder schema and a rule-string schema with the
//! same logical rules report identical messages.
//!
//! # Example
//!
//! ```rust
//! use verdict::schema::rules::*;
//! use verdict::Schema;
//!
//! let schema = Schema::new()
//!     .field("username", [required(), min_len(3), max_len(20), alphanum()])
//!     .field("role", [one_of(["admin", "user"])])
//!     .field("zip", [pattern(r"^\d{5}$").unwrap().error("zip must be 5 digits")]);
//! assert_eq!(schema.len(), 3);
//! ```

use chrono::{DateTime, FixedOffset};
use regex::Regex;

use crate::coerce::TimeLayout;
use crate::constraint::{check_layout, Constraint, ConstraintError, ConstraintKind};
use crate::value::FieldValue;

pub fn required() -> Constraint {
    Constraint::new(ConstraintKind::Required)
}

/// Inclusive lower bound on the integer form of the value.
pub fn min(n: i64) -> Constraint {
    Constraint::new(ConstraintKind::Min(n))
}

/// Inclusive upper bound on the integer form of the value.
pub fn max(n: i64) -> Constraint {
    Constraint::new(ConstraintKind::Max(n))
}

/// Minimum length in characters.
pub fn min_len(n: usize) -> Constraint {
    Constraint::new(ConstraintKind::MinLength(n))
}

/// Maximum length in characters.
pub fn max_len(n: usize) -> Constraint {
    Constraint::new(ConstraintKind::MaxLength(n))
}

pub fn email() -> Constraint {
    Constraint::new(ConstraintKind::Email)
}

pub fn url() -> Constraint {
    Constraint::new(ConstraintKind::Url)
}

pub fn alpha() -> Constraint {
    Constraint::new(ConstraintKind::Alpha)
}

pub fn alphanum() -> Constraint {
    Constraint::new(ConstraintKind::AlphaNumeric)
}

pub fn numeric() -> Constraint {
    Constraint::new(ConstraintKind::Numeric)
}

pub fn uuid() -> Constraint {
    Constraint::new(ConstraintKind::Uuid)
}

pub fn ip() -> Constraint {
    Constraint::new(ConstraintKind::Ip)
}

pub fn ipv4() -> Constraint {
    Constraint::new(ConstraintKind::Ipv4)
}

pub fn ipv6() -> Constraint {
    Constraint::new(ConstraintKind::Ipv6)
}

/// Regex constraint. Returns an error if the pattern does not compile.
pub fn pattern(pattern: &str) -> Result<Constraint, regex::Error> {
    let regex = Regex::new(pattern)?;
    Ok(Constraint::new(ConstraintKind::Pattern {
        regex,
        source: pattern.to_string(),
    }))
}

/// The text form of the value must equal one of `options`.
pub fn one_of<I, S>(options: I) -> Constraint
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Constraint::new(ConstraintKind::OneOf(
        options.into_iter().map(Into::into).collect(),
    ))
}

/// The text form of the value must equal none of `options`.
pub fn not_one_of<I, S>(options: I) -> Constraint
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Constraint::new(ConstraintKind::NotOneOf(
        options.into_iter().map(Into::into).collect(),
    ))
}

pub fn equal(expected: impl Into<String>) -> Constraint {
    Constraint::new(ConstraintKind::Equal(expected.into()))
}

pub fn not_equal(expected: impl Into<String>) -> Constraint {
    Constraint::new(ConstraintKind::NotEqual(expected.into()))
}

/// `YYYY-MM-DD`.
pub fn date() -> Constraint {
    Constraint::new(ConstraintKind::TimeFormat(TimeLayout::Date))
}

/// `HH:MM:SS`.
pub fn time() -> Constraint {
    Constraint::new(ConstraintKind::TimeFormat(TimeLayout::Time))
}

/// RFC 3339 with offset.
pub fn datetime() -> Constraint {
    Constraint::new(ConstraintKind::TimeFormat(TimeLayout::DateTime))
}

/// The value must be readable with a `strftime` layout.
///
/// Returns an error if chrono cannot interpret the layout.
pub fn time_format(layout: impl Into<String>) -> Result<Constraint, ConstraintError> {
    let layout = layout.into();
    check_layout(&layout)?;
    Ok(Constraint::new(ConstraintKind::TimeFormat(
        TimeLayout::Custom(layout),
    )))
}

/// A native timestamp value must be strictly after `boundary`.
///
/// Values that are not native timestamps are not checked.
pub fn time_after(boundary: impl Into<DateTime<FixedOffset>>) -> Constraint {
    Constraint::new(ConstraintKind::After(boundary.into()))
}

/// A native timestamp value must be strictly before `boundary`.
///
/// Values that are not native timestamps are not checked.
pub fn time_before(boundary: impl Into<DateTime<FixedOffset>>) -> Constraint {
    Constraint::new(ConstraintKind::Before(boundary.into()))
}

/// A caller supplied predicate.
///
/// The predicate's description becomes the message unless an override is
/// set with [`Constraint::error`].
///
/// # Example
///
/// ```rust
/// use verdict::schema::rules;
/// use verdict::{FieldValue, Schema};
/// use std::collections::HashMap;
///
/// let even = rules::custom(|v| match v {
///     FieldValue::Int(n) if n % 2 != 0 => Some(format!("{} is odd", n)),
///     _ => None,
/// });
/// let schema = Schema::new().field("count", [even]);
///
/// let record = HashMap::from([("count".to_string(), FieldValue::Int(3))]);
/// let (valid, errors) = schema.evaluate(&record);
/// assert!(!valid);
/// assert_eq!(errors["count"], vec!["3 is odd"]);
/// ```
pub fn custom<F>(predicate: F) -> Constraint
where
    F: Fn(&FieldValue) -> Option<String> + Send + Sync + 'static,
{
    Constraint::new(ConstraintKind::Custom(std::sync::Arc::new(predicate)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_constructor_codes() {
        assert_eq!(required().code(), "required");
        assert_eq!(min(1).code(), "min");
        assert_eq!(max_len(1).code(), "max_len");
        assert_eq!(alphanum().code(), "alphanum");
        assert_eq!(one_of(["a"]).code(), "in");
        assert_eq!(not_one_of(["a"]).code(), "not_in");
        assert_eq!(date().code(), "date");
        assert_eq!(datetime().code(), "datetime");
        assert_eq!(time().code(), "time");
        assert_eq!(custom(|_| None).code(), "custom");
    }

    #[test]
    fn test_pattern_rejects_invalid_regex() {
        assert!(pattern(r"^\d+$").is_ok());
        assert!(pattern(r"[invalid").is_err());
    }

    #[test]
    fn test_time_format_rejects_invalid_layout() {
        assert!(time_format("%d/%m/%Y").is_ok());
        assert!(time_format("%Q").is_err());
    }

    #[test]
    fn test_temporal_boundaries_accept_utc() {
        let boundary = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let c = time_after(boundary);
        assert_eq!(c.message(), "Must be after 2024-01-01T00:00:00Z");
        let c = time_before(boundary.fixed_offset());
        assert_eq!(c.message(), "Must be before 2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_error_overrides_template() {
        let c = min_len(3).error("too short");
        assert_eq!(c.message(), "too short");
    }
}
