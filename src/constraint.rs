//! The structured constraint representation shared by both authoring paths.
//!
//! A [`Constraint`] is built either by the grammar parser or by the
//! constructors in [`crate::schema::rules`]. Parameters are checked when the
//! constraint is built, so evaluation never meets a malformed pattern or
//! layout.

use std::fmt;
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use regex::Regex;

use crate::coerce::TimeLayout;
use crate::value::FieldValue;

/// Predicate injected by the caller. Returns a failure description, or
/// `None` when the value is acceptable.
pub type CustomFn = Arc<dyn Fn(&FieldValue) -> Option<String> + Send + Sync>;

/// The rule a constraint applies, with its parameters.
#[derive(Clone)]
pub enum ConstraintKind {
    Required,
    Min(i64),
    Max(i64),
    MinLength(usize),
    MaxLength(usize),
    Email,
    Url,
    Alpha,
    AlphaNumeric,
    Numeric,
    Uuid,
    Ip,
    Ipv4,
    Ipv6,
    Pattern { regex: Regex, source: String },
    OneOf(Vec<String>),
    NotOneOf(Vec<String>),
    Equal(String),
    NotEqual(String),
    TimeFormat(TimeLayout),
    After(DateTime<FixedOffset>),
    Before(DateTime<FixedOffset>),
    Custom(CustomFn),
}

impl ConstraintKind {
    /// Machine-readable code, equal to the grammar name where one exists.
    pub fn code(&self) -> &'static str {
        match self {
            ConstraintKind::Required => "required",
            ConstraintKind::Min(_) => "min",
            ConstraintKind::Max(_) => "max",
            ConstraintKind::MinLength(_) => "min_len",
            ConstraintKind::MaxLength(_) => "max_len",
            ConstraintKind::Email => "email",
            ConstraintKind::Url => "url",
            ConstraintKind::Alpha => "alpha",
            ConstraintKind::AlphaNumeric => "alphanum",
            ConstraintKind::Numeric => "numeric",
            ConstraintKind::Uuid => "uuid",
            ConstraintKind::Ip => "ip",
            ConstraintKind::Ipv4 => "ipv4",
            ConstraintKind::Ipv6 => "ipv6",
            ConstraintKind::Pattern { .. } => "regex",
            ConstraintKind::OneOf(_) => "in",
            ConstraintKind::NotOneOf(_) => "not_in",
            ConstraintKind::Equal(_) => "equal",
            ConstraintKind::NotEqual(_) => "not_equal",
            ConstraintKind::TimeFormat(TimeLayout::Date) => "date",
            ConstraintKind::TimeFormat(TimeLayout::Time) => "time",
            ConstraintKind::TimeFormat(TimeLayout::DateTime) => "datetime",
            ConstraintKind::TimeFormat(TimeLayout::Custom(_)) => "time_format",
            ConstraintKind::After(_) => "after",
            ConstraintKind::Before(_) => "before",
            ConstraintKind::Custom(_) => "custom",
        }
    }

    /// The fixed English message for a failure of this kind.
    pub fn template(&self) -> String {
        match self {
            ConstraintKind::Required => "This field is required".to_string(),
            ConstraintKind::Min(n) => format!("Must be at least {}", n),
            ConstraintKind::Max(n) => format!("Must be at most {}", n),
            ConstraintKind::MinLength(n) => format!("Must be at least {} characters", n),
            ConstraintKind::MaxLength(n) => format!("Must be at most {} characters", n),
            ConstraintKind::Email => "Must be a valid email address".to_string(),
            ConstraintKind::Url => "Must be a valid URL".to_string(),
            ConstraintKind::Alpha => "Must contain only letters".to_string(),
            ConstraintKind::AlphaNumeric => "Must contain only letters and numbers".to_string(),
            ConstraintKind::Numeric => "Must be a valid number".to_string(),
            ConstraintKind::Uuid => "Must be a valid UUID".to_string(),
            ConstraintKind::Ip => "Must be a valid IP address".to_string(),
            ConstraintKind::Ipv4 => "Must be a valid IPv4 address".to_string(),
            ConstraintKind::Ipv6 => "Must be a valid IPv6 address".to_string(),
            ConstraintKind::Pattern { source, .. } => format!("Must match pattern {}", source),
            ConstraintKind::OneOf(options) => format!("Must be one of: {}", options.join(", ")),
            ConstraintKind::NotOneOf(options) => {
                format!("Must not be one of: {}", options.join(", "))
            }
            ConstraintKind::Equal(expected) => format!("Must be equal to {}", expected),
            ConstraintKind::NotEqual(expected) => format!("Must not be equal to {}", expected),
            ConstraintKind::TimeFormat(TimeLayout::Date) => {
                "Must be a valid date (YYYY-MM-DD)".to_string()
            }
            ConstraintKind::TimeFormat(TimeLayout::Time) => {
                "Must be a valid time (HH:MM:SS)".to_string()
            }
            ConstraintKind::TimeFormat(TimeLayout::DateTime) => {
                "Must be a valid datetime (RFC 3339)".to_string()
            }
            ConstraintKind::TimeFormat(TimeLayout::Custom(layout)) => {
                format!("Must match time format {}", layout)
            }
            ConstraintKind::After(t) => format!("Must be after {}", render_time(t)),
            ConstraintKind::Before(t) => format!("Must be before {}", render_time(t)),
            ConstraintKind::Custom(_) => "Is invalid".to_string(),
        }
    }
}

fn render_time(t: &DateTime<FixedOffset>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl fmt::Debug for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Pattern { source, .. } => write!(f, "Pattern({:?})", source),
            ConstraintKind::Custom(_) => write!(f, "Custom(<fn>)"),
            ConstraintKind::Min(n) => write!(f, "Min({})", n),
            ConstraintKind::Max(n) => write!(f, "Max({})", n),
            ConstraintKind::MinLength(n) => write!(f, "MinLength({})", n),
            ConstraintKind::MaxLength(n) => write!(f, "MaxLength({})", n),
            ConstraintKind::OneOf(o) => write!(f, "OneOf({:?})", o),
            ConstraintKind::NotOneOf(o) => write!(f, "NotOneOf({:?})", o),
            ConstraintKind::Equal(e) => write!(f, "Equal({:?})", e),
            ConstraintKind::NotEqual(e) => write!(f, "NotEqual({:?})", e),
            ConstraintKind::TimeFormat(l) => write!(f, "TimeFormat({:?})", l),
            ConstraintKind::After(t) => write!(f, "After({})", render_time(t)),
            ConstraintKind::Before(t) => write!(f, "Before({})", render_time(t)),
            other => write!(f, "{}", other.code()),
        }
    }
}

/// One atomic rule attached to a field.
///
/// # Example
///
/// ```rust
/// use verdict::schema::rules;
///
/// let c = rules::min_len(3).error("name is too short");
/// assert_eq!(c.code(), "min_len");
/// assert_eq!(c.message(), "name is too short");
/// ```
#[derive(Clone, Debug)]
pub struct Constraint {
    kind: ConstraintKind,
    message: Option<String>,
}

impl Constraint {
    /// Wraps a kind that the caller has already checked.
    pub(crate) fn new(kind: ConstraintKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Wraps a hand-built kind, applying the same checks as the rule
    /// constructors.
    ///
    /// # Errors
    ///
    /// Returns `ConstraintError::InvalidLayout` for a custom time layout chrono
    /// cannot interpret, and `ConstraintError::PatternMismatch` when a
    /// pattern's declared source differs from its compiled regex.
    ///
    /// # Example
    ///
    /// ```rust
    /// use verdict::{Constraint, ConstraintKind, TimeLayout};
    ///
    /// assert!(Constraint::try_new(ConstraintKind::MinLength(3)).is_ok());
    /// assert!(Constraint::try_new(ConstraintKind::TimeFormat(TimeLayout::Custom("%Q".into()))).is_err());
    /// ```
    pub fn try_new(kind: ConstraintKind) -> Result<Self, ConstraintError> {
        match &kind {
            ConstraintKind::TimeFormat(TimeLayout::Custom(layout)) => check_layout(layout)?,
            ConstraintKind::Pattern { regex, source } if regex.as_str() != source => {
                return Err(ConstraintError::PatternMismatch {
                    declared: source.clone(),
                    compiled: regex.as_str().to_string(),
                });
            }
            _ => {}
        }
        Ok(Self::new(kind))
    }

    /// Sets the override message used instead of the template, and instead
    /// of a custom predicate's own description.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Returns true for the `required` constraint.
    pub fn is_required(&self) -> bool {
        matches!(self.kind, ConstraintKind::Required)
    }

    /// Returns the override message if one was configured.
    pub fn override_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the message reported when this constraint fails.
    pub fn message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| self.kind.template())
    }
}

/// A constraint parameter rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintError {
    #[error("invalid time layout '{0}'")]
    InvalidLayout(String),

    #[error("pattern source '{declared}' does not match compiled regex '{compiled}'")]
    PatternMismatch { declared: String, compiled: String },
}

/// Rejects layouts that chrono cannot interpret.
pub(crate) fn check_layout(layout: &str) -> Result<(), ConstraintError> {
    if layout.trim().is_empty() || StrftimeItems::new(layout).any(|i| matches!(i, Item::Error)) {
        Err(ConstraintError::InvalidLayout(layout.to_string()))
    } else {
        Ok(())
    }
}
