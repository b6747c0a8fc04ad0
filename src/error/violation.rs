//! Violation types.
//!
//! This module provides [`Violation`] for a single failed constraint and
//! [`Violations`] for a non-empty set of them.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use stillwater::prelude::*;

/// A single failed constraint on one field.
///
/// # Example
///
/// ```rust
/// use verdict::Violation;
///
/// let violation = Violation::new("email", "Must be a valid email address")
///     .with_code("email");
///
/// assert_eq!(violation.to_string(), "email: Must be a valid email address");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// External name of the field.
    pub field: String,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable code, the rule name for built-in constraints.
    pub code: String,
}

impl Violation {
    /// Creates a violation with the generic `validation_error` code.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: "validation_error".to_string(),
        }
    }

    /// Sets the code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for Violation {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Violation>();
    assert_sync::<Violation>();
};

/// A non-empty collection of violations.
///
/// This is the failure side of [`ValidationResult`](crate::ValidationResult).
/// It implements `Semigroup`, so failures from separate validations can be
/// combined:
///
/// ```rust
/// use verdict::{Violation, Violations};
/// use stillwater::prelude::*;
///
/// let a = Violations::single(Violation::new("name", "This field is required"));
/// let b = Violations::single(Violation::new("email", "Must be a valid email address"));
///
/// let combined = a.combine(b);
/// assert_eq!(combined.len(), 2);
/// assert_eq!(
///     combined.render(),
///     "name: This field is required; email: Must be a valid email address"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Violations(NonEmptyVec<Violation>);

impl Violations {
    pub fn single(violation: Violation) -> Self {
        Self(NonEmptyVec::singleton(violation))
    }

    pub fn from_non_empty(violations: NonEmptyVec<Violation>) -> Self {
        Self(violations)
    }

    /// Returns `None` if `violations` is empty.
    pub fn from_vec(violations: Vec<Violation>) -> Option<Self> {
        NonEmptyVec::from_vec(violations).map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API consistency.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn first(&self) -> &Violation {
        self.0.head()
    }

    /// Returns all violations on `field`, in the order they were recorded.
    pub fn for_field(&self, field: &str) -> Vec<&Violation> {
        self.0.iter().filter(|v| v.field == field).collect()
    }

    /// Returns all violations with `code`.
    pub fn with_code(&self, code: &str) -> Vec<&Violation> {
        self.0.iter().filter(|v| v.code == code).collect()
    }

    /// Groups messages by field, fields in first-seen order.
    pub fn by_field(&self) -> IndexMap<String, Vec<String>> {
        let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();
        for v in self.0.iter() {
            grouped
                .entry(v.field.clone())
                .or_default()
                .push(v.message.clone());
        }
        grouped
    }

    /// Renders every violation as `field: message`, joined by `; `.
    pub fn render(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0.into_vec()
    }
}

impl Semigroup for Violations {
    fn combine(self, other: Self) -> Self {
        Violations(self.0.combine(other.0))
    }
}

impl Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl std::error::Error for Violations {}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = Box<dyn Iterator<Item = &'a Violation> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Violations>();
    assert_sync::<Violations>();
};
