//! Schemas: per-field constraint lists for map-shaped records.
//!
//! A [`Schema`] maps field names to [`FieldConstraints`]. Fields are kept in
//! declaration order, and results report fields in that order.
//!
//! # Example
//!
//! ```rust
//! use verdict::schema::rules::{email, required};
//! use verdict::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .rules("name", "required|min_len:3")
//!     .field("email", [required(), email()]);
//!
//! let result = schema.validate(&json!({"name": "Al", "email": "al@example.com"}));
//! assert!(result.is_failure());
//! ```

pub mod rules;

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::constraint::Constraint;
use crate::grammar::{self, GrammarError};
use crate::record::Record;
use crate::validator::{Options, Validator};
use crate::ValidationResult;

/// The ordered constraints attached to one field.
#[derive(Clone, Debug, Default)]
pub struct FieldConstraints {
    constraints: Vec<Constraint>,
}

impl FieldConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a rule string permissively. See [`grammar::parse`].
    pub fn parse(rules: &str) -> Self {
        grammar::parse(rules)
    }

    /// Parses a rule string strictly. See [`grammar::parse_strict`].
    pub fn parse_strict(rules: &str) -> Result<Self, GrammarError> {
        grammar::parse_strict(rules)
    }

    /// Appends a constraint after the existing ones.
    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Returns true if any constraint is `required`.
    pub fn is_required(&self) -> bool {
        self.constraints.iter().any(Constraint::is_required)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl FromIterator<Constraint> for FieldConstraints {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Self {
            constraints: iter.into_iter().collect(),
        }
    }
}

impl Extend<Constraint> for FieldConstraints {
    fn extend<I: IntoIterator<Item = Constraint>>(&mut self, iter: I) {
        self.constraints.extend(iter);
    }
}

impl From<Vec<Constraint>> for FieldConstraints {
    fn from(constraints: Vec<Constraint>) -> Self {
        Self { constraints }
    }
}

impl<'a> IntoIterator for &'a FieldConstraints {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}

/// A mapping from field name to its constraints.
///
/// Both authoring styles can be mixed: [`Schema::field`] takes builder
/// constraints, [`Schema::rules`] takes a rule string. Declaring the same
/// field twice replaces its constraints and keeps its original position.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldConstraints>,
}

impl Schema {
    /// Creates a schema with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field with builder constraints, evaluated in the given order.
    pub fn field<I>(mut self, name: impl Into<String>, constraints: I) -> Self
    where
        I: IntoIterator<Item = Constraint>,
    {
        self.fields
            .insert(name.into(), constraints.into_iter().collect());
        self
    }

    /// Declares a field from a rule string, ignoring anything unparseable.
    pub fn rules(mut self, name: impl Into<String>, rules: &str) -> Self {
        self.fields.insert(name.into(), grammar::parse(rules));
        self
    }

    /// Declares a field from a rule string, failing on any unparseable token.
    ///
    /// # Example
    ///
    /// ```rust
    /// use verdict::Schema;
    ///
    /// assert!(Schema::new().try_rules("age", "min:18|max:30").is_ok());
    /// assert!(Schema::new().try_rules("age", "min:eighteen").is_err());
    /// ```
    pub fn try_rules(mut self, name: impl Into<String>, rules: &str) -> Result<Self, GrammarError> {
        self.fields
            .insert(name.into(), grammar::parse_strict(rules)?);
        Ok(self)
    }

    /// Returns the constraints for a field.
    pub fn get(&self, name: &str) -> Option<&FieldConstraints> {
        self.fields.get(name)
    }

    /// Iterates fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldConstraints)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates a record in a fresh session.
    pub fn validate<R: Record + ?Sized>(&self, record: &R) -> ValidationResult<()> {
        self.validate_with(record, Options::default())
    }

    /// Validates a record in a fresh session configured by `options`.
    pub fn validate_with<R: Record + ?Sized>(
        &self,
        record: &R,
        options: Options,
    ) -> ValidationResult<()> {
        let mut validator = Validator::with_options(options);
        validator.check(self, record);
        validator.into_result()
    }

    /// Validates a record and returns the validity flag with messages grouped
    /// by field, fields in schema order.
    pub fn evaluate<R: Record + ?Sized>(&self, record: &R) -> (bool, IndexMap<String, Vec<String>>) {
        let mut validator = Validator::new();
        let valid = validator.check(self, record);
        (valid, validator.field_errors())
    }

    /// Validates many records in parallel, one session per record.
    ///
    /// Results are returned in input order.
    pub fn validate_batch<R: Record + Sync>(&self, records: &[R]) -> Vec<ValidationResult<()>> {
        records.par_iter().map(|r| self.validate(r)).collect()
    }
}
