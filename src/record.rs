//! Record sources the evaluator can read from.
//!
//! Map-shaped records implement [`Record`] and are validated against an
//! explicit [`Schema`](crate::Schema). Typed records implement [`Annotated`]
//! and carry their own rule strings, one [`FieldAnnotation`] per field, so no
//! runtime type inspection is needed.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::grammar::{self, GrammarError};
use crate::value::FieldValue;

/// A loosely-typed, field-name keyed record.
pub trait Record {
    /// Returns the value stored under `name`, if present.
    fn get_field(&self, name: &str) -> Option<Cow<'_, FieldValue>>;
}

impl<S: BuildHasher> Record for HashMap<String, FieldValue, S> {
    fn get_field(&self, name: &str) -> Option<Cow<'_, FieldValue>> {
        self.get(name).map(Cow::Borrowed)
    }
}

impl Record for BTreeMap<String, FieldValue> {
    fn get_field(&self, name: &str) -> Option<Cow<'_, FieldValue>> {
        self.get(name).map(Cow::Borrowed)
    }
}

impl<S: BuildHasher> Record for IndexMap<String, FieldValue, S> {
    fn get_field(&self, name: &str) -> Option<Cow<'_, FieldValue>> {
        self.get(name).map(Cow::Borrowed)
    }
}

impl Record for Map<String, Value> {
    fn get_field(&self, name: &str) -> Option<Cow<'_, FieldValue>> {
        self.get(name).map(|v| Cow::Owned(FieldValue::from(v)))
    }
}

/// Non-object JSON values have no fields.
impl Record for Value {
    fn get_field(&self, name: &str) -> Option<Cow<'_, FieldValue>> {
        self.as_object().and_then(|obj| obj.get_field(name))
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn get_field(&self, name: &str) -> Option<Cow<'_, FieldValue>> {
        (**self).get_field(name)
    }
}

/// One declared field of a typed record: its name, optional external alias,
/// rule string and current value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAnnotation {
    name: Cow<'static, str>,
    alias: Option<Cow<'static, str>>,
    rules: Cow<'static, str>,
    value: FieldValue,
}

impl FieldAnnotation {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        rules: impl Into<Cow<'static, str>>,
        value: impl Into<FieldValue>,
    ) -> Self {
        Self {
            name: name.into(),
            alias: None,
            rules: rules.into(),
            value: value.into(),
        }
    }

    /// Sets the serialization alias reported instead of the declared name.
    pub fn alias(mut self, alias: impl Into<Cow<'static, str>>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The declared field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The alias if present, otherwise the declared name.
    pub fn external_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn rules(&self) -> &str {
        &self.rules
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}

/// A typed record that declares its own constraints.
///
/// Implementations list fields in declaration order; results follow that
/// order.
///
/// # Example
///
/// ```rust
/// use verdict::{Annotated, FieldAnnotation, Validator};
///
/// struct SignUp {
///     email: String,
///     age: u32,
/// }
///
/// impl Annotated for SignUp {
///     fn annotations(&self) -> Vec<FieldAnnotation> {
///         vec![
///             FieldAnnotation::new("email", "required|email", self.email.as_str())
///                 .alias("email_address"),
///             FieldAnnotation::new("age", "min:18", self.age),
///         ]
///     }
/// }
///
/// let mut validator = Validator::new();
/// let valid = validator.check_annotated(&SignUp { email: "nope".into(), age: 16 });
/// assert!(!valid);
/// assert_eq!(validator.errors_for("email_address"), vec!["Must be a valid email address"]);
/// assert_eq!(validator.errors_for("age"), vec!["Must be at least 18"]);
/// ```
pub trait Annotated {
    fn annotations(&self) -> Vec<FieldAnnotation>;
}

/// Runs the strict parser over every annotation of a record.
///
/// Evaluation ignores unknown or malformed rules; this surfaces them so a
/// test can assert a type's annotations are clean.
pub fn lint_annotations<A: Annotated + ?Sized>(record: &A) -> Vec<GrammarError> {
    record
        .annotations()
        .iter()
        .flat_map(|a| grammar::diagnose(a.rules()))
        .collect()
}
