//! Validation sessions: constraint evaluation and violation aggregation.
//!
//! A [`Validator`] is created per validation call, populated by one or more
//! `check*` calls, read, and discarded (or [`cleared`](Validator::clear) and
//! reused sequentially). It is not meant to be shared across concurrent
//! validations.
//!
//! Per field the evaluation policy is:
//!
//! 1. absent and `required`: one `required` violation; absent otherwise: skip.
//! 2. empty and `required`: one `required` violation, nothing else checked.
//! 3. empty and not `required`: skip every other constraint.
//! 4. otherwise every constraint runs in declaration order and each failure
//!    adds one violation.
//!
//! # Example
//!
//! ```rust
//! use verdict::{Schema, Validator};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .rules("name", "required|min_len:3")
//!     .rules("role", "in:admin,user");
//!
//! let mut validator = Validator::new();
//! let valid = validator.check(&schema, &json!({"role": "root"}));
//!
//! assert!(!valid);
//! assert_eq!(
//!     validator.render(),
//!     "name: This field is required; role: Must be one of: admin, user"
//! );
//! ```

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde_json::{json, Value};
use stillwater::Validation;

use crate::coerce::{self, TimeLayout};
use crate::constraint::{Constraint, ConstraintKind};
use crate::error::{Violation, Violations};
use crate::grammar;
use crate::predicate;
use crate::record::{Annotated, Record};
use crate::schema::{FieldConstraints, Schema};
use crate::value::FieldValue;
use crate::ValidationResult;

/// What to do when a numeric bound meets a value with no integer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// Treat the bound as not applicable.
    #[default]
    Skip,
    /// Record a `type_mismatch` violation.
    Report,
}

/// Session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    pub type_mismatch: MismatchPolicy,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type_mismatch(mut self, policy: MismatchPolicy) -> Self {
        self.type_mismatch = policy;
        self
    }
}

/// A validation session.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    errors: IndexMap<String, Vec<Violation>>,
    options: Options,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            errors: IndexMap::new(),
            options,
        }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Validates a map-shaped record against `schema`, walking fields in
    /// schema order. Returns true if the session holds no violations.
    pub fn check<R: Record + ?Sized>(&mut self, schema: &Schema, record: &R) -> bool {
        for (name, constraints) in schema.fields() {
            let value = record.get_field(name);
            self.check_field(name, value.as_deref(), constraints);
        }
        tracing::debug!(
            fields = schema.len(),
            violations = self.len(),
            "checked record"
        );
        self.is_valid()
    }

    /// Validates a typed record using its own annotations, in declaration
    /// order. Violations are reported under each field's external name.
    pub fn check_annotated<A: Annotated + ?Sized>(&mut self, record: &A) -> bool {
        let annotations = record.annotations();
        for annotation in &annotations {
            let constraints = grammar::parse(annotation.rules());
            self.check_field(
                annotation.external_name(),
                Some(annotation.value()),
                &constraints,
            );
        }
        tracing::debug!(
            fields = annotations.len(),
            violations = self.len(),
            "checked annotated record"
        );
        self.is_valid()
    }

    /// Evaluates one field. `None` means the field is absent from the record.
    pub fn check_field(
        &mut self,
        field: &str,
        value: Option<&FieldValue>,
        constraints: &FieldConstraints,
    ) {
        if constraints.is_empty() {
            return;
        }

        let required = constraints.iter().find(|c| c.is_required());
        let value = match value {
            Some(v) if !coerce::is_empty(v) => v,
            _ => {
                if let Some(req) = required {
                    tracing::trace!(field, "required value missing");
                    self.add_violation(
                        Violation::new(field, req.message()).with_code(req.code()),
                    );
                }
                return;
            }
        };

        tracing::trace!(field, constraints = constraints.len(), "evaluating field");
        for constraint in constraints {
            if let Some(violation) = check_constraint(constraint, value, field, self.options) {
                self.add_violation(violation);
            }
        }
    }

    /// Appends a message under `field` with the generic code.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.add_violation(Violation::new(field, message));
    }

    /// Appends a violation under its field. Never overwrites.
    pub fn add_violation(&mut self, violation: Violation) {
        self.errors
            .entry(violation.field.clone())
            .or_default()
            .push(violation);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of violations across all fields.
    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages recorded for one field, in order.
    pub fn errors_for(&self, field: &str) -> Vec<&str> {
        self.errors
            .get(field)
            .map(|vs| vs.iter().map(|v| v.message.as_str()).collect())
            .unwrap_or_default()
    }

    /// Messages grouped by field, fields in the order first seen.
    pub fn field_errors(&self) -> IndexMap<String, Vec<String>> {
        self.errors
            .iter()
            .map(|(field, vs)| {
                (
                    field.clone(),
                    vs.iter().map(|v| v.message.clone()).collect(),
                )
            })
            .collect()
    }

    /// Every violation, grouped by field.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.errors.values().flatten()
    }

    /// Every violation rendered as `field: message`.
    pub fn flat_list(&self) -> Vec<String> {
        self.violations().map(ToString::to_string).collect()
    }

    /// The flat list joined by `; `.
    pub fn render(&self) -> String {
        self.flat_list().join("; ")
    }

    /// `{"field": ["message", ...]}`, fields in the same order as
    /// [`field_errors`](Self::field_errors).
    pub fn to_json(&self) -> Value {
        let fields: serde_json::Map<String, Value> = self
            .field_errors()
            .into_iter()
            .map(|(field, messages)| (field, json!(messages)))
            .collect();
        Value::Object(fields)
    }

    /// Resets the session so it can be reused.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Consumes the session into a [`ValidationResult`].
    pub fn into_result(self) -> ValidationResult<()> {
        match Violations::from_vec(self.errors.into_values().flatten().collect()) {
            Some(violations) => Validation::Failure(violations),
            None => Validation::Success(()),
        }
    }
}

impl Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Validates a record against a schema in a fresh session.
pub fn evaluate<R: Record + ?Sized>(
    schema: &Schema,
    record: &R,
) -> (bool, IndexMap<String, Vec<String>>) {
    schema.evaluate(record)
}

/// Checks one constraint against a present, non-empty value.
fn check_constraint(
    constraint: &Constraint,
    value: &FieldValue,
    field: &str,
    options: Options,
) -> Option<Violation> {
    let failed =
        |message: String| Some(Violation::new(field, message).with_code(constraint.code()));

    let passed = match constraint.kind() {
        ConstraintKind::Required => true,
        ConstraintKind::Min(min) => match coerce::to_integer(value) {
            Some(n) => predicate::at_least(n, *min),
            None => return type_mismatch(constraint, value, field, options),
        },
        ConstraintKind::Max(max) => match coerce::to_integer(value) {
            Some(n) => predicate::at_most(n, *max),
            None => return type_mismatch(constraint, value, field, options),
        },
        ConstraintKind::MinLength(n) => predicate::has_min_chars(&coerce::to_text(value), *n),
        ConstraintKind::MaxLength(n) => predicate::has_max_chars(&coerce::to_text(value), *n),
        ConstraintKind::Email => predicate::is_email(&coerce::to_text(value)),
        ConstraintKind::Url => predicate::is_url(&coerce::to_text(value)),
        ConstraintKind::Alpha => predicate::is_alpha(&coerce::to_text(value)),
        ConstraintKind::AlphaNumeric => predicate::is_alphanumeric(&coerce::to_text(value)),
        ConstraintKind::Numeric => predicate::is_numeric(&coerce::to_text(value)),
        ConstraintKind::Uuid => predicate::is_uuid(&coerce::to_text(value)),
        ConstraintKind::Ip => predicate::is_ip(&coerce::to_text(value)),
        ConstraintKind::Ipv4 => predicate::is_ipv4(&coerce::to_text(value)),
        ConstraintKind::Ipv6 => predicate::is_ipv6(&coerce::to_text(value)),
        ConstraintKind::Pattern { regex, .. } => predicate::matches(regex, &coerce::to_text(value)),
        ConstraintKind::OneOf(allowed) => predicate::is_one_of(&coerce::to_text(value), allowed),
        ConstraintKind::NotOneOf(denied) => {
            predicate::is_not_one_of(&coerce::to_text(value), denied)
        }
        ConstraintKind::Equal(expected) => predicate::is_equal(&coerce::to_text(value), expected),
        ConstraintKind::NotEqual(expected) => {
            !predicate::is_equal(&coerce::to_text(value), expected)
        }
        ConstraintKind::TimeFormat(layout) => check_time_format(value, layout),
        ConstraintKind::After(boundary) => value
            .as_timestamp()
            .map_or(true, |t| predicate::is_after(t, boundary)),
        ConstraintKind::Before(boundary) => value
            .as_timestamp()
            .map_or(true, |t| predicate::is_before(t, boundary)),
        ConstraintKind::Custom(check) => {
            return check(value).and_then(|description| {
                let message = constraint
                    .override_message()
                    .map_or(description, str::to_string);
                failed(message)
            });
        }
    };

    if passed {
        None
    } else {
        failed(constraint.message())
    }
}

fn check_time_format(value: &FieldValue, layout: &TimeLayout) -> bool {
    match coerce::to_timestamp(value, layout) {
        Ok(_) => true,
        Err(error) => {
            tracing::trace!(%error, "timestamp coercion failed");
            false
        }
    }
}

fn type_mismatch(
    constraint: &Constraint,
    value: &FieldValue,
    field: &str,
    options: Options,
) -> Option<Violation> {
    match options.type_mismatch {
        MismatchPolicy::Skip => {
            tracing::trace!(
                field,
                rule = constraint.code(),
                got = value.type_name(),
                "numeric bound not applicable"
            );
            None
        }
        MismatchPolicy::Report => {
            Some(Violation::new(field, "Must be a number").with_code("type_mismatch"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::rules;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::collections::HashMap;

    fn record(entries: &[(&str, FieldValue)]) -> HashMap<String, FieldValue> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_valid_record_has_no_errors() {
        let schema = Schema::new().rules("name", "required|min_len:3");
        let mut validator = Validator::new();
        assert!(validator.check(&schema, &record(&[("name", "alice".into())])));
        assert!(!validator.has_errors());
        assert!(validator.field_errors().is_empty());
        assert_eq!(validator.render(), "");
    }

    #[test]
    fn test_missing_required_field_reports_once() {
        let schema = Schema::new().rules("name", "required|min_len:3|alpha");
        let mut validator = Validator::new();
        assert!(!validator.check(&schema, &record(&[])));
        assert_eq!(validator.errors_for("name"), vec!["This field is required"]);
    }

    #[test]
    fn test_empty_required_value_stops_field() {
        let schema = Schema::new().rules("name", "min_len:3|required|email");
        let mut validator = Validator::new();
        validator.check(&schema, &record(&[("name", "".into())]));
        assert_eq!(validator.errors_for("name"), vec!["This field is required"]);
        assert_eq!(validator.violations().next().unwrap().code, "required");
    }

    #[test]
    fn test_absent_optional_field_is_valid() {
        let schema = Schema::new().rules("nickname", "min_len:3|alpha");
        assert!(Validator::new().check(&schema, &record(&[])));
    }

    #[test]
    fn test_empty_optional_value_skips_constraints() {
        let schema = Schema::new()
            .rules("nickname", "min_len:3")
            .rules("age", "min:18");
        let mut validator = Validator::new();
        let valid = validator.check(
            &schema,
            &record(&[("nickname", "".into()), ("age", FieldValue::Int(0))]),
        );
        assert!(valid);
    }

    #[test]
    fn test_every_failing_constraint_reports() {
        let schema = Schema::new().rules("code", "min_len:5|alpha|in:ABCDE,FGHIJ");
        let mut validator = Validator::new();
        validator.check(&schema, &record(&[("code", "a1".into())]));
        assert_eq!(
            validator.errors_for("code"),
            vec![
                "Must be at least 5 characters",
                "Must contain only letters",
                "Must be one of: ABCDE, FGHIJ",
            ]
        );
    }

    #[test]
    fn test_numeric_bounds() {
        let schema = Schema::new().rules("age", "min:18|max:30");

        let mut validator = Validator::new();
        assert!(!validator.check(&schema, &record(&[("age", FieldValue::Int(15))])));
        assert_eq!(validator.errors_for("age"), vec!["Must be at least 18"]);

        let mut validator = Validator::new();
        assert!(validator.check(&schema, &record(&[("age", FieldValue::Int(25))])));

        let mut validator = Validator::new();
        assert!(!validator.check(&schema, &record(&[("age", FieldValue::Int(35))])));
        assert_eq!(validator.errors_for("age"), vec!["Must be at most 30"]);
    }

    #[test]
    fn test_numeric_bounds_on_text_digits_and_floats() {
        let schema = Schema::new().rules("n", "min:10");
        assert!(!Validator::new().check(&schema, &record(&[("n", "9".into())])));
        assert!(Validator::new().check(&schema, &record(&[("n", "10".into())])));
        assert!(!Validator::new().check(&schema, &record(&[("n", FieldValue::Float(10.0 - 0.5))])));
        assert!(Validator::new().check(&schema, &record(&[("n", FieldValue::Float(10.9))])));
    }

    #[test]
    fn test_bounds_reject_values_beyond_i64_range() {
        let schema = Schema::new().rules("n", "min:-100|max:100");

        for value in [json!(1e30), json!(u64::MAX)] {
            let (valid, errors) = evaluate(&schema, &json!({ "n": value.clone() }));
            assert!(!valid, "{}", value);
            assert_eq!(errors["n"], vec!["Must be at most 100"]);
        }

        let (_, errors) = evaluate(&schema, &json!({"n": -1e30}));
        assert_eq!(errors["n"], vec!["Must be at least -100"]);
    }

    #[test]
    fn test_non_numeric_value_skips_bounds_by_default() {
        let schema = Schema::new().rules("n", "min:10|max:20");
        assert!(Validator::new().check(&schema, &record(&[("n", "many".into())])));
    }

    #[test]
    fn test_report_policy_flags_type_mismatch() {
        let schema = Schema::new().rules("n", "min:10|max:20");
        let options = Options::new().with_type_mismatch(MismatchPolicy::Report);
        let mut validator = Validator::with_options(options);
        assert!(!validator.check(&schema, &record(&[("n", "many".into())])));
        assert_eq!(
            validator.errors_for("n"),
            vec!["Must be a number", "Must be a number"]
        );
        assert!(validator.violations().all(|v| v.code == "type_mismatch"));
    }

    #[test]
    fn test_equal_and_not_equal_compare_text_forms() {
        let schema = Schema::new()
            .rules("confirm", "equal:yes")
            .rules("count", "not_equal:3");
        let mut validator = Validator::new();
        validator.check(
            &schema,
            &record(&[("confirm", "no".into()), ("count", FieldValue::Int(3))]),
        );
        assert_eq!(validator.errors_for("confirm"), vec!["Must be equal to yes"]);
        assert_eq!(validator.errors_for("count"), vec!["Must not be equal to 3"]);
    }

    #[test]
    fn test_equal_treats_float_forms_as_numbers() {
        let schema = Schema::new()
            .rules("ratio", "equal:1.0")
            .rules("limit", "not_equal:1");

        let (valid, errors) = evaluate(&schema, &json!({"ratio": 1.0, "limit": 1.0}));
        assert!(!valid);
        assert!(!errors.contains_key("ratio"));
        assert_eq!(errors["limit"], vec!["Must not be equal to 1"]);

        let (_, errors) = evaluate(&schema, &json!({"ratio": 1.5, "limit": 2}));
        assert_eq!(errors["ratio"], vec!["Must be equal to 1.0"]);
        assert!(!errors.contains_key("limit"));
    }

    #[test]
    fn test_temporal_relations_apply_only_to_native_timestamps() {
        let boundary = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let schema = Schema::new().field("at", [rules::time_after(boundary)]);

        let early = FieldValue::from(Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap());
        let mut validator = Validator::new();
        assert!(!validator.check(&schema, &record(&[("at", early)])));
        assert_eq!(
            validator.errors_for("at"),
            vec!["Must be after 2024-01-01T00:00:00Z"]
        );

        // text is not parsed for relational checks
        assert!(Validator::new().check(&schema, &record(&[("at", "2000-01-01".into())])));
    }

    #[test]
    fn test_custom_predicate_description_and_override() {
        let odd = |v: &FieldValue| match v {
            FieldValue::Int(n) if n % 2 != 0 => Some(format!("{} is odd", n)),
            _ => None,
        };
        let schema = Schema::new()
            .field("a", [rules::custom(odd)])
            .field("b", [rules::custom(odd).error("must be even")]);

        let mut validator = Validator::new();
        validator.check(
            &schema,
            &record(&[("a", FieldValue::Int(3)), ("b", FieldValue::Int(5))]),
        );
        assert_eq!(validator.errors_for("a"), vec!["3 is odd"]);
        assert_eq!(validator.errors_for("b"), vec!["must be even"]);

        let mut validator = Validator::new();
        assert!(validator.check(&schema, &record(&[("a", FieldValue::Int(4))])));
    }

    #[test]
    fn test_field_order_follows_schema() {
        let schema = Schema::new()
            .rules("z", "required")
            .rules("a", "required")
            .rules("m", "required");
        let mut validator = Validator::new();
        validator.check(&schema, &record(&[]));
        let fields: Vec<_> = validator.field_errors().keys().cloned().collect();
        assert_eq!(fields, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_add_error_appends() {
        let mut validator = Validator::new();
        validator.add_error("a", "first");
        validator.add_error("a", "second");
        validator.add_error("b", "third");
        assert_eq!(validator.errors_for("a"), vec!["first", "second"]);
        assert_eq!(validator.len(), 3);
        assert_eq!(
            validator.flat_list(),
            vec!["a: first", "a: second", "b: third"]
        );
        assert_eq!(validator.to_string(), "a: first; a: second; b: third");
    }

    #[test]
    fn test_clear_allows_reuse() {
        let schema = Schema::new().rules("name", "required");
        let mut validator = Validator::new();
        assert!(!validator.check(&schema, &record(&[])));
        validator.clear();
        assert!(validator.is_valid());
        assert!(validator.check(&schema, &record(&[("name", "x".into())])));
    }

    #[test]
    fn test_to_json() {
        let schema = Schema::new()
            .rules("zeta", "required")
            .rules("alpha", "required")
            .rules("mid", "min:18");
        let mut validator = Validator::new();
        validator.check(&schema, &json!({"mid": 3}));

        let rendered = validator.to_json();
        assert_eq!(
            rendered,
            json!({
                "zeta": ["This field is required"],
                "alpha": ["This field is required"],
                "mid": ["Must be at least 18"]
            })
        );
        let keys: Vec<_> = rendered.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            rendered.to_string(),
            r#"{"zeta":["This field is required"],"alpha":["This field is required"],"mid":["Must be at least 18"]}"#
        );
    }

    #[test]
    fn test_into_result() {
        let validator = Validator::new();
        assert!(validator.into_result().is_success());

        let mut validator = Validator::new();
        validator.add_error("a", "x");
        let errors = validator.into_result().into_result().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().field, "a");
    }

    #[test]
    fn test_evaluate_free_function() {
        let schema = Schema::new().rules("email", "email");
        let (valid, errors) = evaluate(&schema, &json!({"email": "invalid"}));
        assert!(!valid);
        assert_eq!(errors["email"], vec!["Must be a valid email address"]);
    }
}
