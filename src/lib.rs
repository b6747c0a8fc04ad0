//! # Verdict
//!
//! A record validation library that accumulates ALL violations, providing
//! comprehensive feedback rather than short-circuiting on the first failure.
//!
//! ## Overview
//!
//! A record is either a loosely-typed map (anything implementing [`Record`],
//! such as a `HashMap<String, FieldValue>` or a `serde_json::Value`) checked
//! against an explicit [`Schema`], or a typed value implementing
//! [`Annotated`] that carries its own rule strings. Constraints are written
//! either in a compact grammar (`"required|min_len:3"`) or with the builder
//! constructors in [`schema::rules`]; both produce the same [`Constraint`]
//! values and therefore the same messages.
//!
//! Values are coerced per constraint: numeric bounds read integers, floats
//! and digit strings; text rules read the textual form; time formats parse
//! text against a layout.
//!
//! ## Core Types
//!
//! - [`FieldValue`]: the dynamic value model for map-shaped records
//! - [`Constraint`]: one rule with its parameters and optional override message
//! - [`Schema`]: field name to ordered constraints
//! - [`Validator`]: a validation session that collects violations per field
//! - [`Violation`] / [`Violations`]: the failure data
//!
//! ## Example
//!
//! ```rust
//! use verdict::schema::rules::{min, required};
//! use verdict::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .rules("name", "required|min_len:3")
//!     .rules("role", "in:admin,user")
//!     .field("age", [required(), min(18)]);
//!
//! let (valid, errors) = schema.evaluate(&json!({
//!     "name": "Al",
//!     "role": "guest",
//!     "age": 15
//! }));
//!
//! assert!(!valid);
//! assert_eq!(errors["name"], vec!["Must be at least 3 characters"]);
//! assert_eq!(errors["role"], vec!["Must be one of: admin, user"]);
//! assert_eq!(errors["age"], vec!["Must be at least 18"]);
//! ```

pub mod coerce;
pub mod constraint;
pub mod error;
pub mod grammar;
pub mod predicate;
pub mod record;
pub mod registry;
pub mod schema;
pub mod validator;
pub mod value;

pub use coerce::{CoercionError, TimeLayout};
pub use constraint::{Constraint, ConstraintError, ConstraintKind, CustomFn};
pub use error::{Violation, Violations};
pub use grammar::GrammarError;
pub use record::{lint_annotations, Annotated, FieldAnnotation, Record};
pub use registry::{RegistryError, SchemaRegistry};
pub use schema::{FieldConstraints, Schema};
pub use validator::{evaluate, MismatchPolicy, Options, Validator};
pub use value::FieldValue;

/// Type alias for validation results using Violations
pub type ValidationResult<T> = stillwater::Validation<T, Violations>;
