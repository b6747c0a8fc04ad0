//! Parser for compact rule strings such as `"required|min_len:3|in:a,b"`.
//!
//! Tokens are separated by `|`. Each token is `name` or `name:argument`;
//! only the first `:` splits, so arguments may contain colons. List
//! arguments (`in`, `not_in`) are split on `,`. Whitespace around tokens,
//! names, arguments and list items is trimmed.
//!
//! [`parse`] is permissive: unknown names are ignored and a token with a
//! missing or malformed argument drops only that constraint. [`parse_strict`]
//! reports the first such problem instead.
//!
//! # Example
//!
//! ```rust
//! use verdict::grammar;
//!
//! let constraints = grammar::parse("required | min_len:3 | frobnicate");
//! let codes: Vec<_> = constraints.iter().map(|c| c.code()).collect();
//! assert_eq!(codes, vec!["required", "min_len"]);
//!
//! assert!(grammar::parse_strict("required|frobnicate").is_err());
//! ```

use regex::Regex;

use crate::coerce::TimeLayout;
use crate::constraint::{Constraint, ConstraintKind};
use crate::schema::FieldConstraints;

/// A problem found while parsing a rule string in strict mode.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrammarError {
    #[error("unknown rule '{0}'")]
    UnknownRule(String),

    #[error("rule '{0}' requires an argument")]
    MissingArgument(String),

    #[error("invalid argument '{argument}' for rule '{rule}'")]
    InvalidArgument { rule: String, argument: String },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Parses a rule string, silently skipping anything it cannot use.
pub fn parse(rules: &str) -> FieldConstraints {
    tokens(rules)
        .filter_map(|(name, argument)| match parse_token(name, argument) {
            Ok(constraint) => Some(constraint),
            Err(error) => {
                tracing::debug!(rules, %error, "dropping rule token");
                None
            }
        })
        .collect()
}

/// Parses a rule string, failing on the first token that cannot be used.
pub fn parse_strict(rules: &str) -> Result<FieldConstraints, GrammarError> {
    tokens(rules)
        .map(|(name, argument)| parse_token(name, argument))
        .collect()
}

/// Collects every problem in a rule string rather than stopping at the first.
pub fn diagnose(rules: &str) -> Vec<GrammarError> {
    tokens(rules)
        .filter_map(|(name, argument)| parse_token(name, argument).err())
        .collect()
}

/// Splits a rule string into trimmed `(name, argument)` pairs, skipping empty tokens.
fn tokens(rules: &str) -> impl Iterator<Item = (&str, Option<&str>)> {
    rules.split('|')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| match token.split_once(':') {
            Some((name, argument)) => (name.trim(), Some(argument.trim())),
            None => (token, None),
        })
}

fn parse_token(name: &str, argument: Option<&str>) -> Result<Constraint, GrammarError> {
    let kind = match name {
        "required" => ConstraintKind::Required,
        "email" => ConstraintKind::Email,
        "url" => ConstraintKind::Url,
        "alpha" => ConstraintKind::Alpha,
        "alphanum" => ConstraintKind::AlphaNumeric,
        "numeric" => ConstraintKind::Numeric,
        "uuid" => ConstraintKind::Uuid,
        "ip" => ConstraintKind::Ip,
        "ipv4" => ConstraintKind::Ipv4,
        "ipv6" => ConstraintKind::Ipv6,
        "date" => ConstraintKind::TimeFormat(TimeLayout::Date),
        "time" => ConstraintKind::TimeFormat(TimeLayout::Time),
        "datetime" => ConstraintKind::TimeFormat(TimeLayout::DateTime),
        "min" => ConstraintKind::Min(integer_argument(name, argument)?),
        "max" => ConstraintKind::Max(integer_argument(name, argument)?),
        "min_len" => ConstraintKind::MinLength(length_argument(name, argument)?),
        "max_len" => ConstraintKind::MaxLength(length_argument(name, argument)?),
        "in" => ConstraintKind::OneOf(list_argument(name, argument)?),
        "not_in" => ConstraintKind::NotOneOf(list_argument(name, argument)?),
        "equal" => ConstraintKind::Equal(required_argument(name, argument)?.to_string()),
        "not_equal" => ConstraintKind::NotEqual(required_argument(name, argument)?.to_string()),
        "regex" => {
            let pattern = required_argument(name, argument)?;
            let regex = Regex::new(pattern).map_err(|e| GrammarError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
            ConstraintKind::Pattern {
                regex,
                source: pattern.to_string(),
            }
        }
        unknown => return Err(GrammarError::UnknownRule(unknown.to_string())),
    };
    Ok(Constraint::new(kind))
}

fn required_argument<'a>(name: &str, argument: Option<&'a str>) -> Result<&'a str, GrammarError> {
    match argument {
        Some(arg) if !arg.is_empty() => Ok(arg),
        _ => Err(GrammarError::MissingArgument(name.to_string())),
    }
}

fn integer_argument(name: &str, argument: Option<&str>) -> Result<i64, GrammarError> {
    let arg = required_argument(name, argument)?;
    arg.parse().map_err(|_| GrammarError::InvalidArgument {
        rule: name.to_string(),
        argument: arg.to_string(),
    })
}

fn length_argument(name: &str, argument: Option<&str>) -> Result<usize, GrammarError> {
    let arg = required_argument(name, argument)?;
    arg.parse().map_err(|_| GrammarError::InvalidArgument {
        rule: name.to_string(),
        argument: arg.to_string(),
    })
}

fn list_argument(name: &str, argument: Option<&str>) -> Result<Vec<String>, GrammarError> {
    let arg = required_argument(name, argument)?;
    Ok(arg.split(',').map(|item| item.trim().to_string()).collect())
}
