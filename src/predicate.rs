//! Stateless checks shared by the grammar and builder authoring paths.
//!
//! Every function here is pure: it takes already-coerced input and answers
//! pass or fail. Format patterns are compiled once on first use and shared
//! read-only across threads.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;

const EMAIL: &str = r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$";
const URL: &str = r"^(?i:https?|ftp)://[^\s/$.?#][^\s]*$";
const UUID: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-5][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$";
const ALPHA: &str = r"^[a-zA-Z]+$";
const ALPHANUMERIC: &str = r"^[a-zA-Z0-9]+$";
const NUMERIC: &str = r"^[-+]?[0-9]+(\.[0-9]+)?$";

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("built-in pattern must compile"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, EMAIL)
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, URL)
}

fn uuid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, UUID)
}

fn alpha_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, ALPHA)
}

fn alphanumeric_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, ALPHANUMERIC)
}

fn numeric_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, NUMERIC)
}

/// Returns true for `local@domain.tld` shaped addresses.
///
/// # Example
///
/// ```rust
/// use verdict::predicate::is_email;
///
/// assert!(is_email("john@example.com"));
/// assert!(!is_email("invalid"));
/// ```
pub fn is_email(value: &str) -> bool {
    email_regex().is_match(value)
}

/// Returns true for absolute `http`, `https` or `ftp` URLs.
pub fn is_url(value: &str) -> bool {
    url_regex().is_match(value)
}

/// Returns true for RFC 4122 shaped UUIDs, versions 1 through 5.
pub fn is_uuid(value: &str) -> bool {
    uuid_regex().is_match(value)
}

/// Returns true when the value is non-empty ASCII letters only.
pub fn is_alpha(value: &str) -> bool {
    alpha_regex().is_match(value)
}

/// Returns true when the value is non-empty ASCII letters and digits only.
pub fn is_alphanumeric(value: &str) -> bool {
    alphanumeric_regex().is_match(value)
}

/// Returns true for an optionally signed decimal number with at most one
/// decimal point.
pub fn is_numeric(value: &str) -> bool {
    numeric_regex().is_match(value)
}

/// Returns true for dotted-quad IPv4 addresses.
pub fn is_ipv4(value: &str) -> bool {
    value.parse::<Ipv4Addr>().is_ok()
}

/// Returns true for textual IPv6 addresses.
pub fn is_ipv6(value: &str) -> bool {
    value.parse::<Ipv6Addr>().is_ok()
}

/// Returns true for either address family.
pub fn is_ip(value: &str) -> bool {
    is_ipv4(value) || is_ipv6(value)
}

/// Returns true if `regex` matches anywhere in `value`.
pub fn matches(regex: &Regex, value: &str) -> bool {
    regex.is_match(value)
}

/// Returns true if `value` equals one of `options` exactly.
pub fn is_one_of(value: &str, options: &[String]) -> bool {
    options.iter().any(|o| o == value)
}

/// Returns true if `value` equals none of `options`.
pub fn is_not_one_of(value: &str, options: &[String]) -> bool {
    !is_one_of(value, options)
}

/// Returns true if the texts are identical, or both are numeric and denote
/// the same number, so `"1"` equals `"1.0"`.
pub fn is_equal(value: &str, expected: &str) -> bool {
    if value == expected {
        return true;
    }
    if !is_numeric(value) || !is_numeric(expected) {
        return false;
    }
    match (value.parse::<f64>(), expected.parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Counts Unicode scalar values, not bytes.
pub fn char_count(value: &str) -> usize {
    value.chars().count()
}

/// Returns true if `value` has at least `min` characters.
pub fn has_min_chars(value: &str, min: usize) -> bool {
    char_count(value) >= min
}

/// Returns true if `value` has at most `max` characters.
pub fn has_max_chars(value: &str, max: usize) -> bool {
    char_count(value) <= max
}

/// Inclusive lower bound.
pub fn at_least(value: i64, min: i64) -> bool {
    value >= min
}

/// Inclusive upper bound.
pub fn at_most(value: i64, max: i64) -> bool {
    value <= max
}

/// Returns true if `value` is strictly later than `boundary`.
pub fn is_after(value: &DateTime<FixedOffset>, boundary: &DateTime<FixedOffset>) -> bool {
    value > boundary
}

/// Returns true if `value` is strictly earlier than `boundary`.
pub fn is_before(value: &DateTime<FixedOffset>, boundary: &DateTime<FixedOffset>) -> bool {
    value < boundary
}
