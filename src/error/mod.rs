//! Error types for validation failures.
//!
//! Violations are data, not faults: they describe which field failed which
//! constraint. Programmer-facing errors (bad rule strings, bad layouts,
//! registry misuse) live next to the code that raises them.

mod violation;

pub use violation::{Violation, Violations};
