//! Condition extraction from free-text clinical rule descriptions.
//!
//! [`extract_conditions`] runs an ordered regex battery over a description
//! and returns the matched field/operator/value conditions, the `and`/`or`
//! connectives found in the text, and the clinical domains involved.

pub mod connective;
pub mod extract;
pub mod fields;
pub mod rules;

pub use connective::{attribute_joins, find_connectives, join_for};
pub use extract::{ParseOptions, extract_conditions, extract_conditions_with};
