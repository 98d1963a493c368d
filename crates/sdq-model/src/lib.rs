//! Data model for clinical data-quality scenarios.
//!
//! Conditions parsed out of free-text descriptions, the clinical domains they
//! belong to, and the scenarios built from them.

pub mod condition;
pub mod domain;
pub mod error;
pub mod parse;
pub mod scenario;

pub use condition::{Condition, Connective, LogicalOperator, Operator, PLACEHOLDER_FIELD};
pub use domain::Domain;
pub use error::{ModelError, Result};
pub use parse::ParseResult;
pub use scenario::{
    ParentScenario, Priority, SUBJECT_ID, Scenario, ScenarioTag, normalize_cdash_items,
};
