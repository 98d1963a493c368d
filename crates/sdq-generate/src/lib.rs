//! Rule text, filter code and templates for data-quality scenarios.
//!
//! [`synthesize`] turns a [`sdq_model::ParseResult`] into a bounded query
//! sentence, a pandas filter function and the CDASH items the check needs.
//! Known clinical condition combinations get hand-written text and code.

pub mod cdash;
pub mod code;
pub mod error;
pub mod fallback;
pub mod lint;
pub mod metadata;
pub mod phrase;
pub mod shape;
pub mod synth;
pub mod template;

pub use cdash::cdash_items;
pub use error::{GenerateError, Result};
pub use fallback::{fallback_generation, local_generation};
pub use lint::{ValidationWarning, lint_code};
pub use metadata::{DEFAULT_SCENARIO_NAME, classify_tag, suggest_scenario_name};
pub use shape::{Shape, ShapeKind};
pub use synth::{QUERY_TEXT_LIMIT, Synthesis, bound_query_text, fallback_sentence, synthesize};
pub use template::{DEFAULT_EDC_BASE_URL, EdcLink, integration_template, prompt_template};
