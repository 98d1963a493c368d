//! Client for the scenario generation backend.
//!
//! [`ScenarioApi`] is the seam the workflow talks through;
//! [`HttpScenarioApi`] implements it with blocking `reqwest` calls. Every
//! failure is a [`ClientError`], and callers pair each call with a local
//! fallback.

pub mod api;
pub mod client;
pub mod error;

pub use api::{ChildSuggestion, CodeUpdate, DomainAnalysis, ModelThinking, OotbSuggestion, ScenarioMetadata};
pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HttpScenarioApi, ScenarioApi, parse_base_url};
pub use error::{ClientError, Result};
