//! Request and response bodies for the backend endpoints.

use serde::{Deserialize, Serialize};
use sdq_model::Scenario;

pub const GENERATE_METADATA: &str = "api/generate-scenario-metadata";
pub const SUGGEST_CHILD_SCENARIOS: &str = "api/suggest-child-scenarios";
pub const UPDATE_SCENARIO_CODE: &str = "api/update-scenario-code";
pub const SUGGEST_OOTB_SCENARIOS: &str = "api/suggest-ootb-scenarios";
pub const GET_OOTB_SCENARIOS: &str = "api/get-ootb-scenarios";
pub const DOMAIN_ANALYSIS: &str = "api/generate-domain-analysis";
pub const MODEL_THINKING: &str = "api/generate-model-thinking";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptionRequest<'a> {
    pub description: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildSuggestionRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OotbSuggestionRequest<'a> {
    /// Domain codes of interest.
    pub domains: Vec<&'a str>,
    /// Ids already in the study, left out of the suggestions.
    pub exclude_existing: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OotbScenariosRequest<'a> {
    pub scenario_ids: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioIdRequest<'a> {
    pub scenario_id: &'a str,
}

/// Suggested name and tag for a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    pub name: String,
    pub tag: String,
}

/// A child scenario proposed for a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSuggestion {
    pub scenario_text: String,
    pub reasoning_template: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub required_cdash_items: Vec<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub pseudo_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ChildSuggestionsResponse {
    pub suggestions: Vec<ChildSuggestion>,
}

/// Regenerated query text and code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeUpdate {
    pub query_text: String,
    pub python_code: String,
}

/// An out-of-the-box scenario offered for a study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OotbSuggestion {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct OotbSuggestionsResponse {
    pub suggestions: Vec<OotbSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct OotbScenariosResponse {
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainAnalysis {
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,
    pub risk_level: String,
    #[serde(default)]
    pub risk_explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelThinking {
    pub selection_reasoning: String,
    #[serde(default)]
    pub priority_logic: String,
    #[serde(default)]
    pub implementation_steps: Vec<String>,
}
