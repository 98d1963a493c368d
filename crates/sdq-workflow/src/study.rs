//! Scenarios selected into the study.

use chrono::{DateTime, Utc};
use sdq_client::ChildSuggestion;
use sdq_generate::{
    EdcLink, classify_tag, integration_template, local_generation, suggest_scenario_name,
};
use sdq_model::{Domain, Priority, Scenario, normalize_cdash_items};
use sdq_parse::ParseOptions;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Type given to suggestions without a tag.
pub const DEFAULT_STUDY_TYPE: &str = "Safety";

/// A scenario added to the study, with the time it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyScenario {
    #[serde(flatten)]
    pub scenario: Scenario,
    pub added_at: DateTime<Utc>,
}

impl StudyScenario {
    pub fn id(&self) -> &str {
        &self.scenario.id
    }

    /// Build a study scenario from a backend suggestion. Fields the
    /// suggestion leaves empty are generated locally from its text.
    pub fn from_suggestion(
        suggestion: &ChildSuggestion,
        options: &ParseOptions,
        edc: &EdcLink,
        added_at: DateTime<Utc>,
    ) -> Result<Self> {
        let description = suggestion.scenario_text.trim().to_string();
        let (parse, synthesis) = local_generation(&description, options, None);

        let domain = suggestion
            .domains
            .iter()
            .find_map(|d| d.parse::<Domain>().ok())
            .unwrap_or_else(|| parse.primary_domain());
        let query_text = non_empty(&suggestion.reasoning_template).unwrap_or(synthesis.query_text);
        let code = suggestion
            .pseudo_code
            .as_deref()
            .and_then(non_empty)
            .unwrap_or(synthesis.code);
        let cdash_items = if suggestion.required_cdash_items.is_empty() {
            synthesis.cdash_items
        } else {
            normalize_cdash_items(&suggestion.required_cdash_items)
        };
        let scenario_type = suggestion
            .tag
            .as_deref()
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_STUDY_TYPE.to_string());

        let name = suggest_scenario_name(&description);
        let template =
            integration_template(edc, &name, &description, &query_text, &cdash_items, domain)?;

        Ok(Self {
            scenario: Scenario {
                id: format!("study_{}", Uuid::new_v4().simple()),
                name,
                description,
                domain,
                priority: Priority::Medium,
                scenario_type,
                is_parent: false,
                query_text,
                code,
                cdash_items,
                template,
            },
            added_at,
        })
    }
}

/// A single suggestion built locally from a parent description, for when
/// the backend cannot be reached.
pub fn local_suggestion(name: &str, description: &str, options: &ParseOptions) -> ChildSuggestion {
    let (parse, synthesis) = local_generation(description, options, None);
    let tag = classify_tag(name, description);
    ChildSuggestion {
        scenario_text: description.trim().to_string(),
        reasoning_template: synthesis.query_text,
        domains: parse.domains.iter().map(|d| d.as_str().to_string()).collect(),
        required_cdash_items: synthesis.cdash_items,
        tag: Some(tag.as_str().to_string()),
        pseudo_code: Some(synthesis.code),
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn keeps_backend_fields() {
        let suggestion = ChildSuggestion {
            scenario_text: "Serious AEs without outcome".to_string(),
            reasoning_template: "Check serious events for a documented outcome.".to_string(),
            domains: vec!["XX".to_string(), "AE".to_string()],
            required_cdash_items: vec!["aeser".to_string(), "AEOUT".to_string()],
            tag: Some("Data Quality".to_string()),
            pseudo_code: Some("def check(df):\n    return df".to_string()),
        };
        let study =
            StudyScenario::from_suggestion(&suggestion, &ParseOptions::default(), &EdcLink::default(), at())
                .unwrap();
        let scenario = &study.scenario;
        assert!(scenario.id.starts_with("study_"));
        assert_eq!(scenario.domain, Domain::AE);
        assert_eq!(scenario.query_text, "Check serious events for a documented outcome.");
        assert_eq!(scenario.code, "def check(df):\n    return df");
        assert_eq!(scenario.cdash_items, vec!["SUBJID", "AESER", "AEOUT"]);
        assert_eq!(scenario.scenario_type, "Data Quality");
        assert!(!scenario.is_parent);
        assert_eq!(study.added_at, at());
    }

    #[test]
    fn fills_gaps_locally() {
        let suggestion = ChildSuggestion {
            scenario_text: "AGE > 65 and SEX = 'M'".to_string(),
            reasoning_template: "  ".to_string(),
            domains: Vec::new(),
            required_cdash_items: Vec::new(),
            tag: None,
            pseudo_code: None,
        };
        let study =
            StudyScenario::from_suggestion(&suggestion, &ParseOptions::default(), &EdcLink::default(), at())
                .unwrap();
        let scenario = &study.scenario;
        assert_eq!(scenario.domain, Domain::DM);
        assert_eq!(scenario.query_text, "Flag records where AGE > 65 and SEX = 'M'.");
        assert!(scenario.code.starts_with("def check_dm_validation(df):"));
        assert_eq!(scenario.cdash_items, vec!["SUBJID", "AGE", "SEX"]);
        assert_eq!(scenario.scenario_type, DEFAULT_STUDY_TYPE);
    }

    #[test]
    fn local_suggestion_round_trips() {
        let options = ParseOptions::default();
        let suggestion = local_suggestion("Lab ranges", "LBORRES > 10 for lab results", &options);
        assert_eq!(suggestion.domains, vec!["LB"]);
        assert_eq!(suggestion.required_cdash_items, vec!["SUBJID", "LBORRES"]);

        let study =
            StudyScenario::from_suggestion(&suggestion, &options, &EdcLink::default(), at()).unwrap();
        assert_eq!(study.scenario.domain, Domain::LB);
        assert_eq!(study.scenario.query_text, suggestion.reasoning_template);
    }

    #[test]
    fn ids_are_unique() {
        let suggestion = ChildSuggestion {
            scenario_text: "AESEV is missing".to_string(),
            reasoning_template: String::new(),
            domains: Vec::new(),
            required_cdash_items: Vec::new(),
            tag: None,
            pseudo_code: None,
        };
        let options = ParseOptions::default();
        let edc = EdcLink::default();
        let a = StudyScenario::from_suggestion(&suggestion, &options, &edc, at()).unwrap();
        let b = StudyScenario::from_suggestion(&suggestion, &options, &edc, at()).unwrap();
        assert_ne!(a.id(), b.id());
    }
}
