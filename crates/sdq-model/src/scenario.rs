//! Scenarios (one validation rule each) and their domain-level parents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::Domain;
use crate::error::ModelError;

/// Subject identifier; always the first CDASH item.
pub const SUBJECT_ID: &str = "SUBJID";

/// Review priority of a check.
///
/// Free text is accepted; anything other than the three levels is kept
/// verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Other(raw) => raw,
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, Priority::High)
    }
}

impl From<&str> for Priority {
    fn from(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "HIGH" => Priority::High,
            "MEDIUM" => Priority::Medium,
            "LOW" => Priority::Low,
            _ => Priority::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        Priority::from(s.as_str())
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification tag attached to parent scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioTag {
    Safety,
    Efficacy,
    #[serde(rename = "Data Quality")]
    DataQuality,
    Compliance,
    #[serde(rename = "Protocol Deviation")]
    ProtocolDeviation,
    Other,
}

impl ScenarioTag {
    pub const ALL: [ScenarioTag; 6] = [
        ScenarioTag::Safety,
        ScenarioTag::Efficacy,
        ScenarioTag::DataQuality,
        ScenarioTag::Compliance,
        ScenarioTag::ProtocolDeviation,
        ScenarioTag::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioTag::Safety => "Safety",
            ScenarioTag::Efficacy => "Efficacy",
            ScenarioTag::DataQuality => "Data Quality",
            ScenarioTag::Compliance => "Compliance",
            ScenarioTag::ProtocolDeviation => "Protocol Deviation",
            ScenarioTag::Other => "Other",
        }
    }
}

impl fmt::Display for ScenarioTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScenarioTag {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['_', '-'], " ").to_uppercase();
        ScenarioTag::ALL
            .into_iter()
            .find(|t| t.as_str().to_uppercase() == normalized)
            .ok_or_else(|| ModelError::UnknownTag(s.to_string()))
    }
}

/// One validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub domain: Domain,
    #[serde(default)]
    pub priority: Priority,
    /// Free-text type column (`Safety`, `Parent`, ...).
    #[serde(rename = "type")]
    pub scenario_type: String,
    pub is_parent: bool,
    pub query_text: String,
    #[serde(rename = "python_code")]
    pub code: String,
    pub cdash_items: Vec<String>,
    #[serde(rename = "sdq_template", default)]
    pub template: String,
}

/// A domain-level grouping of scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentScenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub domain: Domain,
    pub child_scenarios: Vec<Scenario>,
    pub is_from_drp: bool,
}

impl Scenario {
    /// Case-insensitive substring search over the scenario's text fields.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty() || self.matches_lowered(&query)
    }

    fn matches_lowered(&self, query: &str) -> bool {
        let fields = [
            self.name.as_str(),
            self.description.as_str(),
            self.query_text.as_str(),
            self.scenario_type.as_str(),
            self.domain.as_str(),
        ];
        fields
            .into_iter()
            .chain(self.cdash_items.iter().map(String::as_str))
            .any(|text| text.to_lowercase().contains(query))
    }
}

impl ParentScenario {
    /// Case-insensitive substring search over the parent and its children.
    /// An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self.child_scenarios.iter().any(|c| c.matches_lowered(&query))
    }
}

/// Normalize a CDASH item list: trimmed, uppercased, unique, `SUBJID` first.
pub fn normalize_cdash_items<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = vec![SUBJECT_ID.to_string()];
    for item in items {
        let item = item.as_ref().trim().to_uppercase();
        if item.is_empty() || out.contains(&item) {
            continue;
        }
        out.push(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdash_items_subjid_first_and_unique() {
        let items = normalize_cdash_items(["aeterm", "SUBJID", " AESEV ", "AETERM", ""]);
        assert_eq!(items, vec!["SUBJID", "AETERM", "AESEV"]);
    }

    #[test]
    fn priority_keeps_unknown_text() {
        assert_eq!(Priority::from("high"), Priority::High);
        assert_eq!(Priority::from(" Critical "), Priority::Other("Critical".to_string()));
        assert_eq!(Priority::from("Critical").as_str(), "Critical");
    }

    #[test]
    fn tag_from_str_accepts_separators() {
        assert_eq!("data_quality".parse::<ScenarioTag>().unwrap(), ScenarioTag::DataQuality);
        assert_eq!("Protocol-Deviation".parse::<ScenarioTag>().unwrap(), ScenarioTag::ProtocolDeviation);
        assert!("Unknown".parse::<ScenarioTag>().is_err());
    }
}
