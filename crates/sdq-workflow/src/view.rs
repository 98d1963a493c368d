//! Display-ready rows for scenario tables.

use sdq_model::Scenario;
use serde::Serialize;

/// Characters of query text shown in a table cell.
pub const QUERY_PREVIEW_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    Role,
    Type,
    Domain,
    Priority,
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub kind: BadgeKind,
    pub label: String,
}

impl Badge {
    fn new(kind: BadgeKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }
}

/// One scenario row: plain strings, no rendering concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioView {
    pub id: String,
    pub name: String,
    /// `Parent` or `Child`.
    pub role: &'static str,
    pub badges: Vec<Badge>,
    pub query_preview: String,
    /// Full query text, for a tooltip.
    pub query_text: String,
}

impl ScenarioView {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let role = if scenario.is_parent { "Parent" } else { "Child" };
        let mut badges = vec![
            Badge::new(BadgeKind::Role, role),
            Badge::new(BadgeKind::Type, scenario.scenario_type.as_str()),
            Badge::new(BadgeKind::Domain, scenario.domain.as_str()),
            Badge::new(BadgeKind::Priority, scenario.priority.as_str()),
        ];
        badges.extend(
            scenario
                .cdash_items
                .iter()
                .map(|item| Badge::new(BadgeKind::Item, item.as_str())),
        );

        Self {
            id: scenario.id.clone(),
            name: scenario.name.clone(),
            role,
            badges,
            query_preview: truncate(&scenario.query_text, QUERY_PREVIEW_CHARS),
            query_text: scenario.query_text.clone(),
        }
    }
}

/// Cut `text` to `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}
