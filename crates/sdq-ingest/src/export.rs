//! CSV and JSON exports of scenario collections.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sdq_model::Scenario;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Export columns, in order. The ingest synonyms accept every one of them.
pub const EXPORT_HEADERS: [&str; 8] = [
    "Check Name",
    "Description",
    "Domain",
    "Priority",
    "Type",
    "Query Text",
    "Python Code",
    "CDASH Items",
];

/// Write scenarios as CSV text.
pub fn export_csv(scenarios: &[Scenario]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;
    for scenario in scenarios {
        let items = scenario.cdash_items.join(", ");
        writer.write_record([
            scenario.name.as_str(),
            scenario.description.as_str(),
            scenario.domain.as_str(),
            scenario.priority.as_str(),
            scenario.scenario_type.as_str(),
            scenario.query_text.as_str(),
            scenario.code.as_str(),
            items.as_str(),
        ])?;
    }
    let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    info!(scenarios = scenarios.len(), "exported scenarios to CSV");
    Ok(String::from_utf8(bytes)?)
}

/// Summary block of an exported package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub generated_at: DateTime<Utc>,
    pub total_scenarios: usize,
    /// Distinct domain codes, sorted.
    pub domains: Vec<String>,
    /// Distinct type values, sorted.
    pub types: Vec<String>,
}

/// Scenario package exported as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdqPackage {
    pub metadata: PackageMetadata,
    pub scenarios: Vec<Scenario>,
}

impl SdqPackage {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Package scenarios, stamped with the current time.
pub fn build_package(scenarios: &[Scenario]) -> SdqPackage {
    build_package_at(scenarios, Utc::now())
}

pub fn build_package_at(scenarios: &[Scenario], generated_at: DateTime<Utc>) -> SdqPackage {
    let domains: BTreeSet<String> = scenarios
        .iter()
        .map(|s| s.domain.as_str().to_string())
        .collect();
    let types: BTreeSet<String> = scenarios.iter().map(|s| s.scenario_type.clone()).collect();
    SdqPackage {
        metadata: PackageMetadata {
            generated_at,
            total_scenarios: scenarios.len(),
            domains: domains.into_iter().collect(),
            types: types.into_iter().collect(),
        },
        scenarios: scenarios.to_vec(),
    }
}
