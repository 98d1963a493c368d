//! DRP rows to scenarios.

use sdq_generate::{EdcLink, integration_template, local_generation, suggest_scenario_name};
use sdq_model::{Domain, Priority, Scenario, normalize_cdash_items};
use sdq_parse::ParseOptions;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::columns::{
    CDASH_COLUMNS, DEFAULT_TYPE, DESCRIPTION_COLUMNS, DOMAIN_COLUMNS, NAME_COLUMNS, PARENT_TYPE,
    PRIORITY_COLUMNS, QUERY_TEXT_COLUMNS, TYPE_COLUMNS, split_items,
};
use crate::error::{Result, RowIssue, RowIssueKind};
use crate::header::validate_headers;
use crate::table::{DrpRow, DrpTable, parse_table};

/// Ingestion settings.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub parse: ParseOptions,
    pub edc: EdcLink,
}

/// Everything produced from one DRP file.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub table: DrpTable,
    pub scenarios: Vec<Scenario>,
    /// Skipped rows and per-row substitutions.
    pub issues: Vec<RowIssue>,
}

impl IngestOutcome {
    pub fn skipped(&self) -> usize {
        self.issues.iter().filter(|i| i.is_skip()).count()
    }
}

/// Ingest DRP CSV text with default options.
pub fn ingest(text: &str) -> Result<IngestOutcome> {
    ingest_with(text, &IngestOptions::default())
}

pub fn ingest_with(text: &str, options: &IngestOptions) -> Result<IngestOutcome> {
    let table = parse_table(text)?;
    validate_headers(&table.headers)?;

    let mut scenarios = Vec::new();
    let mut issues = Vec::new();
    for row in &table.rows {
        let id = format!("drp_{}", scenarios.len() + 1);
        if let Some(scenario) = scenario_from_row(row, id, options, &mut issues)? {
            scenarios.push(scenario);
        }
    }

    let outcome = IngestOutcome {
        table,
        scenarios,
        issues,
    };
    info!(
        rows = outcome.table.len(),
        scenarios = outcome.scenarios.len(),
        skipped = outcome.skipped(),
        parents = outcome.scenarios.iter().filter(|s| s.is_parent).count(),
        "DRP ingested"
    );
    Ok(outcome)
}

fn scenario_from_row(
    row: &DrpRow,
    id: String,
    options: &IngestOptions,
    issues: &mut Vec<RowIssue>,
) -> Result<Option<Scenario>> {
    let mut issue = |kind: RowIssueKind| {
        issues.push(RowIssue {
            row: row.number,
            kind,
        });
    };

    let name = row.first_of(NAME_COLUMNS).map(str::to_string);
    let description = row.first_of(DESCRIPTION_COLUMNS).map(str::to_string);
    let (name, description) = match (name, description) {
        (Some(name), Some(description)) => (name, description),
        (None, Some(description)) => {
            let name = suggest_scenario_name(&description);
            issue(RowIssueKind::DerivedName(name.clone()));
            (name, description)
        }
        (Some(name), None) => {
            issue(RowIssueKind::DescriptionFromName);
            let description = name.clone();
            (name, description)
        }
        (None, None) => {
            warn!(row = row.number, "skipping DRP row without name or description");
            issue(RowIssueKind::MissingNameAndDescription);
            return Ok(None);
        }
    };

    let (parse, synthesis) = local_generation(&description, &options.parse, None);
    if parse.filter_conditions().next().is_none() {
        issue(RowIssueKind::FallbackGeneration);
    }

    let domain = match row.first_of(DOMAIN_COLUMNS) {
        Some(raw) => raw.parse::<Domain>().unwrap_or_else(|_| {
            warn!(row = row.number, domain = raw, "unknown domain in DRP row");
            issue(RowIssueKind::UnknownDomain(raw.to_string()));
            parse.primary_domain()
        }),
        None => parse.primary_domain(),
    };
    let priority = row.first_of(PRIORITY_COLUMNS).map(Priority::from).unwrap_or_default();
    let scenario_type = row.first_of(TYPE_COLUMNS).unwrap_or(DEFAULT_TYPE).to_string();
    let is_parent = priority.is_high() || scenario_type.eq_ignore_ascii_case(PARENT_TYPE);

    let query_text = row
        .first_of(QUERY_TEXT_COLUMNS)
        .map_or(synthesis.query_text, str::to_string);
    let cdash_items = match row.first_of(CDASH_COLUMNS) {
        Some(cell) => normalize_cdash_items(split_items(cell)),
        None => synthesis.cdash_items,
    };
    let template = integration_template(
        &options.edc,
        &name,
        &description,
        &query_text,
        &cdash_items,
        domain,
    )?;

    debug!(row = row.number, id = %id, domain = %domain, is_parent, "DRP row converted");
    Ok(Some(Scenario {
        id,
        name,
        description,
        domain,
        priority,
        scenario_type,
        is_parent,
        query_text,
        code: synthesis.code,
        cdash_items,
        template,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;

    #[test]
    fn builds_scenarios_from_rows() {
        let outcome = ingest(
            "Check Name,Description,Priority\n\
             Elderly males,\"AGE > 65 and SEX = 'M'\",High\n\
             Outcome,AEOUT is missing,Low\n",
        )
        .unwrap();
        assert_eq!(outcome.scenarios.len(), 2);

        let first = &outcome.scenarios[0];
        assert_eq!(first.id, "drp_1");
        assert_eq!(first.domain, Domain::DM);
        assert!(first.is_parent);
        assert_eq!(first.scenario_type, "Safety");
        assert_eq!(first.query_text, "Flag records where AGE > 65 and SEX = 'M'.");
        assert_eq!(first.cdash_items, vec!["SUBJID", "AGE", "SEX"]);
        assert!(first.template.starts_with("--- SDQ Template for Elderly males ---"));

        let second = &outcome.scenarios[1];
        assert_eq!(second.id, "drp_2");
        assert_eq!(second.domain, Domain::AE);
        assert!(!second.is_parent);
        assert_eq!(second.priority, Priority::Low);
    }

    #[test]
    fn supplied_columns_are_used_verbatim() {
        let outcome = ingest(
            "Rule Name,Rule Description,Domain,Type,Query Text,CDASH Items\n\
             R1,AGE > 65,LB,Parent,Custom text.,\"aeterm, SUBJID, AETERM\"\n",
        )
        .unwrap();
        let scenario = &outcome.scenarios[0];
        assert_eq!(scenario.domain, Domain::LB);
        assert!(scenario.is_parent);
        assert_eq!(scenario.query_text, "Custom text.");
        assert_eq!(scenario.cdash_items, vec!["SUBJID", "AETERM"]);
    }

    #[test]
    fn rows_without_name_or_description() {
        let outcome = ingest(
            "Check Name,Description,Domain\n\
             ,,AE\n\
             ,Serious adverse events missing outcome,\n\
             Only a name,,\n",
        )
        .unwrap();
        assert_eq!(outcome.skipped(), 1);
        assert_eq!(outcome.scenarios.len(), 2);
        assert_eq!(outcome.scenarios[0].id, "drp_1");
        assert_eq!(outcome.scenarios[0].name, "AE Outcome and Action Inconsistencies");
        assert_eq!(outcome.scenarios[1].description, "Only a name");
        assert!(outcome.issues.contains(&RowIssue {
            row: 3,
            kind: RowIssueKind::DescriptionFromName,
        }));
    }

    #[test]
    fn unknown_domain_is_reported() {
        let outcome = ingest("Name,Description,Domain\nX,AGE > 65,ZZ\n").unwrap();
        assert_eq!(outcome.scenarios[0].domain, Domain::DM);
        assert!(
            outcome
                .issues
                .iter()
                .any(|i| matches!(&i.kind, RowIssueKind::UnknownDomain(raw) if raw == "ZZ"))
        );
    }

    #[test]
    fn rejects_bad_headers() {
        assert!(matches!(ingest("Foo,Bar\n1,2\n"), Err(IngestError::Format { .. })));
        assert!(matches!(ingest(""), Err(IngestError::EmptyInput { .. })));
    }
}
