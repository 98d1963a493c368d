//! Keyword-driven generation used when nothing could be extracted and the
//! backend is unavailable.

use sdq_model::{Domain, ParseResult, normalize_cdash_items};
use sdq_parse::{ParseOptions, extract_conditions_with};
use tracing::warn;

use crate::code::{quote, render_function};
use crate::synth::{Synthesis, bound_query_text, synthesize};

/// Longest docstring excerpt of the description, in characters.
const DOC_EXCERPT: usize = 80;
/// Longest description-derived function name suffix.
const NAME_SUFFIX: usize = 30;

fn has_word(upper: &str, word: &str) -> bool {
    upper
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .any(|token| token == word)
}

fn fallback_domain(upper: &str) -> Domain {
    if upper.contains("VITAL") || has_word(upper, "BP") {
        Domain::VS
    } else if upper.contains("LAB") || upper.contains("CREATININE") {
        Domain::LB
    } else if upper.contains("CONMED") || upper.contains("CMTRT") {
        Domain::CM
    } else if upper.contains("DEMOGRAPHIC") {
        Domain::DM
    } else {
        Domain::AE
    }
}

fn fallback_function_name(description: &str) -> String {
    let cleaned: String = description
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    let suffix: String = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .take(NAME_SUFFIX)
        .collect();
    let suffix = suffix.trim_end_matches('_');
    if suffix.is_empty() {
        "check_validation".to_string()
    } else {
        format!("check_{suffix}")
    }
}

/// Themes picked up from the description, in display order.
fn themes(upper: &str) -> Vec<&'static str> {
    let mut parts = Vec::new();
    if upper.contains("SERIOUS") {
        parts.push("serious adverse events");
    }
    if upper.contains("MISSING") || upper.contains("NULL") {
        parts.push("missing or incomplete data");
    }
    if upper.contains("MULTIPLE") || upper.contains("MORE THAN ONCE") {
        parts.push("subjects with multiple occurrences of the same event");
    }
    if upper.contains("AGE") && upper.contains('>') {
        parts.push("elderly subjects");
    } else if upper.contains("AGE") && upper.contains('<') {
        parts.push("younger subjects");
    }
    if upper.contains("VITAL") || has_word(upper, "BP") {
        parts.push("vital signs abnormalities");
    }
    if upper.contains("LAB") || upper.contains("CREATININE") {
        parts.push("laboratory value anomalies");
    }
    if upper.contains("SEX") || upper.contains("GENDER") {
        parts.push("gender-specific issues");
    }
    if upper.contains("SEVERE") {
        parts.push("severe events");
    }
    parts
}

fn fallback_query_text(upper: &str, domain: Domain) -> String {
    let parts = themes(upper);
    if parts.is_empty() {
        return format!(
            "Review {} data for validation rule compliance and flag inconsistencies.",
            domain.display_name()
        );
    }
    let text = if upper.contains("SERIOUS") && upper.contains("MISSING") {
        "AESER = 'Y' but AEACN is blank or missing, verify serious AE has documented action."
            .to_string()
    } else if upper.contains("SEVERE") && upper.contains("GRADE") {
        "AESEV is marked as 'Severe', ensure the CTCAE_GRADE is 3 or higher. Flag where the grade is <3."
            .to_string()
    } else if upper.contains("CTCAE_GRADE") && (upper.contains('4') || upper.contains('5')) {
        "For AE records with CTCAE_GRADE = 4 or 5, check AEACN is 'None' or missing.".to_string()
    } else if upper.contains("VITAL") || has_word(upper, "BP") {
        "Vital signs recorded outside normal range, verify values and ensure proper flagging of abnormal results."
            .to_string()
    } else if upper.contains("LAB") || upper.contains("CREATININE") {
        "Laboratory values missing baseline measurements, check required pre-treatment labs are documented."
            .to_string()
    } else {
        format!(
            "{} data validation: {} - verify data consistency and completeness.",
            domain.display_name(),
            parts.join(" and ")
        )
    };
    bound_query_text(text, domain)
}

/// Selected columns and filter terms recognised from keywords.
fn fallback_filter(upper: &str) -> (Vec<&'static str>, Vec<String>) {
    let mut columns = Vec::new();
    let mut terms = Vec::new();

    if upper.contains("AETERM") {
        columns.push("AETERM");
        if upper.contains("SAME") && (upper.contains("MULTIPLE") || upper.contains("MORE THAN ONCE")) {
            terms.push("df.duplicated(subset=['SUBJID', 'AETERM'], keep=False)".to_string());
        }
    }
    if upper.contains("AESTDTC") || upper.contains("START DATE") {
        columns.push("AESTDTC");
    }
    if upper.contains("AESER") {
        columns.push("AESER");
        if upper.contains("SERIOUS") {
            terms.push("(df['AESER'] == 'Y')".to_string());
        }
    }
    if (upper.contains("MISSING") || upper.contains("NULL"))
        && let Some(last) = columns.last()
    {
        terms.push(format!("df[{}].isnull()", quote(last)));
    }
    (columns, terms)
}

/// Local query text and filter function from description keywords alone.
pub fn fallback_generation(description: &str) -> Synthesis {
    let upper = description.to_uppercase();
    let domain = fallback_domain(&upper);
    let query_text = fallback_query_text(&upper, domain);

    let (columns, mut terms) = fallback_filter(&upper);
    if terms.is_empty() {
        terms.push("df['SUBJID'].notnull()".to_string());
    }
    let cdash_items = normalize_cdash_items(columns);
    let function_name = fallback_function_name(description);
    let doc: String = description.chars().take(DOC_EXCERPT).collect();
    let code = render_function(
        &function_name,
        &["df".to_string()],
        &doc,
        &terms.join(" &\n        "),
        &cdash_items,
    );
    warn!(domain = %domain, "using local keyword fallback for generation");

    Synthesis {
        query_text,
        code,
        cdash_items,
        function_name,
        shape: None,
        changed: true,
    }
}

/// Extract and synthesize locally, falling back to keyword generation when
/// no condition is recognised.
pub fn local_generation(
    description: &str,
    options: &ParseOptions,
    previous_text: Option<&str>,
) -> (ParseResult, Synthesis) {
    let parse = extract_conditions_with(description, options);
    let synthesis = synthesize(&parse, previous_text).unwrap_or_else(|| {
        let mut fallback = fallback_generation(description);
        fallback.changed = previous_text != Some(fallback.query_text.as_str());
        fallback
    });
    (parse, synthesis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serious_missing_action() {
        let result = fallback_generation("Serious events where AESER is set but action missing");
        assert_eq!(
            result.query_text,
            "AESER = 'Y' but AEACN is blank or missing, verify serious AE has documented action."
        );
        assert_eq!(result.cdash_items, vec!["SUBJID", "AESER"]);
        assert!(result.code.contains("(df['AESER'] == 'Y') &\n        df['AESER'].isnull()"));
    }

    #[test]
    fn nothing_recognised() {
        let result = fallback_generation("please look at this");
        assert_eq!(
            result.query_text,
            "Review Adverse Events data for validation rule compliance and flag inconsistencies."
        );
        assert_eq!(result.function_name, "check_please_look_at_this");
        assert!(result.code.contains("df['SUBJID'].notnull()"));
        assert_eq!(result.cdash_items, vec!["SUBJID"]);
    }

    #[test]
    fn vitals_domain_and_text() {
        let result = fallback_generation("Check BP readings");
        assert!(result.query_text.starts_with("Vital signs recorded outside normal range"));
    }

    #[test]
    fn generic_themes() {
        let result = fallback_generation("subjects by gender");
        assert_eq!(
            result.query_text,
            "Adverse Events data validation: gender-specific issues - verify data consistency and completeness."
        );
    }

    #[test]
    fn duplicate_terms() {
        let result = fallback_generation("same AETERM reported more than once");
        assert!(result.code.contains("df.duplicated(subset=['SUBJID', 'AETERM'], keep=False)"));
        assert_eq!(result.cdash_items, vec!["SUBJID", "AETERM"]);
    }

    #[test]
    fn local_generation_prefers_extracted_conditions() {
        let options = ParseOptions::default();
        let (parse, synthesis) = local_generation("AGE > 65", &options, None);
        assert_eq!(parse.conditions.len(), 1);
        assert_eq!(synthesis.query_text, "Flag records where AGE > 65.");

        let (parse, synthesis) = local_generation("please look at this", &options, None);
        assert!(parse.is_empty());
        assert!(synthesis.query_text.starts_with("Review Adverse Events data"));
    }

    #[test]
    fn long_names_are_cut() {
        assert_eq!(
            fallback_function_name("An extremely long description of a check!"),
            "check_an_extremely_long_description"
        );
    }
}
