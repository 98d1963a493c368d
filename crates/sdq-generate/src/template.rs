//! SDQ integration and prompt templates.

use serde_json::json;
use sdq_model::{Domain, ParseResult};
use url::Url;

use crate::error::{GenerateError, Result};

pub const DEFAULT_EDC_BASE_URL: &str = "https://edc.system.com/forms";

/// Endpoint named in the sample outbound call.
pub const QUERY_CREATE_ENDPOINT: &str = "/api/queries/create";

/// Builder for EDC form deep links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdcLink {
    base: Url,
}

impl EdcLink {
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base).map_err(|source| GenerateError::InvalidEdcUrl {
            url: base.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(GenerateError::EdcUrlNotHierarchical(base.to_string()));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `<base>/<domain>?filter=<filter>`, URL-encoded.
    pub fn link(&self, domain: Domain, filter: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&domain.slug());
        }
        url.query_pairs_mut().clear().append_pair("filter", filter);
        url
    }
}

impl Default for EdcLink {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_EDC_BASE_URL).expect("Invalid default EDC URL"),
        }
    }
}

/// Integration template stored on each scenario.
pub fn integration_template(
    edc: &EdcLink,
    name: &str,
    description: &str,
    query_text: &str,
    cdash_items: &[String],
    domain: Domain,
) -> Result<String> {
    let payload = json!({
        "name": name,
        "description": description,
        "domain": domain.as_str(),
        "variables": cdash_items,
        "query_text": query_text,
    });
    Ok(format!(
        "--- SDQ Template for {name} ---\n\n\
         DESCRIPTION:\n{description}\n\n\
         VARIABLES:\n{variables}\n\n\
         QUERY TEXT:\n{query_text}\n\n\
         EDC DEEP LINK:\n{link}\n\n\
         API INTEGRATION:\nPOST {QUERY_CREATE_ENDPOINT}\n{payload}",
        variables = cdash_items.join(", "),
        link = edc.link(domain, &cdash_items.join(",")),
        payload = serde_json::to_string_pretty(&payload)?,
    ))
}

/// Prompt template showing how description, rule, variables and the EDC
/// integration connect.
pub fn prompt_template(
    edc: &EdcLink,
    description: &str,
    parse: &ParseResult,
    query_text: &str,
) -> Result<String> {
    let domain = parse.primary_domain();
    let variables = parse
        .filter_conditions()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let targets: Vec<&str> = parse.filter_conditions().map(|c| c.field.as_str()).collect();
    let link = edc.link(domain, &variables);

    let api_call = json!({
        "domain": domain.as_str(),
        "conditions": variables,
        "query_text": query_text,
        "validation_type": "data_quality",
    });
    let structure = json!({
        "scenario_description": description,
        "validation_rule": query_text,
        "target_variables": targets,
        "domain": domain.as_str(),
        "edc_integration": {
            "deep_link": link.as_str(),
            "api_endpoint": QUERY_CREATE_ENDPOINT,
        },
        "expected_output": "flagged_records_with_inconsistencies",
    });

    let variables = if variables.is_empty() {
        "No specific conditions detected".to_string()
    } else {
        variables
    };
    let query_text = if query_text.is_empty() {
        "Query text will be generated"
    } else {
        query_text
    };

    Ok(format!(
        "--- SDQ (Smart Data Quality) Prompt Template ---\n\n\
         DESCRIPTION:\n{description}\n\n\
         EXTRACTED VARIABLES:\n{variables}\n\n\
         CLINICAL QUERY TEXT:\n{query_text}\n\n\
         EDC DEEP LINK:\n{link}\n\n\
         OUTBOUND API INTEGRATION:\nPOST {QUERY_CREATE_ENDPOINT}\n{api_call}\n\n\
         SDQ PROMPT STRUCTURE:\n{structure}\n\n\
         --- End Template ---",
        api_call = serde_json::to_string_pretty(&api_call)?,
        structure = serde_json::to_string_pretty(&structure)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdq_parse::extract_conditions;

    fn items(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn deep_link_is_encoded() {
        let edc = EdcLink::default();
        let link = edc.link(Domain::DM, "SUBJID,AGE,SEX");
        assert_eq!(
            link.as_str(),
            "https://edc.system.com/forms/dm?filter=SUBJID%2CAGE%2CSEX"
        );
    }

    #[test]
    fn custom_base_keeps_path() {
        let edc = EdcLink::new("https://edc.example.org/study/forms/").unwrap();
        assert_eq!(
            edc.link(Domain::AE, "SUBJID").as_str(),
            "https://edc.example.org/study/forms/ae?filter=SUBJID"
        );
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(matches!(
            EdcLink::new("not a url"),
            Err(GenerateError::InvalidEdcUrl { .. })
        ));
        assert!(matches!(
            EdcLink::new("mailto:qa@example.org"),
            Err(GenerateError::EdcUrlNotHierarchical(_))
        ));
    }

    #[test]
    fn integration_template_sections() {
        let text = integration_template(
            &EdcLink::default(),
            "Elderly males",
            "AGE > 65 and SEX = 'M'",
            "Flag records where AGE > 65 and SEX = 'M'.",
            &items(&["SUBJID", "AGE", "SEX"]),
            Domain::DM,
        )
        .unwrap();
        assert!(text.starts_with("--- SDQ Template for Elderly males ---"));
        assert!(text.contains("VARIABLES:\nSUBJID, AGE, SEX"));
        assert!(text.contains("API INTEGRATION:\nPOST /api/queries/create\n{"));
        assert!(text.contains("\"variables\": [\n    \"SUBJID\","));
        assert!(text.contains("\"query_text\": \"Flag records where AGE > 65 and SEX = 'M'.\""));
    }

    #[test]
    fn prompt_template_without_conditions() {
        let parse = extract_conditions("check everything");
        let text = prompt_template(&EdcLink::default(), "check everything", &parse, "").unwrap();
        assert!(text.contains("EXTRACTED VARIABLES:\nNo specific conditions detected"));
        assert!(text.contains("CLINICAL QUERY TEXT:\nQuery text will be generated"));
        assert!(text.ends_with("--- End Template ---"));
    }
}
