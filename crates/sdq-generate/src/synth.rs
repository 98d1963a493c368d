//! Query text and filter code for a parsed description.

use serde::{Deserialize, Serialize};
use sdq_model::{Condition, Domain, ParseResult, normalize_cdash_items};
use sdq_parse::attribute_joins;
use tracing::debug;

use crate::cdash::cdash_items;
use crate::code::{filter_expression, frame_params, function_name, render_function, term};
use crate::phrase::clause;
use crate::shape::{Shape, ShapeKind};

/// Maximum length of a query sentence, in characters.
pub const QUERY_TEXT_LIMIT: usize = 300;

/// Generated text and code for one description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synthesis {
    pub query_text: String,
    pub code: String,
    pub cdash_items: Vec<String>,
    pub function_name: String,
    pub shape: Option<ShapeKind>,
    /// False when `query_text` equals the previously displayed text.
    pub changed: bool,
}

/// Fixed sentence used when generated text would exceed the limit.
pub fn fallback_sentence(domain: Domain) -> String {
    format!(
        "{} validation: check specified conditions for data quality.",
        domain.display_name()
    )
}

/// Replace over-long text with the domain fallback; never truncates.
pub fn bound_query_text(text: String, domain: Domain) -> String {
    let length = text.chars().count();
    if length > QUERY_TEXT_LIMIT {
        debug!(length, limit = QUERY_TEXT_LIMIT, "query text over limit, using fallback sentence");
        fallback_sentence(domain)
    } else {
        text
    }
}

/// Build query text, code and CDASH items from a parse.
///
/// Returns `None` when the parse holds no filter conditions; callers then
/// ask the backend and fall back to [`crate::fallback_generation`].
pub fn synthesize(parse: &ParseResult, previous_text: Option<&str>) -> Option<Synthesis> {
    let conditions: Vec<&Condition> = parse.filter_conditions().collect();
    if conditions.is_empty() {
        return None;
    }

    let shape = Shape::detect(parse);
    let domain = shape
        .as_ref()
        .map_or_else(|| parse.primary_domain(), Shape::domain);
    let function_name = function_name(domain);

    let mut items = cdash_items(parse);
    if let Some(shape) = &shape {
        let extras = shape.extra_items().iter().copied();
        items = normalize_cdash_items(items.iter().map(String::as_str).chain(extras));
    }

    let (text, code) = match &shape {
        Some(shape) => {
            let extras = shape.extras(parse);
            (
                shape.query_text(&extras),
                shape.code(&function_name, &items, &extras),
            )
        }
        None => {
            let joins = attribute_joins(&conditions, &parse.logical_operators);
            let text = format!("Flag records where {}.", clause(&conditions, &joins));
            let terms: Vec<String> = conditions.iter().filter_map(|c| term(c, domain)).collect();
            let params = frame_params(&conditions, domain);
            let doc = bound_query_text(text.clone(), domain);
            let code = render_function(
                &function_name,
                &params,
                &doc,
                &filter_expression(&terms, &joins),
                &items,
            );
            (text, code)
        }
    };

    let query_text = bound_query_text(text, domain);
    let changed = previous_text != Some(query_text.as_str());
    debug!(
        conditions = conditions.len(),
        domain = %domain,
        shape = shape.as_ref().map(|s| s.kind().as_str()),
        changed,
        "synthesized query"
    );

    Some(Synthesis {
        query_text,
        code,
        cdash_items: items,
        function_name,
        shape: shape.map(|s| s.kind()),
        changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdq_parse::extract_conditions;

    #[test]
    fn empty_parse_yields_nothing() {
        assert!(synthesize(&extract_conditions("nothing to see"), None).is_none());
    }

    #[test]
    fn mentions_alone_yield_nothing() {
        assert!(synthesize(&extract_conditions("review AETERM"), None).is_none());
    }

    #[test]
    fn changed_tracks_previous_text() {
        let parse = extract_conditions("AGE > 65");
        let first = synthesize(&parse, None).unwrap();
        assert!(first.changed);
        let second = synthesize(&parse, Some(&first.query_text)).unwrap();
        assert!(!second.changed);
    }

    #[test]
    fn overlong_text_uses_domain_fallback() {
        let text = (0..30)
            .map(|i| format!("LBVAR{i} = 'VALUE{i}'"))
            .collect::<Vec<_>>()
            .join(" and ");
        let synthesis = synthesize(&extract_conditions(&text), None).unwrap();
        assert_eq!(
            synthesis.query_text,
            "Laboratory validation: check specified conditions for data quality."
        );
    }
}
