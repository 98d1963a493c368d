//! Condition extraction.

use sdq_model::{Condition, ParseResult};
use tracing::{debug, trace};

use crate::connective::find_connectives;
use crate::fields::{is_null_value, is_reserved, resolve_generic_field};
use crate::rules::{Draft, RULES, RuleCategory};

/// Extraction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Drop a condition when the same `(field, operator, value)` was already
    /// produced by an overlapping match.
    pub dedupe: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { dedupe: true }
    }
}

/// Extract conditions with default options.
pub fn extract_conditions(text: &str) -> ParseResult {
    extract_conditions_with(text, &ParseOptions::default())
}

/// Run the rule battery over `text`.
///
/// Conditions come back sorted by position; the result is deterministic for
/// identical input.
pub fn extract_conditions_with(text: &str, options: &ParseOptions) -> ParseResult {
    let mut accepted: Vec<Condition> = Vec::new();
    let mut claimed: Vec<(usize, usize)> = Vec::new();

    for rule in RULES.iter() {
        let mut matched = 0usize;
        let mut kept = 0usize;
        for caps in rule.pattern.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            matched += 1;
            let Some(draft) = rule.draft(&caps) else {
                continue;
            };
            let Some(condition) = finalize(draft, m.start(), m.as_str()) else {
                trace!(rule = rule.name, raw = m.as_str(), "rejected match");
                continue;
            };

            let (start, end) = (condition.position, condition.end());
            match rule.category {
                RuleCategory::Null => {}
                RuleCategory::Mention => {
                    if accepted.iter().any(|c| c.overlaps(&condition)) {
                        continue;
                    }
                }
                _ => {
                    if claimed.iter().any(|&(s, e)| start < e && s < end) {
                        trace!(rule = rule.name, raw = m.as_str(), "span claimed by null check");
                        continue;
                    }
                }
            }
            if options.dedupe
                && accepted
                    .iter()
                    .any(|c| c.same_clause(&condition) && c.overlaps(&condition))
            {
                continue;
            }
            if rule.category == RuleCategory::Null {
                claimed.push((start, end));
            }
            accepted.push(condition);
            kept += 1;
        }
        if matched > 0 {
            debug!(
                rule = rule.name,
                category = rule.category.as_str(),
                matched,
                kept,
                "rule matched"
            );
        }
    }

    accepted.sort_by_key(|c| c.position);
    ParseResult::new(accepted, find_connectives(text))
}

/// Validate and normalize a draft into a condition.
fn finalize(draft: Draft, position: usize, raw: &str) -> Option<Condition> {
    let field = if draft.generic {
        resolve_generic_field(&draft.field)?
    } else {
        draft.field.trim().to_ascii_uppercase()
    };
    if field.is_empty() || is_reserved(&field) {
        return None;
    }

    let value = clean_value(&draft.value);
    if draft.operator.is_unary() {
        if !value.is_empty() {
            return None;
        }
    } else if draft.operator.is_filter() && (value.is_empty() || is_null_value(&value)) {
        return None;
    }

    let condition = Condition::new(field, draft.operator, value, position, raw);
    Some(match draft.test {
        Some(test) => condition.with_test(test),
        None => condition,
    })
}

fn clean_value(value: &str) -> String {
    value.trim().replace(['\'', '"'], "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdq_model::Operator;

    fn clauses(text: &str) -> Vec<(String, Operator, String)> {
        extract_conditions(text)
            .conditions
            .into_iter()
            .map(|c| (c.field, c.operator, c.value))
            .collect()
    }

    fn clause(field: &str, operator: Operator, value: &str) -> (String, Operator, String) {
        (field.to_string(), operator, value.to_string())
    }

    #[test]
    fn age_and_sex() {
        assert_eq!(
            clauses("AGE > 65 and SEX = 'M'"),
            vec![clause("AGE", Operator::Gt, "65"), clause("SEX", Operator::Eq, "M")]
        );
    }

    #[test]
    fn eq_null_never_yields_literal_null() {
        assert_eq!(clauses("AEOUT = NULL"), vec![clause("AEOUT", Operator::IsNull, "")]);
        assert_eq!(
            clauses("AEOUT IS NOT NULL"),
            vec![clause("AEOUT", Operator::IsNotNull, "")]
        );
    }

    #[test]
    fn placeholder_alone_yields_nothing() {
        assert!(extract_conditions("check for missing data").is_empty());
    }

    #[test]
    fn dedupe_can_be_disabled() {
        let options = ParseOptions { dedupe: false };
        let result = extract_conditions_with("AGE > 65", &options);
        assert_eq!(result.conditions.len(), 2);
        assert!(result.conditions.iter().all(|c| c.field == "AGE"));
        assert_eq!(extract_conditions("AGE > 65").conditions.len(), 1);
    }

    #[test]
    fn mentions_do_not_duplicate_matched_fields() {
        let result = extract_conditions("AESTDTC is missing; review AETERM");
        let ops: Vec<_> = result
            .conditions
            .iter()
            .map(|c| (c.field.as_str(), c.operator))
            .collect();
        assert_eq!(
            ops,
            vec![("AESTDTC", Operator::IsNull), ("AETERM", Operator::Mentioned)]
        );
    }

    #[test]
    fn test_qualified_vitals() {
        let result = extract_conditions("SYSBP > 140 or DIABP > 90");
        let tests: Vec<_> = result.conditions.iter().map(|c| c.test.clone()).collect();
        assert_eq!(
            tests,
            vec![Some("SYSBP".to_string()), Some("DIABP".to_string())]
        );
        assert!(result.conditions.iter().all(|c| c.field == "VSORRES"));
    }

    #[test]
    fn quotes_are_stripped() {
        assert_eq!(
            clauses("ARMCD != \"SCRNFAIL\""),
            vec![clause("ARMCD", Operator::Ne, "SCRNFAIL")]
        );
    }
}
