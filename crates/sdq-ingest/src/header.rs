//! DRP header normalization and validation.

use std::fmt;

use rapidfuzz::distance::jaro_winkler;
use serde::Serialize;

use crate::error::{IngestError, Result};

/// A header naming the check contains one of these.
pub const NAME_PATTERNS: &[&str] = &[
    "check",
    "name",
    "rule",
    "scenario",
    "test",
    "validation",
    "category",
];

/// A header holding the rule description contains one of these.
pub const DESCRIPTION_PATTERNS: &[&str] = &["description", "detail", "text", "rule", "query"];

/// Canonical headers offered as corrections for near-miss column names.
const NAME_CANONICAL: &[&str] = &["Check Name", "Rule Name", "Scenario Name", "Name"];
const DESCRIPTION_CANONICAL: &[&str] = &["Description", "Rule Description", "Details", "Rule Text"];

/// Minimum Jaro-Winkler similarity for a header suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;
const MAX_SUGGESTIONS: usize = 3;

/// Lowercase, separators to spaces, whitespace collapsed.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', '-', '.', '/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HeaderCategory {
    Name,
    Description,
}

impl HeaderCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderCategory::Name => "name",
            HeaderCategory::Description => "description",
        }
    }

    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            HeaderCategory::Name => NAME_PATTERNS,
            HeaderCategory::Description => DESCRIPTION_PATTERNS,
        }
    }

    fn canonical(&self) -> &'static [&'static str] {
        match self {
            HeaderCategory::Name => NAME_CANONICAL,
            HeaderCategory::Description => DESCRIPTION_CANONICAL,
        }
    }

    /// Whether a (normalized) header satisfies this category.
    pub fn accepts(&self, header: &str) -> bool {
        let header = normalize_header(header);
        self.patterns().iter().any(|p| header.contains(p))
    }
}

impl fmt::Display for HeaderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A found header that closely resembles an accepted one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderSuggestion {
    pub category: HeaderCategory,
    pub found: String,
    pub expected: &'static str,
    pub score: f64,
}

impl fmt::Display for HeaderSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rename '{}' to '{}' ({:.0}% similar)",
            self.found,
            self.expected,
            self.score * 100.0
        )
    }
}

/// Closest canonical headers for each missing category, best first.
pub fn suggest_headers(headers: &[String], missing: &[HeaderCategory]) -> Vec<HeaderSuggestion> {
    let mut suggestions = Vec::new();
    for &category in missing {
        for header in headers {
            let normalized = normalize_header(header);
            let best = category
                .canonical()
                .iter()
                .map(|expected| {
                    let score = jaro_winkler::similarity(
                        normalized.chars(),
                        normalize_header(expected).chars(),
                    );
                    (*expected, score)
                })
                .max_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((expected, score)) = best
                && score >= SUGGESTION_THRESHOLD
            {
                suggestions.push(HeaderSuggestion {
                    category,
                    found: header.clone(),
                    expected,
                    score,
                });
            }
        }
    }
    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// Require at least one name-like and one description-like header.
pub fn validate_headers(headers: &[String]) -> Result<()> {
    let missing: Vec<HeaderCategory> = [HeaderCategory::Name, HeaderCategory::Description]
        .into_iter()
        .filter(|category| !headers.iter().any(|h| category.accepts(h)))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    tracing::warn!(
        missing = ?missing,
        headers = ?headers,
        "DRP header validation failed"
    );
    Err(IngestError::Format {
        suggestions: suggest_headers(headers, &missing),
        missing,
        found_headers: headers.to_vec(),
        name_patterns: NAME_PATTERNS.to_vec(),
        description_patterns: DESCRIPTION_PATTERNS.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Check_Name "), "check name");
        assert_eq!(normalize_header("Query-Text"), "query text");
    }

    #[test]
    fn accepts_common_headers() {
        assert!(validate_headers(&headers(&["Check Name", "Description"])).is_ok());
        // "Rule" alone covers both categories.
        assert!(validate_headers(&headers(&["Rule"])).is_ok());
    }

    #[test]
    fn reports_every_missing_category() {
        let err = validate_headers(&headers(&["Foo", "Bar"])).unwrap_err();
        match err {
            IngestError::Format {
                missing,
                found_headers,
                ..
            } => {
                assert_eq!(missing, vec![HeaderCategory::Name, HeaderCategory::Description]);
                assert_eq!(found_headers, vec!["Foo", "Bar"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn suggests_near_misses() {
        let err = validate_headers(&headers(&["Check Name", "Descripton"])).unwrap_err();
        let IngestError::Format {
            missing,
            suggestions,
            ..
        } = err
        else {
            panic!("expected a format error");
        };
        assert_eq!(missing, vec![HeaderCategory::Description]);
        assert_eq!(suggestions[0].found, "Descripton");
        assert_eq!(suggestions[0].expected, "Description");
        assert!(suggestions[0].score > 0.9);
    }
}
