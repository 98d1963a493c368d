//! Error types for DRP ingestion and exports.

use std::fmt;

use thiserror::Error;

use crate::header::{HeaderCategory, HeaderSuggestion};

/// Errors that stop a whole file from being ingested or exported.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    /// No header line, or a header with no data rows.
    #[error("DRP file is empty: {reason}")]
    EmptyInput { reason: &'static str },

    /// Required header categories are missing.
    #[error("{}", format_error_message(.missing, .found_headers, .name_patterns, .description_patterns))]
    Format {
        missing: Vec<HeaderCategory>,
        found_headers: Vec<String>,
        name_patterns: Vec<&'static str>,
        description_patterns: Vec<&'static str>,
        suggestions: Vec<HeaderSuggestion>,
    },

    #[error("failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV export is not valid UTF-8: {0}")]
    CsvEncoding(#[from] std::string::FromUtf8Error),

    #[error("failed to serialize scenario package: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to build integration template: {0}")]
    Template(#[from] sdq_generate::GenerateError),
}

fn format_error_message(
    missing: &[HeaderCategory],
    found: &[String],
    name_patterns: &[&str],
    description_patterns: &[&str],
) -> String {
    let mut message = String::from("invalid DRP header:");
    for category in missing {
        let patterns = match category {
            HeaderCategory::Name => name_patterns,
            HeaderCategory::Description => description_patterns,
        };
        message.push_str(&format!(
            " no {category} column found (expected a header containing: {});",
            patterns.join(", ")
        ));
    }
    message.push_str(&format!(" found headers: {}", found.join(", ")));
    message
}

impl IngestError {
    /// Hint shown to the user alongside the error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            IngestError::EmptyInput { .. } => {
                Some("Ensure the CSV has a header row followed by at least one data row".to_string())
            }
            IngestError::Format { suggestions, .. } if !suggestions.is_empty() => Some(format!(
                "Did you mean: {}",
                suggestions
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            )),
            IngestError::Format { .. } => Some(
                "Common column names: Check Name, Rule Name, Description, Details".to_string(),
            ),
            _ => None,
        }
    }
}

/// A data row that produced no scenario, or produced one with substitutions.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RowIssue {
    /// 1-based data row number (the header is row 0).
    pub row: usize,
    pub kind: RowIssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum RowIssueKind {
    /// Neither a name nor a description; the row was skipped.
    MissingNameAndDescription,
    /// Name derived from the description.
    DerivedName(String),
    /// Description copied from the name.
    DescriptionFromName,
    /// Domain column value is not a known domain; the parsed domain was used.
    UnknownDomain(String),
    /// Nothing could be extracted; keyword fallback generation was used.
    FallbackGeneration,
}

impl RowIssue {
    pub fn is_skip(&self) -> bool {
        matches!(self.kind, RowIssueKind::MissingNameAndDescription)
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RowIssueKind::MissingNameAndDescription => {
                write!(f, "row {}: skipped, no name or description", self.row)
            }
            RowIssueKind::DerivedName(name) => {
                write!(f, "row {}: no name, derived '{name}' from description", self.row)
            }
            RowIssueKind::DescriptionFromName => {
                write!(f, "row {}: no description, using the name", self.row)
            }
            RowIssueKind::UnknownDomain(raw) => {
                write!(f, "row {}: unknown domain '{raw}', using parsed domain", self.row)
            }
            RowIssueKind::FallbackGeneration => {
                write!(f, "row {}: no conditions recognised, used keyword fallback", self.row)
            }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_lists_both_categories() {
        let err = IngestError::Format {
            missing: vec![HeaderCategory::Name, HeaderCategory::Description],
            found_headers: vec!["Foo".to_string(), "Bar".to_string()],
            name_patterns: vec!["check", "name"],
            description_patterns: vec!["description"],
            suggestions: Vec::new(),
        };
        assert_eq!(
            err.to_string(),
            "invalid DRP header: no name column found (expected a header containing: check, name); \
             no description column found (expected a header containing: description); \
             found headers: Foo, Bar"
        );
        assert!(err.suggestion().unwrap().starts_with("Common column names"));
    }

    #[test]
    fn row_issue_display() {
        let issue = RowIssue {
            row: 3,
            kind: RowIssueKind::MissingNameAndDescription,
        };
        assert!(issue.is_skip());
        assert_eq!(issue.to_string(), "row 3: skipped, no name or description");
    }
}
