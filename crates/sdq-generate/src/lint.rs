//! Structural checks on edited filter code. Findings are advisory.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationWarning {
    Empty,
    MissingFunction,
    MissingReturn,
    NoDataFrameOps,
    UnbalancedParentheses,
    UnbalancedBrackets,
}

impl ValidationWarning {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationWarning::Empty => "No code to validate",
            ValidationWarning::MissingFunction => "Missing function definition (def)",
            ValidationWarning::MissingReturn => "Missing return statement",
            ValidationWarning::NoDataFrameOps => "No DataFrame operations found",
            ValidationWarning::UnbalancedParentheses => "Unbalanced parentheses",
            ValidationWarning::UnbalancedBrackets => "Unbalanced brackets",
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

fn count(code: &str, c: char) -> usize {
    code.chars().filter(|&ch| ch == c).count()
}

/// Empty result means the code looks structurally sound.
pub fn lint_code(code: &str) -> Vec<ValidationWarning> {
    let code = code.trim();
    if code.is_empty() {
        return vec![ValidationWarning::Empty];
    }

    let mut warnings = Vec::new();
    if !code.contains("def ") {
        warnings.push(ValidationWarning::MissingFunction);
    }
    if !code.contains("return ") {
        warnings.push(ValidationWarning::MissingReturn);
    }
    if !code.contains("df[") && !code.contains("df.") {
        warnings.push(ValidationWarning::NoDataFrameOps);
    }
    if count(code, '(') != count(code, ')') {
        warnings.push(ValidationWarning::UnbalancedParentheses);
    }
    if count(code, '[') != count(code, ']') {
        warnings.push(ValidationWarning::UnbalancedBrackets);
    }
    warnings
}
