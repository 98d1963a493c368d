//! Parsed rule conditions.
//!
//! A [`Condition`] is one clause recovered from a free-text clinical
//! description, e.g. `AGE > 65` or `AESTDTC IS NULL`. Conditions carry the
//! byte offset of the match so that generation can replay the source
//! left-to-right order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Placeholder field used for "unclassified field mention" matches.
///
/// Conditions resolving to this field never leave the extractor.
pub const PLACEHOLDER_FIELD: &str = "FIELD";

/// Comparison operator of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "IS NULL")]
    IsNull,
    #[serde(rename = "IS NOT NULL")]
    IsNotNull,
    /// A recognised variable referenced without a comparison.
    #[serde(rename = "MENTIONED")]
    Mentioned,
    /// Subject presence in a dataset; the field is the dataset code and the
    /// value is `Y` (present) or `N` (absent).
    #[serde(rename = "EXISTS")]
    Exists,
}

impl Operator {
    /// Canonical symbol as it appears in query text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::Mentioned => "MENTIONED",
            Operator::Exists => "EXISTS",
        }
    }

    /// Null checks take no value.
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// Ordering comparisons (`>`, `<`, `>=`, `<=`).
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Lt | Operator::Ge | Operator::Le
        )
    }

    /// Operators that contribute a boolean term to generated filters.
    pub fn is_filter(&self) -> bool {
        !matches!(self, Operator::Mentioned)
    }

    /// Human-readable wording ("greater than", "is missing", ...).
    pub fn describe(&self) -> &'static str {
        match self {
            Operator::Eq => "equal to",
            Operator::Ne => "not equal to",
            Operator::Gt => "greater than",
            Operator::Lt => "less than",
            Operator::Ge => "greater than or equal to",
            Operator::Le => "less than or equal to",
            Operator::IsNull => "is missing",
            Operator::IsNotNull => "is present",
            Operator::Mentioned => "is referenced",
            Operator::Exists => "exists",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ModelError;

    /// Parse an operator symbol, accepting the usual spelling variants
    /// (`==`, `<>`, `=>`, `=<`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_uppercase().as_str() {
            "=" | "==" => Ok(Operator::Eq),
            "!=" | "<>" | "=!" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            "<" => Ok(Operator::Lt),
            ">=" | "=>" => Ok(Operator::Ge),
            "<=" | "=<" => Ok(Operator::Le),
            "IS NULL" => Ok(Operator::IsNull),
            "IS NOT NULL" => Ok(Operator::IsNotNull),
            "MENTIONED" => Ok(Operator::Mentioned),
            "EXISTS" => Ok(Operator::Exists),
            _ => Err(ModelError::UnknownOperator(s.to_string())),
        }
    }
}

/// One matched clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Clinical variable name, uppercase.
    pub field: String,
    pub operator: Operator,
    /// Empty for unary null checks.
    pub value: String,
    /// Byte offset of the match in the source text.
    pub position: usize,
    /// Matched substring.
    pub raw: String,
    /// Sub-test code when `field` is a result column scoped by a test-code
    /// column (e.g. `SYSBP` for `VSORRES`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
}

impl Condition {
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
        position: usize,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            position,
            raw: raw.into(),
            test: None,
        }
    }

    #[must_use]
    pub fn with_test(mut self, test: impl Into<String>) -> Self {
        self.test = Some(test.into());
        self
    }

    /// Byte offset one past the end of the match.
    pub fn end(&self) -> usize {
        self.position + self.raw.len()
    }

    /// True when the match spans of both conditions intersect.
    pub fn overlaps(&self, other: &Condition) -> bool {
        self.position < other.end() && other.position < self.end()
    }

    /// True when field, operator, value and test agree (position ignored).
    pub fn same_clause(&self, other: &Condition) -> bool {
        self.field == other.field
            && self.operator == other.operator
            && self.value == other.value
            && self.test == other.test
    }

    /// Plain decimal number (`-12`, `3.5`), emitted unquoted. Words that
    /// `f64` also parses (`NaN`, `inf`) and exponents stay text.
    pub fn is_numeric_value(&self) -> bool {
        let value = self.value.as_str();
        !value.is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_digit() || c == '-' || c == '.')
            && value.parse::<f64>().is_ok_and(f64::is_finite)
    }

    /// Test-code column qualifying a result field (`VSORRES` -> `VSTESTCD`).
    pub fn qualifier_column(&self) -> Option<String> {
        self.test.as_ref()?;
        let prefix: String = self.field.chars().take(2).collect();
        Some(format!("{prefix}TESTCD"))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(test) = &self.test {
            write!(f, "[{test}] ")?;
        }
        if self.operator.is_unary() || self.value.is_empty() {
            write!(f, "{} {}", self.field, self.operator)
        } else {
            write!(f, "{} {} {}", self.field, self.operator, self.value)
        }
    }
}

/// Boolean connective between two consecutive conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    /// Lowercase word used in query text.
    pub fn word(&self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.word())
    }
}

/// An `and`/`or` token found in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalOperator {
    #[serde(rename = "type")]
    pub kind: Connective,
    pub position: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_from_str_accepts_variants() {
        assert_eq!("==".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!("<>".parse::<Operator>().unwrap(), Operator::Ne);
        assert_eq!("=>".parse::<Operator>().unwrap(), Operator::Ge);
        assert_eq!("is  not null".parse::<Operator>().unwrap(), Operator::IsNotNull);
        assert!("~".parse::<Operator>().is_err());
    }

    #[test]
    fn operator_serializes_as_symbol() {
        let json = serde_json::to_string(&Operator::IsNotNull).unwrap();
        assert_eq!(json, "\"IS NOT NULL\"");
        let op: Operator = serde_json::from_str("\">=\"").unwrap();
        assert_eq!(op, Operator::Ge);
    }

    #[test]
    fn numeric_values_are_plain_decimals() {
        let value = |v: &str| Condition::new("LBSTRESC", Operator::Eq, v, 0, v);
        assert!(value("65").is_numeric_value());
        assert!(value("-1.5").is_numeric_value());
        assert!(value("0.25").is_numeric_value());
        for text in ["", "NaN", "nan", "inf", "-inf", "infinity", "1e5", "-", "1.2.3", "M"] {
            assert!(!value(text).is_numeric_value(), "{text:?} should be quoted");
        }
    }

    #[test]
    fn overlap_uses_match_spans() {
        let a = Condition::new("AGE", Operator::Gt, "65", 0, "AGE > 65");
        let b = Condition::new("AGE", Operator::Gt, "65", 4, "> 65");
        let c = Condition::new("SEX", Operator::Eq, "M", 13, "SEX = 'M'");
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn qualifier_column_derives_from_result_prefix() {
        let vs = Condition::new("VSORRES", Operator::Gt, "140", 0, "SYSBP > 140").with_test("SYSBP");
        assert_eq!(vs.qualifier_column().as_deref(), Some("VSTESTCD"));
        let plain = Condition::new("AGE", Operator::Gt, "65", 0, "AGE > 65");
        assert_eq!(plain.qualifier_column(), None);
    }

    #[test]
    fn display_omits_value_for_null_checks() {
        let c = Condition::new("AESTDTC", Operator::IsNull, "", 0, "AESTDTC is missing");
        assert_eq!(c.to_string(), "AESTDTC IS NULL");
    }
}
