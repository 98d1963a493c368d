//! Recognised clinical condition shapes.
//!
//! A shape is a known combination of conditions with a fixed, clinically
//! worded query sentence and a hand-written filter body. Shapes are tried
//! before the generic `Flag records where ...` template and only apply to
//! all-AND chains. Conditions outside the shape's signature are kept: their
//! clause is appended to the sentence and their terms to the filter.

use serde::{Deserialize, Serialize};
use sdq_model::{Condition, Connective, Domain, Operator, ParseResult};
use sdq_parse::attribute_joins;
use tracing::debug;

use crate::code::{column_list, frame_params, quote, render_function, term};
use crate::phrase::clause;

/// Arm codes/labels of subjects who must not carry a randomization date.
const EXCLUDED_ARMS: &[&str] = &["SCRNFAIL", "NOTASSGN", "NOTTRT", "SCREEN FAILURE"];

const START_DATE_FIELDS: &[&str] = &["AESTDTC", "AESTDT"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    SevereMissingGrade,
    GradeActionCheck,
    SeverityGradeAlignment,
    MissingStartDate,
    SeriousMissingOutcome,
    RandomizedButExcluded,
    SubjectNotInDataset,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::SevereMissingGrade => "severe_missing_grade",
            ShapeKind::GradeActionCheck => "grade_action_check",
            ShapeKind::SeverityGradeAlignment => "severity_grade_alignment",
            ShapeKind::MissingStartDate => "missing_start_date",
            ShapeKind::SeriousMissingOutcome => "serious_missing_outcome",
            ShapeKind::RandomizedButExcluded => "randomized_but_excluded",
            ShapeKind::SubjectNotInDataset => "subject_not_in_dataset",
        }
    }
}

/// A detected shape with the details its text and code need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    SevereMissingGrade { date_field: Option<String> },
    GradeActionCheck { grade: String },
    SeverityGradeAlignment { grade: i64 },
    MissingStartDate { date_field: String },
    SeriousMissingOutcome,
    RandomizedButExcluded { arm_field: String, arms: Vec<String> },
    SubjectNotInDataset { present: Domain, absent: Domain },
}

fn find<'a>(conditions: &[&'a Condition], field: &str, op: Operator) -> Option<&'a Condition> {
    conditions
        .iter()
        .copied()
        .find(|c| c.field == field && c.operator == op)
}

fn is_start_date(condition: &Condition) -> bool {
    START_DATE_FIELDS.contains(&condition.field.as_str())
}

fn is_severe(condition: &Condition) -> bool {
    condition.field == "AESEV"
        && condition.operator == Operator::Eq
        && condition.value.eq_ignore_ascii_case("severe")
}

fn is_serious(condition: &Condition) -> bool {
    condition.field == "AESER"
        && condition.operator == Operator::Eq
        && condition.value.eq_ignore_ascii_case("y")
}

/// Lower bound a `CTCAE_GRADE >=`/`>` condition sets.
fn grade_floor(condition: &Condition) -> Option<i64> {
    if condition.field != "CTCAE_GRADE" {
        return None;
    }
    let value: i64 = condition.value.parse().ok()?;
    match condition.operator {
        Operator::Ge => Some(value),
        Operator::Gt => Some(value + 1),
        _ => None,
    }
}

impl Shape {
    /// First matching shape for the filter conditions of `parse`. Chains
    /// with an `or` anywhere never match.
    pub fn detect(parse: &ParseResult) -> Option<Shape> {
        let conditions: Vec<&Condition> = parse.filter_conditions().collect();
        if conditions.is_empty() {
            return None;
        }
        let joins = attribute_joins(&conditions, &parse.logical_operators);
        if joins.contains(&Connective::Or) {
            debug!("or-joined conditions, skipping clinical shapes");
            return None;
        }
        Self::detect_in(&conditions)
    }

    fn detect_in(conditions: &[&Condition]) -> Option<Shape> {
        let severe = conditions.iter().any(|c| is_severe(c));
        let missing_grade = find(conditions, "CTCAE_GRADE", Operator::IsNull).is_some();
        let missing_start = conditions
            .iter()
            .find(|c| is_start_date(c) && c.operator == Operator::IsNull);

        if severe && missing_grade {
            return Some(Shape::SevereMissingGrade {
                date_field: missing_start.map(|c| c.field.clone()),
            });
        }

        if let Some(grade) = find(conditions, "CTCAE_GRADE", Operator::Eq)
            && matches!(grade.value.as_str(), "4" | "5")
        {
            return Some(Shape::GradeActionCheck {
                grade: grade.value.clone(),
            });
        }

        let threshold = conditions.iter().find_map(|c| grade_floor(c));
        if severe && let Some(grade) = threshold.filter(|g| *g >= 3) {
            return Some(Shape::SeverityGradeAlignment { grade });
        }

        if conditions
            .iter()
            .all(|c| is_start_date(c) && c.operator == Operator::IsNull)
        {
            return Some(Shape::MissingStartDate {
                date_field: conditions[0].field.clone(),
            });
        }

        let serious = conditions.iter().any(|c| is_serious(c));
        if serious
            && (find(conditions, "AEOUT", Operator::IsNull).is_some() || conditions.len() == 1)
        {
            return Some(Shape::SeriousMissingOutcome);
        }

        if find(conditions, "RANDDT", Operator::IsNotNull).is_some() {
            let excluded: Vec<&Condition> = conditions
                .iter()
                .copied()
                .filter(|c| {
                    matches!(c.field.as_str(), "ARMCD" | "ARM")
                        && c.operator == Operator::Eq
                        && EXCLUDED_ARMS.contains(&c.value.to_ascii_uppercase().as_str())
                })
                .collect();
            if let Some(first) = excluded.first() {
                let arm_field = first.field.clone();
                let arms = excluded
                    .iter()
                    .filter(|c| c.field == arm_field)
                    .map(|c| c.value.clone())
                    .collect();
                return Some(Shape::RandomizedButExcluded { arm_field, arms });
            }
        }

        let dataset = |value: &str| {
            conditions
                .iter()
                .filter(|c| c.operator == Operator::Exists && c.value == value)
                .find_map(|c| c.field.parse::<Domain>().ok())
        };
        if let (Some(present), Some(absent)) = (dataset("Y"), dataset("N"))
            && present != absent
        {
            return Some(Shape::SubjectNotInDataset { present, absent });
        }

        None
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::SevereMissingGrade { .. } => ShapeKind::SevereMissingGrade,
            Shape::GradeActionCheck { .. } => ShapeKind::GradeActionCheck,
            Shape::SeverityGradeAlignment { .. } => ShapeKind::SeverityGradeAlignment,
            Shape::MissingStartDate { .. } => ShapeKind::MissingStartDate,
            Shape::SeriousMissingOutcome => ShapeKind::SeriousMissingOutcome,
            Shape::RandomizedButExcluded { .. } => ShapeKind::RandomizedButExcluded,
            Shape::SubjectNotInDataset { .. } => ShapeKind::SubjectNotInDataset,
        }
    }

    /// Whether `condition` is part of this shape's signature, so its check
    /// is already in the fixed sentence and body.
    pub fn covers(&self, condition: &Condition) -> bool {
        let field = condition.field.as_str();
        let op = condition.operator;
        match self {
            Shape::SevereMissingGrade { date_field } => {
                is_severe(condition)
                    || (op == Operator::IsNull
                        && (field == "CTCAE_GRADE" || date_field.as_deref() == Some(field)))
            }
            Shape::GradeActionCheck { grade } => {
                (field == "CTCAE_GRADE" && op == Operator::Eq && condition.value == *grade)
                    || (field == "AEACN"
                        && (op == Operator::IsNull
                            || (op == Operator::Eq
                                && condition.value.eq_ignore_ascii_case("none"))))
            }
            Shape::SeverityGradeAlignment { .. } => {
                is_severe(condition) || grade_floor(condition).is_some()
            }
            Shape::MissingStartDate { .. } => is_start_date(condition) && op == Operator::IsNull,
            Shape::SeriousMissingOutcome => {
                is_serious(condition) || (field == "AEOUT" && op == Operator::IsNull)
            }
            Shape::RandomizedButExcluded { arm_field, arms } => {
                (field == "RANDDT" && op == Operator::IsNotNull)
                    || (field == arm_field.as_str()
                        && op == Operator::Eq
                        && arms.contains(&condition.value))
            }
            Shape::SubjectNotInDataset { present, absent } => {
                op == Operator::Exists
                    && ((condition.value == "Y" && field == present.as_str())
                        || (condition.value == "N" && field == absent.as_str()))
            }
        }
    }

    /// Filter conditions of `parse` outside the signature, in source order.
    pub fn extras<'a>(&self, parse: &'a ParseResult) -> Vec<&'a Condition> {
        parse.filter_conditions().filter(|c| !self.covers(c)).collect()
    }

    /// Domain the generated function is named after.
    pub fn domain(&self) -> Domain {
        match self {
            Shape::SubjectNotInDataset { present, .. } => *present,
            Shape::RandomizedButExcluded { .. } => Domain::DM,
            _ => Domain::AE,
        }
    }

    /// Columns the hand-written body needs beyond the referenced fields.
    pub fn extra_items(&self) -> &'static [&'static str] {
        match self {
            Shape::SevereMissingGrade { .. }
            | Shape::SeverityGradeAlignment { .. }
            | Shape::MissingStartDate { .. } => &["AETERM"],
            Shape::GradeActionCheck { .. } => &["AETERM", "AEACN"],
            Shape::SeriousMissingOutcome => &["AETERM", "AEOUT"],
            Shape::RandomizedButExcluded { .. } | Shape::SubjectNotInDataset { .. } => &[],
        }
    }

    /// Shape sentence, followed by the clause of any extra conditions.
    pub fn query_text(&self, extras: &[&Condition]) -> String {
        let sentence = self.sentence();
        let rest = clause(extras, &[]);
        if rest.is_empty() {
            sentence
        } else {
            format!("{sentence} Limited to records where {rest}.")
        }
    }

    fn sentence(&self) -> String {
        match self {
            Shape::SevereMissingGrade {
                date_field: Some(date),
            } => format!(
                "AESEV = 'Severe' but {date} is missing and CTCAE_GRADE is missing - ensure CTCAE grade is documented for severe AEs."
            ),
            Shape::SevereMissingGrade { date_field: None } => {
                "AESEV = 'Severe' but CTCAE_GRADE is missing - ensure CTCAE grade is documented for severe AEs."
                    .to_string()
            }
            Shape::GradeActionCheck { grade } => {
                format!("For AE records with CTCAE_GRADE = {grade}, check AEACN is 'None' or missing.")
            }
            Shape::SeverityGradeAlignment { grade } => format!(
                "AESEV is marked as 'Severe', ensure the CTCAE_GRADE is {grade} or higher. Flag where the grade is <{grade}."
            ),
            Shape::MissingStartDate { date_field } => format!(
                "{date_field} is missing, verify AE start date is documented for all adverse events."
            ),
            Shape::SeriousMissingOutcome => {
                "AESER = 'Y' but AEOUT is blank or missing, verify serious AE has documented outcome."
                    .to_string()
            }
            Shape::RandomizedButExcluded { arm_field, arms } => {
                let arms_text = match arms.as_slice() {
                    [single] => format!("= '{single}'"),
                    many => format!(
                        "in ({})",
                        many.iter()
                            .map(|a| format!("'{a}'"))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                };
                format!(
                    "RANDDT is populated but {arm_field} {arms_text}, verify randomized subjects are not assigned to an excluded arm."
                )
            }
            Shape::SubjectNotInDataset { present, absent } => format!(
                "Subject present in {present} but absent from {absent}, verify the subject has {absent} records or document the reason."
            ),
        }
    }

    /// Hand-written filter function, with a `&` term per extra condition.
    pub fn code(&self, function_name: &str, columns: &[String], extras: &[&Condition]) -> String {
        let df = vec!["df".to_string()];
        let (mut params, doc, mut terms): (Vec<String>, String, Vec<String>) = match self {
            Shape::SevereMissingGrade { date_field } => {
                let mut terms = vec!["(df['AESEV'].str.upper() == 'SEVERE')".to_string()];
                if let Some(date) = date_field {
                    terms.push(format!("df[{}].isnull()", quote(date)));
                }
                terms.push("df['CTCAE_GRADE'].isnull()".to_string());
                let doc = match date_field {
                    Some(date) => format!("Check for severe AEs with missing {date} and CTCAE_GRADE"),
                    None => "Check for severe AEs with missing CTCAE_GRADE".to_string(),
                };
                (df, doc, terms)
            }
            Shape::GradeActionCheck { grade } => (
                df,
                format!("Check for AE records with CTCAE_GRADE = {grade} and missing/None AEACN"),
                vec![
                    format!("(df['CTCAE_GRADE'] == {grade})"),
                    "(df['AEACN'].isnull() | (df['AEACN'] == 'None') | (df['AEACN'] == ''))"
                        .to_string(),
                ],
            ),
            Shape::SeverityGradeAlignment { grade } => (
                df,
                format!("Check severe AEs graded below CTCAE grade {grade}"),
                vec![
                    "(df['AESEV'].str.upper() == 'SEVERE')".to_string(),
                    format!("(df['CTCAE_GRADE'] < {grade})"),
                ],
            ),
            Shape::MissingStartDate { date_field } => (
                df,
                format!("Check for missing {date_field} in AE records"),
                vec![format!("df[{}].isnull()", quote(date_field))],
            ),
            Shape::SeriousMissingOutcome => (
                df,
                "Check for serious AEs without a documented outcome".to_string(),
                vec![
                    "(df['AESER'] == 'Y')".to_string(),
                    "(df['AEOUT'].isnull() | (df['AEOUT'] == ''))".to_string(),
                ],
            ),
            Shape::RandomizedButExcluded { arm_field, arms } => (
                df,
                "Check for randomized subjects assigned to an excluded arm".to_string(),
                vec![
                    "df['RANDDT'].notnull()".to_string(),
                    format!("df[{}].isin({})", quote(arm_field), column_list(arms)),
                ],
            ),
            Shape::SubjectNotInDataset { present, absent } => {
                let other = format!("{}_df", absent.slug());
                (
                    vec!["df".to_string(), other.clone()],
                    format!("Check for subjects present in {present} but absent from {absent}"),
                    vec![format!("~df['SUBJID'].isin({other}['SUBJID'])")],
                )
            }
        };
        let domain = self.domain();
        for param in frame_params(extras, domain) {
            if !params.contains(&param) {
                params.push(param);
            }
        }
        terms.extend(extras.iter().filter_map(|c| term(c, domain)));
        let expression = terms.join(" &\n        ");
        render_function(function_name, &params, &doc, &expression, columns)
    }
}
