//! Clinical data domains and the field-to-domain membership table.
//!
//! Domain codes follow CDISC two-letter dataset codes. Membership of a
//! variable is resolved first by an explicit list (demographics and a few
//! derived vitals/grade names), then by the two-letter variable prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// CDISC data domain.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Domain {
    /// Adverse Events: the primary safety domain and the default.
    #[default]
    AE,
    /// Demographics.
    DM,
    /// Exposure.
    EX,
    /// Vital Signs.
    VS,
    /// Laboratory test results.
    LB,
    /// Concomitant Medications.
    CM,
    /// Medical History.
    MH,
    /// Disposition.
    DS,
}

/// Demographics variables carry no `DM` prefix.
const DM_FIELDS: &[&str] = &[
    "AGE", "AGEU", "SEX", "RACE", "ETHNIC", "BRTHDTC", "ARM", "ARMCD", "ACTARM", "ACTARMCD",
    "RANDDT", "RANDDTC", "RFSTDTC", "RFENDTC", "RFICDTC", "COUNTRY", "SITEID", "DTHFL",
    "DTHDTC", "INVID",
];

const VS_FIELDS: &[&str] = &["SYSBP", "DIABP", "PULSE", "HR", "TEMP", "WEIGHT", "HEIGHT", "BMI"];

const AE_FIELDS: &[&str] = &["CTCAE_GRADE"];

impl Domain {
    /// All domains in display order.
    pub const ALL: [Domain; 8] = [
        Domain::AE,
        Domain::DM,
        Domain::EX,
        Domain::VS,
        Domain::LB,
        Domain::CM,
        Domain::MH,
        Domain::DS,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::AE => "AE",
            Domain::DM => "DM",
            Domain::EX => "EX",
            Domain::VS => "VS",
            Domain::LB => "LB",
            Domain::CM => "CM",
            Domain::MH => "MH",
            Domain::DS => "DS",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Domain::AE => "Adverse Events",
            Domain::DM => "Demographics",
            Domain::EX => "Exposure",
            Domain::VS => "Vital Signs",
            Domain::LB => "Laboratory",
            Domain::CM => "Concomitant Medications",
            Domain::MH => "Medical History",
            Domain::DS => "Disposition",
        }
    }

    /// Lowercase code, used in generated function names and URLs.
    pub fn slug(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// Resolve the domain a variable belongs to, if any.
    pub fn for_field(field: &str) -> Option<Domain> {
        let field = field.trim().to_ascii_uppercase();
        if field.is_empty() {
            return None;
        }
        if DM_FIELDS.contains(&field.as_str()) {
            return Some(Domain::DM);
        }
        if VS_FIELDS.contains(&field.as_str()) {
            return Some(Domain::VS);
        }
        if AE_FIELDS.contains(&field.as_str()) {
            return Some(Domain::AE);
        }
        // A bare dataset code (used by presence checks) maps to itself.
        if let Ok(domain) = field.parse::<Domain>() {
            return Some(domain);
        }
        let prefix = field.get(..2)?;
        Domain::ALL.into_iter().find(|d| d.as_str() == prefix)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ModelError;

    /// Accepts the code or the display name, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized || d.display_name().to_uppercase() == normalized)
            .ok_or_else(|| ModelError::UnknownDomain(s.to_string()))
    }
}
