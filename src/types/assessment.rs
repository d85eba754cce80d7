//! Risk verdict data structures

use crate::feature_extractor::{AlignedRow, SchemaStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary verdict produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLabel {
    /// Class 0: likely to default
    BadRisk,
    /// Class 1: likely to repay
    GoodRisk,
}

impl RiskLabel {
    /// Map a raw class label from the model
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            0 => Some(RiskLabel::BadRisk),
            1 => Some(RiskLabel::GoodRisk),
            _ => None,
        }
    }

    /// One line explanation shown with the verdict
    pub fn summary(self) -> &'static str {
        match self {
            RiskLabel::GoodRisk => "Likely to repay.",
            RiskLabel::BadRisk => "High probability of default.",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::GoodRisk => f.write_str("GOOD RISK"),
            RiskLabel::BadRisk => f.write_str("BAD RISK"),
        }
    }
}

/// Result of scoring one application
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    /// Unique assessment identifier
    pub assessment_id: String,

    /// Verdict
    pub label: RiskLabel,

    /// Row exactly as handed to the classifier
    pub features: AlignedRow,

    /// Assessment timestamp
    pub timestamp: DateTime<Utc>,
}

impl RiskAssessment {
    pub fn new(label: RiskLabel, features: AlignedRow) -> Self {
        Self {
            assessment_id: uuid::Uuid::new_v4().to_string(),
            label,
            features,
            timestamp: Utc::now(),
        }
    }

    pub fn schema(&self) -> &SchemaStatus {
        &self.features.schema
    }
}
