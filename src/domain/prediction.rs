use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::{AppError, Result};
use crate::domain::table::StudentTable;

/// Column appended to the encoded table after classification
pub const RISK_STATUS_COLUMN: &str = "Risk_Status";

/// Two-valued label shown to staff, derived from the binary prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskStatus {
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Low Risk")]
    LowRisk,
}

impl RiskStatus {
    /// Display order used by charts and reports
    pub const ALL: [RiskStatus; 2] = [RiskStatus::AtRisk, RiskStatus::LowRisk];

    /// Map a classifier label (1 = at risk, 0 = low risk)
    pub fn from_label(label: u8) -> Result<Self> {
        match label {
            1 => Ok(RiskStatus::AtRisk),
            0 => Ok(RiskStatus::LowRisk),
            other => Err(AppError::ModelError(format!(
                "classifier returned label {}, expected 0 or 1",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskStatus::AtRisk => "At Risk",
            RiskStatus::LowRisk => "Low Risk",
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Encoded table plus the `Risk_Status` column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResults {
    pub table: StudentTable,
    pub statuses: Vec<RiskStatus>,
    pub at_risk: usize,
    pub low_risk: usize,
}

impl PredictionResults {
    pub fn total(&self) -> usize {
        self.statuses.len()
    }

    pub fn count(&self, status: RiskStatus) -> usize {
        match status {
            RiskStatus::AtRisk => self.at_risk,
            RiskStatus::LowRisk => self.low_risk,
        }
    }

    /// 1-based row numbers of students flagged at risk
    pub fn at_risk_rows(&self) -> Vec<usize> {
        self.statuses
            .iter()
            .enumerate()
            .filter(|(_, status)| **status == RiskStatus::AtRisk)
            .map(|(index, _)| index + 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(RiskStatus::from_label(1).unwrap(), RiskStatus::AtRisk);
        assert_eq!(RiskStatus::from_label(0).unwrap(), RiskStatus::LowRisk);
        assert!(matches!(
            RiskStatus::from_label(2),
            Err(AppError::ModelError(_))
        ));
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&RiskStatus::AtRisk).unwrap();
        assert_eq!(json, "\"At Risk\"");
    }
}
