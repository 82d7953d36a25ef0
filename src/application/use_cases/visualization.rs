// ============================================================
// VISUALIZATION USE CASE
// ============================================================
// Chart series computed from prediction results

use std::cmp::Ordering;

use super::risk_prediction::RiskPredictionUseCase;
use crate::domain::chart::{ChartData, ChartKind, ChartPoint};
use crate::domain::error::{AppError, Result};
use crate::domain::prediction::{FeatureImportance, PredictionResults, RiskStatus, RISK_STATUS_COLUMN};
use crate::domain::table::CellValue;

const EMPTY_BUCKET: &str = "(empty)";

pub struct VisualizationUseCase;

impl VisualizationUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn build(
        &self,
        kind: ChartKind,
        column: Option<&str>,
        results: &PredictionResults,
        prediction: &RiskPredictionUseCase,
    ) -> Result<ChartData> {
        match kind {
            ChartKind::Pie | ChartKind::Bar => Ok(self.risk_distribution(kind, results)),
            ChartKind::FeatureImportance => {
                Ok(self.feature_importance(prediction.feature_importances()?))
            }
            ChartKind::Histogram => {
                let column = column.ok_or_else(|| {
                    AppError::ValidationError("histogram requires a column".to_string())
                })?;
                self.histogram(results, column)
            }
        }
    }

    /// Student count per risk status, both statuses always present
    pub fn risk_distribution(&self, kind: ChartKind, results: &PredictionResults) -> ChartData {
        let title = match kind {
            ChartKind::Bar => "Count of Students by Risk Category",
            _ => "Risk Status Distribution",
        };
        ChartData {
            kind,
            title: title.to_string(),
            x_label: RISK_STATUS_COLUMN.to_string(),
            y_label: "Students".to_string(),
            points: RiskStatus::ALL
                .iter()
                .map(|status| ChartPoint {
                    label: status.to_string(),
                    value: results.count(*status) as f64,
                })
                .collect(),
        }
    }

    pub fn feature_importance(&self, importances: Vec<FeatureImportance>) -> ChartData {
        ChartData {
            kind: ChartKind::FeatureImportance,
            title: "Feature Importance".to_string(),
            x_label: "Features".to_string(),
            y_label: "Importance".to_string(),
            points: importances
                .into_iter()
                .map(|importance| ChartPoint {
                    label: importance.feature,
                    value: importance.importance,
                })
                .collect(),
        }
    }

    /// Value counts of one column, sorted by value
    pub fn histogram(&self, results: &PredictionResults, column: &str) -> Result<ChartData> {
        if column == RISK_STATUS_COLUMN {
            return Err(AppError::NotFound(format!(
                "column '{}' is not available for histograms",
                column
            )));
        }
        let values = results
            .table
            .column(column)
            .ok_or_else(|| AppError::NotFound(format!("column '{}' does not exist", column)))?;

        let mut buckets: Vec<(&CellValue, usize)> = Vec::new();
        for value in values {
            match buckets.iter_mut().find(|(seen, _)| *seen == value) {
                Some((_, count)) => *count += 1,
                None => buckets.push((value, 1)),
            }
        }
        buckets.sort_by(|(a, _), (b, _)| compare_cells(a, b));

        Ok(ChartData {
            kind: ChartKind::Histogram,
            title: format!("Histogram of {}", column),
            x_label: column.to_string(),
            y_label: "Count".to_string(),
            points: buckets
                .into_iter()
                .map(|(value, count)| ChartPoint {
                    label: if value.is_empty() {
                        EMPTY_BUCKET.to_string()
                    } else {
                        value.to_string()
                    },
                    value: count as f64,
                })
                .collect(),
        })
    }
}

impl Default for VisualizationUseCase {
    fn default() -> Self {
        Self::new()
    }
}

/// Numbers first (ascending), then text, then blanks
fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    fn rank(value: &CellValue) -> u8 {
        match value {
            CellValue::Code(_) | CellValue::Number { .. } => 0,
            CellValue::Text(_) => 1,
            CellValue::Empty => 2,
        }
    }

    rank(a).cmp(&rank(b)).then_with(|| match (a, b) {
        (CellValue::Text(x), CellValue::Text(y)) => x.cmp(y),
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    })
}
