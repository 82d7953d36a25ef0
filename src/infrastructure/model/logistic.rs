use serde::{Deserialize, Serialize};
use std::path::Path;

use super::Classifier;
use crate::domain::error::{AppError, Result};
use crate::domain::prediction::FeatureImportance;
use crate::domain::table::StudentTable;

/// Serialized form of a trained logistic regression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModelFile {
    pub features: Vec<String>,
    pub weights: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

/// Binary logistic classifier over named, already-encoded feature columns
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    features: Vec<String>,
    weights: Vec<f64>,
    intercept: f64,
    threshold: f64,
}

impl LogisticClassifier {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::IoError(format!("Failed to read model {}: {}", path.display(), e))
        })?;
        let file: LogisticModelFile = serde_json::from_str(&content).map_err(|e| {
            AppError::ModelError(format!("Invalid model file {}: {}", path.display(), e))
        })?;
        Self::try_from(file)
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    fn probability(&self, inputs: &[f64]) -> f64 {
        let z = self.intercept
            + self
                .weights
                .iter()
                .zip(inputs)
                .map(|(weight, input)| weight * input)
                .sum::<f64>();
        1.0 / (1.0 + (-z).exp())
    }
}

impl TryFrom<LogisticModelFile> for LogisticClassifier {
    type Error = AppError;

    fn try_from(file: LogisticModelFile) -> Result<Self> {
        if file.features.is_empty() {
            return Err(AppError::ModelError("model declares no features".to_string()));
        }
        if file.features.len() != file.weights.len() {
            return Err(AppError::ModelError(format!(
                "model has {} features but {} weights",
                file.features.len(),
                file.weights.len()
            )));
        }
        if !file.intercept.is_finite() || file.weights.iter().any(|w| !w.is_finite()) {
            return Err(AppError::ModelError(
                "model coefficients must be finite".to_string(),
            ));
        }
        if !(file.threshold > 0.0 && file.threshold < 1.0) {
            return Err(AppError::ModelError(format!(
                "model threshold {} must be between 0 and 1",
                file.threshold
            )));
        }

        Ok(Self {
            features: file.features,
            weights: file.weights,
            intercept: file.intercept,
            threshold: file.threshold,
        })
    }
}

impl Classifier for LogisticClassifier {
    fn predict(&self, table: &StudentTable) -> Result<Vec<u8>> {
        let positions = self
            .features
            .iter()
            .map(|feature| {
                table.column_position(feature).ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "Dataset is missing model feature column '{}'",
                        feature
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut inputs = vec![0.0; positions.len()];
        let mut labels = Vec::with_capacity(table.len());
        for row in &table.rows {
            for (slot, (&position, feature)) in
                inputs.iter_mut().zip(positions.iter().zip(&self.features))
            {
                *slot = row.fields[position].value.as_number().ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "Row {} column '{}' is not numeric",
                        row.index + 1,
                        feature
                    ))
                })?;
            }
            let label = u8::from(self.probability(&inputs) >= self.threshold);
            labels.push(label);
        }

        Ok(labels)
    }

    fn feature_importances(&self) -> Option<Vec<FeatureImportance>> {
        let total: f64 = self.weights.iter().map(|w| w.abs()).sum();
        Some(
            self.features
                .iter()
                .zip(&self.weights)
                .map(|(feature, weight)| FeatureImportance {
                    feature: feature.clone(),
                    importance: if total > 0.0 { weight.abs() / total } else { 0.0 },
                })
                .collect(),
        )
    }
}
