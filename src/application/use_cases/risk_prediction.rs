// ============================================================
// RISK PREDICTION USE CASE
// ============================================================
// Run the injected classifier and derive the Risk_Status column

use std::sync::Arc;

use tracing::info;

use crate::domain::encoding::EncodedTable;
use crate::domain::error::{AppError, Result};
use crate::domain::prediction::{
    FeatureImportance, PredictionResults, RiskStatus, RISK_STATUS_COLUMN,
};
use crate::domain::table::CellValue;
use crate::infrastructure::model::Classifier;

pub struct RiskPredictionUseCase {
    classifier: Option<Arc<dyn Classifier>>,
}

impl RiskPredictionUseCase {
    pub fn new(classifier: Option<Arc<dyn Classifier>>) -> Self {
        Self { classifier }
    }

    pub fn has_model(&self) -> bool {
        self.classifier.is_some()
    }

    fn classifier(&self) -> Result<&Arc<dyn Classifier>> {
        self.classifier
            .as_ref()
            .ok_or_else(|| AppError::ModelError("no trained model loaded".to_string()))
    }

    pub fn execute(&self, encoded: &EncodedTable) -> Result<PredictionResults> {
        let classifier = self.classifier()?;

        let unmapped = encoded.report.unmapped_columns();
        if !unmapped.is_empty() {
            let detail = unmapped
                .iter()
                .map(|(column, count)| format!("{} ({})", column, count))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(AppError::ValidationError(format!(
                "Dataset has unrecognized values in: {}. Fix them and preprocess again",
                detail
            )));
        }

        let labels = classifier.predict(&encoded.table)?;
        if labels.len() != encoded.table.len() {
            return Err(AppError::ModelError(format!(
                "classifier returned {} labels for {} rows",
                labels.len(),
                encoded.table.len()
            )));
        }

        let statuses = labels
            .into_iter()
            .map(RiskStatus::from_label)
            .collect::<Result<Vec<_>>>()?;
        let values = statuses
            .iter()
            .map(|status| CellValue::text(status.as_str()))
            .collect();
        let table = encoded.table.with_column(RISK_STATUS_COLUMN, values)?;

        let at_risk = statuses
            .iter()
            .filter(|status| **status == RiskStatus::AtRisk)
            .count();
        let low_risk = statuses.len() - at_risk;
        info!(rows = statuses.len(), at_risk, low_risk, "Prediction completed");

        Ok(PredictionResults {
            table,
            statuses,
            at_risk,
            low_risk,
        })
    }

    pub fn feature_importances(&self) -> Result<Vec<FeatureImportance>> {
        self.classifier()?.feature_importances().ok_or_else(|| {
            AppError::ValidationError("the loaded model does not expose feature importances".to_string())
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::encoding::EncodingReport;
    use crate::domain::table::StudentTable;

    /// Flags every row whose `Attendance` code is 0
    pub(crate) struct AttendanceStub;

    impl Classifier for AttendanceStub {
        fn predict(&self, table: &StudentTable) -> Result<Vec<u8>> {
            Ok(table
                .rows
                .iter()
                .map(|row| u8::from(row.get("Attendance") == Some(&CellValue::Code(0))))
                .collect())
        }
    }

    struct BrokenStub(Vec<u8>);

    impl Classifier for BrokenStub {
        fn predict(&self, _table: &StudentTable) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    fn encoded(codes: &[i64], unmapped: usize) -> EncodedTable {
        let table = StudentTable::from_rows(
            vec!["Attendance".to_string()],
            codes.iter().map(|code| vec![CellValue::Code(*code)]).collect(),
        );
        let mut report = EncodingReport::default();
        report.encoded_columns.push("Attendance".to_string());
        report.unmapped.insert("Attendance".to_string(), unmapped);
        EncodedTable { table, report }
    }

    #[test]
    fn test_appends_risk_status() {
        let use_case = RiskPredictionUseCase::new(Some(Arc::new(AttendanceStub)));
        let results = use_case.execute(&encoded(&[0, 3, 0], 0)).unwrap();

        assert_eq!(results.at_risk, 2);
        assert_eq!(results.low_risk, 1);
        assert_eq!(results.table.headers.last().unwrap(), RISK_STATUS_COLUMN);
        assert_eq!(
            results.table.rows[1].get(RISK_STATUS_COLUMN),
            Some(&CellValue::text("Low Risk"))
        );
        assert_eq!(results.at_risk_rows(), vec![1, 3]);
    }

    #[test]
    fn test_without_model() {
        let use_case = RiskPredictionUseCase::new(None);
        assert!(!use_case.has_model());
        assert!(matches!(
            use_case.execute(&encoded(&[0], 0)),
            Err(AppError::ModelError(_))
        ));
    }

    #[test]
    fn test_refuses_unmapped_values() {
        let use_case = RiskPredictionUseCase::new(Some(Arc::new(AttendanceStub)));
        let err = use_case.execute(&encoded(&[0, -1], 1)).unwrap_err();
        assert!(err.to_string().contains("Attendance (1)"));
    }

    #[test]
    fn test_label_count_mismatch() {
        let use_case = RiskPredictionUseCase::new(Some(Arc::new(BrokenStub(vec![1]))));
        assert!(matches!(
            use_case.execute(&encoded(&[0, 1], 0)),
            Err(AppError::ModelError(_))
        ));
    }

    #[test]
    fn test_rejects_non_binary_labels() {
        let use_case = RiskPredictionUseCase::new(Some(Arc::new(BrokenStub(vec![2]))));
        assert!(use_case.execute(&encoded(&[0], 0)).is_err());
    }

    #[test]
    fn test_feature_importances_optional() {
        let use_case = RiskPredictionUseCase::new(Some(Arc::new(AttendanceStub)));
        assert!(matches!(
            use_case.feature_importances(),
            Err(AppError::ValidationError(_))
        ));
    }
}
