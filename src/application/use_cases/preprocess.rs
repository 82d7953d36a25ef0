// ============================================================
// PREPROCESS USE CASE
// ============================================================
// Validate the cohort form and encode the raw dataset exactly once

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use super::categorical_encoder::CategoricalEncoder;
use crate::domain::cohort::{CohortInfo, CohortRequest};
use crate::domain::encoding::{EncodedTable, EncodingReport, EncodingTable};
use crate::domain::error::Result;
use crate::domain::table::{StudentTable, TablePreview};

#[derive(Debug, Clone)]
pub struct PreprocessOutcome {
    pub encoded: EncodedTable,
    pub cohort: CohortInfo,
    pub summary: PreprocessSummary,
}

/// What the dashboard shows after preprocessing
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessSummary {
    pub cohort: CohortInfo,
    pub preview: TablePreview,
    pub report: EncodingReport,
    pub processing_time_ms: u64,
}

pub struct PreprocessUseCase {
    encoding_table: Arc<EncodingTable>,
    preview_rows: usize,
}

impl PreprocessUseCase {
    pub fn new(encoding_table: Arc<EncodingTable>, preview_rows: usize) -> Self {
        Self {
            encoding_table,
            preview_rows,
        }
    }

    pub fn encoding_table(&self) -> &EncodingTable {
        &self.encoding_table
    }

    /// `raw` must be the table as uploaded; encoded tables are never re-encoded.
    pub fn execute(&self, raw: &StudentTable, request: CohortRequest) -> Result<PreprocessOutcome> {
        let start = Instant::now();
        let cohort = request.into_cohort()?;

        let encoded = CategoricalEncoder::new(&self.encoding_table).encode(raw);

        for (column, count) in encoded.report.unmapped_columns() {
            warn!(column, count, "Unrecognized values encoded as unmapped");
        }
        info!(
            rows = encoded.table.len(),
            encoded_columns = encoded.report.encoded_columns.len(),
            skipped_columns = encoded.report.skipped_columns.len(),
            unmapped = encoded.report.total_unmapped(),
            course = %cohort.course,
            "Preprocessed dataset"
        );

        let summary = PreprocessSummary {
            cohort: cohort.clone(),
            preview: encoded.table.preview(self.preview_rows),
            report: encoded.report.clone(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        Ok(PreprocessOutcome {
            encoded,
            cohort,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cohort::YearLevel;
    use crate::domain::encoding::UNMAPPED_CODE;
    use crate::domain::error::AppError;
    use crate::domain::table::CellValue;

    fn use_case() -> PreprocessUseCase {
        PreprocessUseCase::new(Arc::new(EncodingTable::student_default().unwrap()), 5)
    }

    fn cohort(section: &str) -> CohortRequest {
        CohortRequest {
            course: "BSIT".to_string(),
            custom_course: None,
            year: YearLevel::First,
            section: section.to_string(),
        }
    }

    fn raw() -> StudentTable {
        StudentTable::from_rows(
            vec!["Sex".to_string(), "Devices".to_string()],
            vec![
                vec![CellValue::text("Male"), CellValue::text("Yes")],
                vec![CellValue::text("Female"), CellValue::text("Maybe")],
            ],
        )
    }

    #[test]
    fn test_execute_encodes_and_reports() {
        let outcome = use_case().execute(&raw(), cohort("A")).unwrap();
        assert_eq!(outcome.cohort.section, "A");
        assert_eq!(outcome.summary.report.unmapped["Devices"], 1);
        assert_eq!(
            outcome.encoded.table.rows[1].get("Devices"),
            Some(&CellValue::Code(UNMAPPED_CODE))
        );
        assert_eq!(outcome.summary.preview.total_rows, 2);
    }

    #[test]
    fn test_invalid_cohort_stops_before_encoding() {
        let err = use_case().execute(&raw(), cohort("")).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
