// ============================================================
// DATASET INTAKE USE CASE
// ============================================================
// Turn an uploaded CSV into a raw student table and its preview

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::domain::error::{AppError, Result};
use crate::domain::table::{StudentTable, TablePreview};
use crate::infrastructure::csv::CsvParser;

/// Parsed upload, ready to be stored in the session
#[derive(Debug, Clone)]
pub struct DatasetIntake {
    pub table: StudentTable,
    pub summary: IntakeSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntakeSummary {
    pub preview: TablePreview,
    pub processing_time_ms: u64,
}

pub struct DatasetIntakeUseCase {
    max_upload_bytes: usize,
    preview_rows: usize,
}

impl DatasetIntakeUseCase {
    pub fn new(max_upload_bytes: usize, preview_rows: usize) -> Self {
        Self {
            max_upload_bytes,
            preview_rows,
        }
    }

    pub fn ingest(&self, bytes: &[u8]) -> Result<DatasetIntake> {
        let start = Instant::now();

        if bytes.is_empty() {
            return Err(AppError::ValidationError(
                "Uploaded file is empty".to_string(),
            ));
        }
        if bytes.len() > self.max_upload_bytes {
            return Err(AppError::ValidationError(format!(
                "Uploaded file is {} bytes, limit is {}",
                bytes.len(),
                self.max_upload_bytes
            )));
        }

        let table = CsvParser::parse_bytes_auto_detect(bytes)?;
        let preview = table.preview(self.preview_rows);

        info!(
            rows = table.len(),
            columns = table.headers.len(),
            "Parsed uploaded dataset"
        );

        Ok(DatasetIntake {
            table,
            summary: IntakeSummary {
                preview,
                processing_time_ms: start.elapsed().as_millis() as u64,
            },
        })
    }
}
