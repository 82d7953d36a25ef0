// ============================================================
// REPORT USE CASE
// ============================================================
// Plain-text risk summary for one cohort

use chrono::{DateTime, Utc};
use std::fmt::Write;
use validator::Validate;

use crate::domain::cohort::CohortInfo;
use crate::domain::error::{AppError, Result};
use crate::domain::prediction::{PredictionResults, RiskStatus};
use crate::domain::report::{ReportRequest, RiskReport};

pub struct ReportUseCase;

impl ReportUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(
        &self,
        request: &ReportRequest,
        cohort: &CohortInfo,
        results: &PredictionResults,
    ) -> Result<RiskReport> {
        self.generate_at(request, cohort, results, Utc::now())
    }

    pub fn generate_at(
        &self,
        request: &ReportRequest,
        cohort: &CohortInfo,
        results: &PredictionResults,
        generated_at: DateTime<Utc>,
    ) -> Result<RiskReport> {
        request.validate()?;

        let mut text = String::new();
        self.write_report(&mut text, request, cohort, results, generated_at)
            .map_err(|e| AppError::Internal(format!("Failed to format report: {}", e)))?;

        Ok(RiskReport { text, generated_at })
    }

    fn write_report(
        &self,
        out: &mut String,
        request: &ReportRequest,
        cohort: &CohortInfo,
        results: &PredictionResults,
        generated_at: DateTime<Utc>,
    ) -> std::fmt::Result {
        let header = request.header.trim();
        writeln!(out, "{}", header)?;
        writeln!(out, "{}", "=".repeat(header.chars().count()))?;
        writeln!(
            out,
            "Report generated for {} - {} - Section {}",
            cohort.course, cohort.year, cohort.section
        )?;
        writeln!(out, "Generated at: {}", generated_at.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(out)?;

        let total = results.total();
        writeln!(out, "Total students: {}", total)?;
        for status in RiskStatus::ALL {
            let count = results.count(status);
            writeln!(out, "{}: {} ({:.1}%)", status, count, percentage(count, total))?;
        }
        writeln!(out)?;

        let rows = results.at_risk_rows();
        if rows.is_empty() {
            writeln!(out, "No students were flagged at risk.")?;
        } else {
            let rows = rows
                .iter()
                .map(|row| row.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(out, "Students at risk (row numbers): {}", rows)?;
        }
        writeln!(out)?;
        write!(out, "{}", request.footer.trim())
    }
}

impl Default for ReportUseCase {
    fn default() -> Self {
        Self::new()
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cohort::YearLevel;
    use crate::domain::table::StudentTable;
    use chrono::TimeZone;

    fn cohort() -> CohortInfo {
        CohortInfo {
            course: "BSIT".to_string(),
            year: YearLevel::Third,
            section: "B".to_string(),
        }
    }

    fn results(statuses: Vec<RiskStatus>) -> PredictionResults {
        let at_risk = statuses.iter().filter(|s| **s == RiskStatus::AtRisk).count();
        PredictionResults {
            table: StudentTable::default(),
            low_risk: statuses.len() - at_risk,
            at_risk,
            statuses,
        }
    }

    #[test]
    fn test_report_text() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap();
        let report = ReportUseCase::new()
            .generate_at(
                &ReportRequest::default(),
                &cohort(),
                &results(vec![
                    RiskStatus::LowRisk,
                    RiskStatus::AtRisk,
                    RiskStatus::LowRisk,
                ]),
                at,
            )
            .unwrap();

        let expected = "\
Student Risk Report
===================
Report generated for BSIT - 3rd Year - Section B
Generated at: 2025-03-01 08:30 UTC

Total students: 3
At Risk: 1 (33.3%)
Low Risk: 2 (66.7%)

Students at risk (row numbers): 2

End of Report";
        assert_eq!(report.text, expected);
        assert_eq!(report.generated_at, at);
    }

    #[test]
    fn test_report_without_at_risk_students() {
        let report = ReportUseCase::new()
            .generate(&ReportRequest::default(), &cohort(), &results(Vec::new()))
            .unwrap();
        assert!(report.text.contains("Total students: 0"));
        assert!(report.text.contains("At Risk: 0 (0.0%)"));
        assert!(report.text.contains("No students were flagged at risk."));
    }

    #[test]
    fn test_custom_header_and_validation() {
        let request = ReportRequest {
            header: "Midterm Watchlist".to_string(),
            footer: "Prepared by the guidance office".to_string(),
        };
        let report = ReportUseCase::new()
            .generate(&request, &cohort(), &results(vec![RiskStatus::AtRisk]))
            .unwrap();
        assert!(report.text.starts_with("Midterm Watchlist\n=================\n"));
        assert!(report.text.ends_with("Prepared by the guidance office"));

        let empty = ReportRequest {
            header: String::new(),
            footer: "x".to_string(),
        };
        assert!(matches!(
            ReportUseCase::new().generate(&empty, &cohort(), &results(Vec::new())),
            Err(AppError::ValidationError(_))
        ));
    }
}
