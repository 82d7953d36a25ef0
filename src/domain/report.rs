use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_header() -> String {
    "Student Risk Report".to_string()
}

fn default_footer() -> String {
    "End of Report".to_string()
}

/// Editable header and footer of the generated report
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportRequest {
    #[serde(default = "default_header")]
    #[validate(length(min = 1, max = 200))]
    pub header: String,

    #[serde(default = "default_footer")]
    #[validate(length(min = 1, max = 200))]
    pub footer: String,
}

impl Default for ReportRequest {
    fn default() -> Self {
        Self {
            header: default_header(),
            footer: default_footer(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub text: String,
    pub generated_at: DateTime<Utc>,
}
