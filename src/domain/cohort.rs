use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::domain::error::{AppError, Result};

/// Courses offered in the course picker. Anything else goes through "Other".
pub const COURSE_OPTIONS: &[&str] = &["BSAB", "BSCrim", "BSIT", "BEED", "BSED", "BSHM"];

pub const OTHER_COURSE: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YearLevel {
    #[serde(rename = "1st Year")]
    First,
    #[serde(rename = "2nd Year")]
    Second,
    #[serde(rename = "3rd Year")]
    Third,
    #[serde(rename = "4th Year")]
    Fourth,
}

impl fmt::Display for YearLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearLevel::First => write!(f, "1st Year"),
            YearLevel::Second => write!(f, "2nd Year"),
            YearLevel::Third => write!(f, "3rd Year"),
            YearLevel::Fourth => write!(f, "4th Year"),
        }
    }
}

/// Course/year/section chosen when a dataset is preprocessed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortInfo {
    pub course: String,
    pub year: YearLevel,
    pub section: String,
}

/// Cohort as submitted from the preprocessing form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CohortRequest {
    #[validate(length(min = 1, max = 64))]
    pub course: String,

    /// Required when `course` is "Other"
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub custom_course: Option<String>,

    pub year: YearLevel,

    #[validate(length(min = 1, max = 32))]
    pub section: String,
}

impl CohortRequest {
    /// Validate the form and resolve the "Other" course to its custom name
    pub fn into_cohort(self) -> Result<CohortInfo> {
        self.validate()?;

        let course = if self.course == OTHER_COURSE {
            let custom = self
                .custom_course
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| {
                    AppError::ValidationError(
                        "custom_course is required when course is 'Other'".to_string(),
                    )
                })?;
            custom.to_string()
        } else if COURSE_OPTIONS.contains(&self.course.as_str()) {
            self.course
        } else {
            return Err(AppError::ValidationError(format!(
                "Unknown course '{}'",
                self.course
            )));
        };

        let section = self.section.trim();
        if section.is_empty() {
            return Err(AppError::ValidationError(
                "section must not be blank".to_string(),
            ));
        }

        Ok(CohortInfo {
            course,
            year: self.year,
            section: section.to_string(),
        })
    }
}
