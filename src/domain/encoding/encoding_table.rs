// ============================================================
// ENCODING TABLE
// ============================================================
// Ordered, validated set of field rules fixed at startup

use serde::Serialize;
use std::collections::HashSet;

use super::{Breakpoint, FieldRule, FieldSpec};
use crate::domain::error::{AppError, Result};

/// Validated encoding rules, one per categorical column
#[derive(Debug, Clone, Serialize)]
pub struct EncodingTable {
    fields: Vec<FieldRule>,
}

impl EncodingTable {
    /// Compile every spec, failing on the first configuration error
    pub fn new(specs: Vec<FieldSpec>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(specs.len());
        let mut fields = Vec::with_capacity(specs.len());

        for spec in specs {
            if !seen.insert(spec.name.clone()) {
                return Err(AppError::ConfigurationError(format!(
                    "field '{}' is declared more than once",
                    spec.name
                )));
            }
            fields.push(spec.compile()?);
        }

        Ok(Self { fields })
    }

    /// The survey fields of the student risk questionnaire
    pub fn student_default() -> Result<Self> {
        Self::new(student_field_specs())
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

const YES_NO: &[(&str, i64)] = &[("No", 0), ("Yes", 1)];

const FREQUENCY: &[(&str, i64)] = &[("Never", 0), ("Rarely", 1), ("Sometimes", 2), ("Always", 3)];

fn student_field_specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::threshold(
            "Age",
            vec![Breakpoint::at_most(20.0, 0), Breakpoint::at_most(23.0, 1)],
            2,
        ),
        FieldSpec::lookup("Sex", &[("Male", 0), ("Female", 1)]),
        FieldSpec::lookup("Scholarship", YES_NO),
        FieldSpec::lookup("Type_of_High_School", &[("Public", 0), ("Private", 1)]),
        FieldSpec::threshold("SHS_GWA", vec![Breakpoint::at_least(90.0, 0)], 1),
        FieldSpec::lookup(
            "Entrance_Exam_Result",
            &[("1st qualifier", 0), ("2nd qualifier", 1)],
        ),
        FieldSpec::lookup(
            "Study_Hours",
            &[
                ("Less than 1 hour", 0),
                ("2-3 hours", 1),
                ("4-5 hours", 2),
                ("More than 5 hours", 3),
            ],
        ),
        FieldSpec::lookup("Submission_Activities", FREQUENCY),
        FieldSpec::lookup("Consultation", FREQUENCY),
        FieldSpec::lookup(
            "Attendance",
            &[
                ("Below 30 days (<50%)", 0),
                ("44-30 days (50-69%)", 1),
                ("59-45 days (70-89%)", 2),
                ("70-60 days (90-100%)", 3),
            ],
        ),
        FieldSpec::lookup("Part_Time_Job", YES_NO),
        FieldSpec::lookup("Devices", YES_NO),
        FieldSpec::lookup("Internet_Access", YES_NO),
        FieldSpec::lookup(
            "Daily_Allowance",
            &[
                ("Below Php 50", 0),
                ("Php 50-100", 1),
                ("Php 101-200", 2),
                ("More than Php 200", 3),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::CellValue;

    #[test]
    fn test_student_default_is_valid() {
        let table = EncodingTable::student_default().unwrap();
        assert_eq!(table.len(), 14);
        assert!(table.contains("Internet_Access"));
        assert_eq!(table.fields()[0].name(), "Age");
    }

    #[test]
    fn test_student_binary_and_ordinal_codomains() {
        let table = EncodingTable::student_default().unwrap();
        for name in ["Sex", "Scholarship", "Type_of_High_School", "Part_Time_Job", "Devices"] {
            let codes: Vec<i64> = table.get(name).unwrap().codomain().iter().copied().collect();
            assert_eq!(codes, vec![0, 1], "{}", name);
        }
        for name in ["Study_Hours", "Consultation", "Attendance", "Daily_Allowance"] {
            let codes: Vec<i64> = table.get(name).unwrap().codomain().iter().copied().collect();
            assert_eq!(codes, vec![0, 1, 2, 3], "{}", name);
        }
    }

    #[test]
    fn test_shs_gwa_boundary() {
        let table = EncodingTable::student_default().unwrap();
        let gwa = table.get("SHS_GWA").unwrap();
        assert_eq!(gwa.apply(&CellValue::number(90.0)), Some(0));
        assert_eq!(gwa.apply(&CellValue::number(89.9)), Some(1));
    }

    #[test]
    fn test_rejects_duplicate_field_names() {
        let err = EncodingTable::new(vec![
            FieldSpec::lookup("Sex", &[("Male", 0)]),
            FieldSpec::lookup("Sex", &[("Female", 1)]),
        ])
        .unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(_)));
    }

    #[test]
    fn test_serializes_compiled_codomain() {
        let table = EncodingTable::new(vec![FieldSpec::lookup("Sex", &[("Male", 0), ("Female", 1)])])
            .unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["fields"][0]["name"], "Sex");
        assert_eq!(json["fields"][0]["kind"], "lookup");
        assert_eq!(json["fields"][0]["codomain"], serde_json::json!([0, 1]));
    }
}
