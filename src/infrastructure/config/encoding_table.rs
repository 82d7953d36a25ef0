use figment::providers::{Format, Toml};
use figment::Figment;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::domain::encoding::{EncodingTable, FieldSpec};
use crate::domain::error::{AppError, Result};

#[derive(Debug, Deserialize)]
struct EncodingTableFile {
    fields: Vec<FieldSpec>,
}

/// Built-in student table, or the `[[fields]]` of a TOML override file.
///
/// Any problem with the override is a startup error.
pub fn load_encoding_table(path: Option<&Path>) -> Result<EncodingTable> {
    let Some(path) = path else {
        return EncodingTable::student_default();
    };

    if !path.is_file() {
        return Err(AppError::ConfigurationError(format!(
            "encoding table file {} does not exist",
            path.display()
        )));
    }

    let table = parse_encoding_table(Figment::from(Toml::file(path)))?;
    info!(
        path = %path.display(),
        fields = table.len(),
        "Loaded encoding table override"
    );
    Ok(table)
}

fn parse_encoding_table(figment: Figment) -> Result<EncodingTable> {
    let file: EncodingTableFile = figment
        .extract()
        .map_err(|e| AppError::ConfigurationError(format!("invalid encoding table: {}", e)))?;
    if file.fields.is_empty() {
        return Err(AppError::ConfigurationError(
            "encoding table declares no fields".to_string(),
        ));
    }
    EncodingTable::new(file.fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::CellValue;

    const OVERRIDE: &str = r#"
        [[fields]]
        name = "Age"
        kind = "threshold"
        otherwise = 2
        breakpoints = [
            { op = "at_most", cutoff = 20, code = 0 },
            { op = "at_most", cutoff = 23, code = 1 },
        ]

        [[fields]]
        name = "Sex"
        kind = "lookup"
        codomain = [0, 1]
        entries = [
            { label = "Male", code = 0 },
            { label = "Female", code = 1 },
        ]
    "#;

    #[test]
    fn test_parses_toml_override() {
        let table = parse_encoding_table(Figment::from(Toml::string(OVERRIDE))).unwrap();
        assert_eq!(table.len(), 2);
        let age = table.get("Age").unwrap();
        assert_eq!(age.apply(&CellValue::number(21.0)), Some(1));
        let sex = table.get("Sex").unwrap();
        assert_eq!(sex.apply(&CellValue::text("Female")), Some(1));
    }

    #[test]
    fn test_rejects_invalid_override() {
        let broken = OVERRIDE.replace("cutoff = 23", "cutoff = 19");
        let err = parse_encoding_table(Figment::from(Toml::string(&broken))).unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(_)));
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let broken = OVERRIDE.replace("kind = \"lookup\"", "kind = \"fuzzy\"");
        assert!(parse_encoding_table(Figment::from(Toml::string(&broken))).is_err());
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = load_encoding_table(Some(Path::new("does/not/exist.toml"))).unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(_)));
    }

    #[test]
    fn test_defaults_to_student_table() {
        let table = load_encoding_table(None).unwrap();
        assert!(table.contains("Daily_Allowance"));
    }
}
