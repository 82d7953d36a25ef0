// ============================================================
// STUDENT TABLE TYPES
// ============================================================
// Ordered rows of student data, raw or encoded

use serde::Serialize;

use super::CellValue;
use crate::domain::error::{AppError, Result};

/// A single named cell in a record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Column name (header)
    pub name: String,

    /// Cell value
    pub value: CellValue,
}

/// One student's row. Field order always equals the table's header order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Row index (0-based)
    pub index: usize,

    /// All fields in this row
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(index: usize, fields: Vec<Field>) -> Self {
        Self { index, fields }
    }

    /// Value of the named column, if the record has it
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.fields.iter().map(|field| &field.value)
    }
}

/// Tabular student data as uploaded (raw) or after encoding
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudentTable {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

impl StudentTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table from positional rows.
    ///
    /// Short rows are padded with [`CellValue::Empty`]; values beyond the
    /// header count are dropped.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut table = Self::new(headers);
        for values in rows {
            table.push_row(values);
        }
        table
    }

    /// Append a positional row, aligning it to the headers
    pub fn push_row(&mut self, values: Vec<CellValue>) {
        let mut values = values.into_iter();
        let fields = self
            .headers
            .iter()
            .map(|name| Field {
                name: name.clone(),
                value: values.next().unwrap_or(CellValue::Empty),
            })
            .collect();
        let index = self.rows.len();
        self.rows.push(Record::new(index, fields));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// All values of one column in row order
    pub fn column(&self, name: &str) -> Option<Vec<&CellValue>> {
        let position = self.column_position(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| &row.fields[position].value)
                .collect(),
        )
    }

    /// Copy of this table with one more column appended on the right
    pub fn with_column(&self, name: &str, values: Vec<CellValue>) -> Result<StudentTable> {
        if self.has_column(name) {
            return Err(AppError::ValidationError(format!(
                "Column '{}' already exists",
                name
            )));
        }
        if values.len() != self.rows.len() {
            return Err(AppError::ValidationError(format!(
                "Column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        let mut table = self.clone();
        table.headers.push(name.to_string());
        for (row, value) in table.rows.iter_mut().zip(values) {
            row.fields.push(Field {
                name: name.to_string(),
                value,
            });
        }
        Ok(table)
    }

    /// First `count` rows in positional form, plus the total row count
    pub fn preview(&self, count: usize) -> TablePreview {
        TablePreview {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .take(count)
                .map(|row| row.values().cloned().collect())
                .collect(),
            total_rows: self.rows.len(),
        }
    }
}

/// Head of a table as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub total_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StudentTable {
        StudentTable::from_rows(
            vec!["Name".to_string(), "Age".to_string()],
            vec![
                vec![CellValue::text("Ana"), CellValue::number(19.0)],
                vec![CellValue::text("Ben")],
            ],
        )
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let table = sample();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].get("Age"), Some(&CellValue::Empty));
        assert_eq!(table.rows[1].index, 1);
    }

    #[test]
    fn test_with_column_appends_on_the_right() {
        let table = sample()
            .with_column("Flag", vec![CellValue::Code(1), CellValue::Code(0)])
            .unwrap();
        assert_eq!(table.headers.last().map(String::as_str), Some("Flag"));
        assert_eq!(table.rows[0].fields.len(), 3);
        assert_eq!(table.rows[1].get("Flag"), Some(&CellValue::Code(0)));
    }

    #[test]
    fn test_with_column_rejects_length_mismatch() {
        let err = sample()
            .with_column("Flag", vec![CellValue::Code(1)])
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_preview_keeps_total_rows() {
        let preview = sample().preview(1);
        assert_eq!(preview.rows.len(), 1);
        assert_eq!(preview.total_rows, 2);
    }
}
