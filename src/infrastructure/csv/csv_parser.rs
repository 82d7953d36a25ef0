// ============================================================
// CSV PARSER
// ============================================================
// Parse uploaded student CSV files with encoding and delimiter detection

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1252;
use std::collections::HashSet;

use crate::domain::error::{AppError, Result};
use crate::domain::table::{CellValue, StudentTable};

/// CSV parser producing typed student tables
pub struct CsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,

    /// Whether to trim whitespace from values
    trim: bool,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: true,
        }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse CSV content from string
    pub fn parse_content(&self, content: &str) -> Result<StudentTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .flexible(true) // Allow rows with different lengths
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();
        let headers = Self::validate_headers(&headers)?;

        let mut table = StudentTable::new(headers);
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            table.push_row(Self::parse_row(&record));
        }

        Ok(table)
    }

    /// Decode raw upload bytes, then parse with delimiter auto-detection
    pub fn parse_bytes_auto_detect(bytes: &[u8]) -> Result<StudentTable> {
        let content = decode_bytes(bytes);
        let delimiter = Self::detect_delimiter(&content);
        Self::default().with_delimiter(delimiter).parse_content(&content)
    }

    fn validate_headers(headers: &StringRecord) -> Result<Vec<String>> {
        if headers.is_empty() {
            return Err(AppError::ParseError("CSV file has no header row".to_string()));
        }

        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            let name = header.trim_start_matches('\u{feff}').trim();
            if name.is_empty() {
                return Err(AppError::ParseError(format!(
                    "CSV header {} is blank",
                    idx + 1
                )));
            }
            if !seen.insert(name.to_string()) {
                return Err(AppError::ParseError(format!(
                    "CSV header '{}' appears more than once",
                    name
                )));
            }
            names.push(name.to_string());
        }
        Ok(names)
    }

    fn parse_row(record: &StringRecord) -> Vec<CellValue> {
        record.iter().map(CellValue::from_raw).collect()
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<_> = content.lines().take(10).collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

/// UTF-8 first, Windows-1252 for spreadsheets exported with a legacy code page
fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(content) => content.to_string(),
        Err(_) => {
            let (content, _, _) = WINDOWS_1252.decode(bytes);
            content.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let content = "Name,Age,Sex\nAlice,19,Female\nBob,24,Male";
        let table = CsvParser::new().parse_content(content).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.headers, vec!["Name", "Age", "Sex"]);
        assert_eq!(table.rows[0].get("Name"), Some(&CellValue::text("Alice")));
        assert_eq!(table.rows[0].get("Age"), Some(&CellValue::number(19.0)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(CsvParser::detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(CsvParser::detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(CsvParser::detect_delimiter("a\tb\tc\nd\te\tf"), b'\t');
        assert_eq!(CsvParser::detect_delimiter(""), b',');
    }

    #[test]
    fn test_auto_detect_semicolon_upload() {
        let table =
            CsvParser::parse_bytes_auto_detect(b"Sex;Scholarship\nMale;Yes\nFemale;No").unwrap();
        assert_eq!(table.headers, vec!["Sex", "Scholarship"]);
        assert_eq!(table.rows[1].get("Scholarship"), Some(&CellValue::text("No")));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = CsvParser::new()
            .parse_content("Sex,Age,Devices\nMale,19\n")
            .unwrap();
        assert_eq!(table.rows[0].get("Devices"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_trims_values_and_keeps_labels_with_spaces() {
        let table = CsvParser::new()
            .parse_content("Study_Hours\n  2-3 hours  \n")
            .unwrap();
        assert_eq!(
            table.rows[0].get("Study_Hours"),
            Some(&CellValue::text("2-3 hours"))
        );
    }

    #[test]
    fn test_rejects_duplicate_headers() {
        let err = CsvParser::new().parse_content("Sex,Sex\nMale,Male").unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }

    #[test]
    fn test_rejects_blank_header() {
        let err = CsvParser::new().parse_content("Sex,,Age\nMale,x,19").unwrap_err();
        assert!(err.to_string().contains("blank"));
    }

    #[test]
    fn test_strips_utf8_bom() {
        let table = CsvParser::parse_bytes_auto_detect("\u{feff}Sex\nMale".as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["Sex"]);
    }

    #[test]
    fn test_decodes_windows_1252() {
        // "Parañaque" with 0xF1 for ñ
        let bytes = b"Name,Sex\nPara\xf1aque,Male";
        let table = CsvParser::parse_bytes_auto_detect(bytes).unwrap();
        assert_eq!(table.rows[0].get("Name"), Some(&CellValue::text("Parañaque")));
    }

    #[test]
    fn test_header_only_file_is_empty_table() {
        let table = CsvParser::new().parse_content("Sex,Age\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers.len(), 2);
    }
}
