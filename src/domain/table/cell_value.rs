// ============================================================
// CELL VALUE
// ============================================================
// One raw or encoded value inside a student table

use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// A single cell of a [`StudentTable`](super::StudentTable).
///
/// Raw uploads only ever contain `Text`, `Number` and `Empty`. `Code` is
/// produced by the categorical encoder and is what the classifier consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Integer code written by the encoder (including the unmapped sentinel)
    Code(i64),

    /// Finite numeric value parsed from the upload, with its text as uploaded
    Number { value: f64, raw: String },

    /// Any other non-blank text
    Text(String),

    /// Blank cell, serialized as `null`
    Empty,
}

impl CellValue {
    /// Classify a raw CSV value
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => CellValue::Number {
                value,
                raw: trimmed.to_string(),
            },
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    /// Number written in canonical form (`19.0` is spelled `"19"`)
    pub fn number(value: f64) -> Self {
        CellValue::Number {
            value,
            raw: value.to_string(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Label used for exact-match lookups.
    ///
    /// Numbers match by their uploaded spelling, so `"01"` and `"1.0"` only
    /// hit mapping keys written exactly that way.
    pub fn label(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Text(text) => Some(Cow::Borrowed(text.as_str())),
            CellValue::Number { raw, .. } => Some(Cow::Borrowed(raw.as_str())),
            CellValue::Code(code) => Some(Cow::Owned(code.to_string())),
            CellValue::Empty => None,
        }
    }

    /// Numeric view used by threshold fields and the classifier
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number { value, .. } => Some(*value),
            CellValue::Code(code) => Some(*code as f64),
            CellValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite()),
            CellValue::Empty => None,
        }
    }

    pub fn as_code(&self) -> Option<i64> {
        match self {
            CellValue::Code(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Code(code) => write!(f, "{}", code),
            CellValue::Number { raw, .. } => write!(f, "{}", raw),
            CellValue::Text(text) => write!(f, "{}", text),
            CellValue::Empty => Ok(()),
        }
    }
}

/// Plain JSON scalars: codes and numbers as numbers, text as a string, blanks as `null`
impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Code(code) => serializer.serialize_i64(*code),
            CellValue::Number { value, .. } => serializer.serialize_f64(*value),
            CellValue::Text(text) => serializer.serialize_str(text),
            CellValue::Empty => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_classifies_values() {
        assert_eq!(CellValue::from_raw("  "), CellValue::Empty);
        assert_eq!(CellValue::from_raw("19"), CellValue::number(19.0));
        assert_eq!(CellValue::from_raw(" 89.9 "), CellValue::number(89.9));
        assert_eq!(CellValue::from_raw("Male"), CellValue::text("Male"));
        assert_eq!(CellValue::from_raw("NaN"), CellValue::text("NaN"));
    }

    #[test]
    fn test_label_renders_numbers_canonically() {
        assert_eq!(CellValue::number(19.0).label().as_deref(), Some("19"));
        assert_eq!(CellValue::number(2.5).label().as_deref(), Some("2.5"));
        assert_eq!(CellValue::Code(0).label().as_deref(), Some("0"));
        assert_eq!(CellValue::Empty.label(), None);
    }

    #[test]
    fn test_label_keeps_uploaded_spelling() {
        assert_eq!(CellValue::from_raw("1.0").label().as_deref(), Some("1.0"));
        assert_eq!(CellValue::from_raw(" 01 ").label().as_deref(), Some("01"));
        assert_eq!(CellValue::from_raw("+1").label().as_deref(), Some("+1"));
        assert_eq!(CellValue::from_raw("01").as_number(), Some(1.0));
        assert_eq!(serde_json::to_value(CellValue::from_raw("1.50")).unwrap(), 1.5);
    }

    #[test]
    fn test_as_number_accepts_numeric_text() {
        assert_eq!(CellValue::text(" 21 ").as_number(), Some(21.0));
        assert_eq!(CellValue::text("twenty").as_number(), None);
        assert_eq!(CellValue::Code(2).as_number(), Some(2.0));
    }
}
