use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::table::StudentTable;

/// Per-pass data quality summary of an encode run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EncodingReport {
    /// Declared fields found in the table, in encoding-table order
    pub encoded_columns: Vec<String>,

    /// Declared fields absent from the table
    pub skipped_columns: Vec<String>,

    /// Unmapped value count for every encoded column (zero included)
    pub unmapped: BTreeMap<String, usize>,
}

impl EncodingReport {
    pub fn total_unmapped(&self) -> usize {
        self.unmapped.values().sum()
    }

    pub fn has_unmapped(&self) -> bool {
        self.total_unmapped() > 0
    }

    /// Columns with at least one unmapped value
    pub fn unmapped_columns(&self) -> Vec<(&str, usize)> {
        self.unmapped
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(column, count)| (column.as_str(), *count))
            .collect()
    }
}

/// Output of the categorical encoder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedTable {
    pub table: StudentTable,
    pub report: EncodingReport,
}
