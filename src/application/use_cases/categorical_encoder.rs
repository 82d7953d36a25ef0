// ============================================================
// CATEGORICAL ENCODER
// ============================================================
// Replace survey labels with integer codes, column by column

use crate::domain::encoding::{EncodedTable, EncodingReport, EncodingTable, UNMAPPED_CODE};
use crate::domain::table::{CellValue, StudentTable};

/// Pure encoder over a validated [`EncodingTable`].
///
/// Row count, row order and column order are preserved; only values of
/// declared columns change. Unrecognized values become [`UNMAPPED_CODE`] and
/// are counted in the [`EncodingReport`] instead of failing the pass.
#[derive(Debug, Clone, Copy)]
pub struct CategoricalEncoder<'a> {
    spec: &'a EncodingTable,
}

impl<'a> CategoricalEncoder<'a> {
    pub fn new(spec: &'a EncodingTable) -> Self {
        Self { spec }
    }

    pub fn encode(&self, table: &StudentTable) -> EncodedTable {
        let mut encoded = table.clone();
        let mut report = EncodingReport::default();

        for rule in self.spec.fields() {
            let Some(position) = table.column_position(rule.name()) else {
                report.skipped_columns.push(rule.name().to_string());
                continue;
            };

            let mut unmapped = 0;
            for row in encoded.rows.iter_mut() {
                let cell = &mut row.fields[position].value;
                let code = rule.apply(cell).unwrap_or_else(|| {
                    unmapped += 1;
                    UNMAPPED_CODE
                });
                *cell = CellValue::Code(code);
            }

            report.encoded_columns.push(rule.name().to_string());
            report.unmapped.insert(rule.name().to_string(), unmapped);
        }

        EncodedTable {
            table: encoded,
            report,
        }
    }
}

/// Encode `table` with `spec`
pub fn encode(table: &StudentTable, spec: &EncodingTable) -> EncodedTable {
    CategoricalEncoder::new(spec).encode(table)
}
