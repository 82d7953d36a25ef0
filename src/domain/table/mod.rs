// ============================================================
// TABLE DOMAIN LAYER
// ============================================================
// Student rows and cell values shared by intake, encoding and prediction
// No I/O, no async

mod cell_value;
mod student_table;

pub use cell_value::CellValue;
pub use student_table::{Field, Record, StudentTable, TablePreview};
