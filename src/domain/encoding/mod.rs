// ============================================================
// ENCODING DOMAIN LAYER
// ============================================================
// Field specs and the validated encoding table
// No I/O, no async

mod encoded_table;
mod encoding_table;
mod field_spec;

pub use encoded_table::{EncodedTable, EncodingReport};
pub use encoding_table::EncodingTable;
pub use field_spec::{Breakpoint, Comparison, FieldKind, FieldRule, FieldSpec, LookupEntry};

/// Code written for a value no field rule recognizes.
/// Never part of any field's codomain.
pub const UNMAPPED_CODE: i64 = -1;
