use crate::domain::cohort::CohortInfo;
use crate::domain::encoding::EncodedTable;
use crate::domain::prediction::PredictionResults;
use crate::domain::table::StudentTable;

/// Everything one dashboard session has produced so far.
///
/// Each stage invalidates the stages after it, so predictions never outlive
/// the dataset they were made from.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub raw: Option<StudentTable>,
    pub encoded: Option<EncodedTable>,
    pub cohort: Option<CohortInfo>,
    pub predictions: Option<PredictionResults>,
}

impl SessionContext {
    pub fn set_raw(&mut self, table: StudentTable) {
        self.raw = Some(table);
        self.encoded = None;
        self.cohort = None;
        self.predictions = None;
    }

    pub fn set_encoded(&mut self, encoded: EncodedTable, cohort: CohortInfo) {
        self.encoded = Some(encoded);
        self.cohort = Some(cohort);
        self.predictions = None;
    }

    pub fn set_predictions(&mut self, predictions: PredictionResults) {
        self.predictions = Some(predictions);
    }
}
