pub mod logistic;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::error::Result;
use crate::domain::prediction::FeatureImportance;
use crate::domain::table::StudentTable;
use logistic::LogisticClassifier;

/// Trained model behind a narrow seam: encoded rows in, binary labels out.
pub trait Classifier: Send + Sync {
    /// One label per row, in row order (1 = at risk, 0 = low risk)
    fn predict(&self, table: &StudentTable) -> Result<Vec<u8>>;

    /// Per-feature weights, when the model can explain itself
    fn feature_importances(&self) -> Option<Vec<FeatureImportance>> {
        None
    }
}

/// Load the model if its file exists.
///
/// A missing file is not fatal: the dashboard still serves upload and
/// preprocessing, and prediction reports that no model is loaded.
pub fn load_classifier(path: &Path) -> Result<Option<Arc<dyn Classifier>>> {
    if !path.exists() {
        warn!(model_path = %path.display(), "Trained model not found; predictions disabled");
        return Ok(None);
    }

    let classifier = LogisticClassifier::from_file(path)?;
    info!(
        model_path = %path.display(),
        features = classifier.features().len(),
        "Loaded trained model"
    );
    Ok(Some(Arc::new(classifier)))
}
