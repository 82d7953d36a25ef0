use std::sync::Arc;

use tracing::{error, info};

use crate::application::{
    DatasetIntakeUseCase, PreprocessUseCase, ReportUseCase, RiskPredictionUseCase,
    VisualizationUseCase,
};
use crate::domain::error::Result;
use crate::infrastructure::config::{load_encoding_table, AppConfig};
use crate::infrastructure::model::load_classifier;
use crate::infrastructure::session_store::SessionStore;
use crate::interfaces::http::AppState;

/// Wire the use cases from configuration.
///
/// A bad encoding table or a malformed model file aborts startup; a missing
/// model file only disables prediction.
pub fn build_state(config: AppConfig) -> Result<AppState> {
    let encoding_table = load_encoding_table(config.encoding_table_path.as_deref()).map_err(|err| {
        error!(error = %err, "Failed to load encoding table");
        err
    })?;
    info!(fields = encoding_table.len(), "Encoding table ready");

    let classifier = load_classifier(&config.model_path).map_err(|err| {
        error!(
            error = %err,
            model_path = %config.model_path.display(),
            "Failed to load trained model"
        );
        err
    })?;

    Ok(AppState {
        sessions: SessionStore::new(config.session_idle_ttl()),
        intake_use_case: DatasetIntakeUseCase::new(config.max_upload_bytes, config.preview_rows),
        preprocess_use_case: PreprocessUseCase::new(Arc::new(encoding_table), config.preview_rows),
        prediction_use_case: RiskPredictionUseCase::new(classifier),
        visualization_use_case: VisualizationUseCase::new(),
        report_use_case: ReportUseCase::new(),
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use std::path::PathBuf;

    #[test]
    fn test_builds_without_model_file() {
        let config = AppConfig {
            model_path: PathBuf::from("does-not-exist/model.json"),
            ..AppConfig::default()
        };
        let state = build_state(config).unwrap();
        assert!(!state.prediction_use_case.has_model());
        assert_eq!(state.preprocess_use_case.encoding_table().len(), 14);
    }

    #[test]
    fn test_missing_encoding_table_is_fatal() {
        let config = AppConfig {
            encoding_table_path: Some(PathBuf::from("does-not-exist/fields.toml")),
            ..AppConfig::default()
        };
        assert!(matches!(
            build_state(config),
            Err(AppError::ConfigurationError(_))
        ));
    }
}
