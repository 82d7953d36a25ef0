use crate::application::{
    DatasetIntakeUseCase, PreprocessUseCase, ReportUseCase, RiskPredictionUseCase,
    VisualizationUseCase,
};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::session_store::SessionStore;

/// Shared state behind every HTTP handler
pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionStore,
    pub intake_use_case: DatasetIntakeUseCase,
    pub preprocess_use_case: PreprocessUseCase,
    pub prediction_use_case: RiskPredictionUseCase,
    pub visualization_use_case: VisualizationUseCase,
    pub report_use_case: ReportUseCase,
}
