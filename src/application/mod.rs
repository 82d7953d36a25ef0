pub mod use_cases;

pub use use_cases::categorical_encoder::{encode, CategoricalEncoder};
pub use use_cases::dataset_intake::{DatasetIntake, DatasetIntakeUseCase, IntakeSummary};
pub use use_cases::preprocess::{PreprocessOutcome, PreprocessSummary, PreprocessUseCase};
pub use use_cases::report::ReportUseCase;
pub use use_cases::risk_prediction::RiskPredictionUseCase;
pub use use_cases::visualization::VisualizationUseCase;
