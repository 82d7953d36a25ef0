pub mod categorical_encoder;
pub mod dataset_intake;
pub mod preprocess;
pub mod report;
pub mod risk_prediction;
pub mod visualization;
