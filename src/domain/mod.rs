pub mod chart;
pub mod cohort;
pub mod encoding;
pub mod error;
pub mod prediction;
pub mod report;
pub mod session;
pub mod table;
