//! Error handling for serguard.
//! One error enum per subsystem, `thiserror` only.

pub mod analysis_error;
pub mod config_error;
pub mod error_code;
pub mod model_error;
pub mod report_error;

pub use analysis_error::AnalysisError;
pub use config_error::ConfigError;
pub use error_code::SerguardErrorCode;
pub use model_error::ModelError;
pub use report_error::ReportError;
