//! Top-level analysis errors.

use super::error_code::{self, SerguardErrorCode};
use super::{ConfigError, ModelError, ReportError};

/// Errors surfaced to a host driving serguard end to end.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Analysis cancelled")]
    Cancelled,
}

impl SerguardErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Model(e) => e.error_code(),
            Self::Report(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}
