//! Report serialization errors.

use super::error_code::{self, SerguardErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SerguardErrorCode for ReportError {
    fn error_code(&self) -> &'static str {
        error_code::REPORT_ERROR
    }
}
