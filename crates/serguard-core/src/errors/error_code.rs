//! SerguardErrorCode trait for host-facing error codes.

/// Stable error codes for hosts that surface serguard failures.
/// Every error enum implements this so callers can match on a code
/// instead of a message.
pub trait SerguardErrorCode {
    /// Returns the error code string (e.g., "CONFIG_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted host string: `[ERROR_CODE] message`.
    fn host_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const MODEL_ERROR: &str = "MODEL_ERROR";
pub const DUPLICATE_TYPE: &str = "DUPLICATE_TYPE";
pub const ARITY_MISMATCH: &str = "ARITY_MISMATCH";
pub const REPORT_ERROR: &str = "REPORT_ERROR";
pub const CANCELLED: &str = "CANCELLED";
