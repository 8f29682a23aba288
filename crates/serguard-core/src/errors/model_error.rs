//! Type model construction errors.

use super::error_code::{self, SerguardErrorCode};

/// Errors raised while a host populates the type model.
///
/// Analysis never produces these; they only guard the builder against
/// inconsistent input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Type already declared: {name}")]
    DuplicateType { name: String },

    #[error("Type {name} is not a generic definition")]
    NotGeneric { name: String },

    #[error("Type {name} expects {expected} type arguments, got {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Symbol {name} is not a {expected}")]
    WrongSymbolKind { name: String, expected: &'static str },
}

impl SerguardErrorCode for ModelError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateType { .. } => error_code::DUPLICATE_TYPE,
            Self::ArityMismatch { .. } => error_code::ARITY_MISMATCH,
            Self::NotGeneric { .. } | Self::WrongSymbolKind { .. } => error_code::MODEL_ERROR,
        }
    }
}
