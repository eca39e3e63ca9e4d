//! Domain/service-layer errors and their mapping from storage errors.

use super::error_code::{self, ErrorCode};
use super::StorageError;

/// Errors raised by the workflow services.
///
/// Each variant maps to exactly one HTTP status in gapcert-server;
/// the taxonomy is part of the external contract, not an implementation
/// detail.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Malformed input, caught before touching storage.
    #[error("{message}")]
    Validation { message: String },

    /// The referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Optimistic lock failure: the record changed since the caller read it.
    #[error("{entity} {id} was modified by another user")]
    VersionConflict { entity: &'static str, id: i64 },

    /// A lifecycle rule was violated (e.g. finalizing a result twice).
    #[error("{entity} {id}: {detail}")]
    IllegalTransition {
        entity: &'static str,
        id: i64,
        detail: String,
    },

    /// The acting role lacks permission for this operation.
    #[error("{message}")]
    Authorization { message: String },

    /// Underlying persistence failure.
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    pub fn illegal_transition(
        entity: &'static str,
        id: i64,
        detail: impl Into<String>,
    ) -> Self {
        Self::IllegalTransition {
            entity,
            id,
            detail: detail.into(),
        }
    }
}

/// Promote the typed storage outcomes into their domain counterparts so
/// callers can rely on matching `DomainError::VersionConflict` /
/// `NotFound` regardless of which layer detected the condition.
impl From<StorageError> for DomainError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { table, id } => DomainError::NotFound { entity: table, id },
            StorageError::VersionConflict { table, id } => {
                DomainError::VersionConflict { entity: table, id }
            }
            other => DomainError::Storage(other),
        }
    }
}

impl ErrorCode for DomainError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => error_code::VALIDATION,
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::VersionConflict { .. } => error_code::VERSION_CONFLICT,
            Self::IllegalTransition { .. } => error_code::ILLEGAL_TRANSITION,
            Self::Authorization { .. } => error_code::AUTHORIZATION,
            Self::Storage(e) => e.error_code(),
        }
    }
}
