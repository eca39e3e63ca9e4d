//! Persistence-layer errors.

use super::error_code::{self, ErrorCode};

/// Errors raised by the SQLite persistence layer.
///
/// `NotFound` and `VersionConflict` are part of the version-guard
/// contract and must stay distinguishable from generic SQLite failure:
/// the service layer promotes them into their typed `DomainError`
/// counterparts instead of treating them as infrastructure faults.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("{table} row {id} not found")]
    NotFound { table: &'static str, id: i64 },

    #[error("{table} row {id} has a different stored version")]
    VersionConflict { table: &'static str, id: i64 },
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Sqlite { .. } => error_code::STORAGE,
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::VersionConflict { .. } => error_code::VERSION_CONFLICT,
        }
    }
}
