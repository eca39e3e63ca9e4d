//! Per-table query modules.

pub mod audit_logs;
pub mod certificates;
pub mod farms;
pub mod inspections;
pub mod planting_details;
pub mod requirements;
pub mod templates;

use gapcert_core::errors::StorageError;

/// The standard rusqlite → StorageError mapping.
pub(crate) fn sqlite_err(e: rusqlite::Error) -> StorageError {
    StorageError::Sqlite {
        message: e.to_string(),
    }
}

/// A stored value that fails to parse back into its domain type
/// (corrupted enum string, malformed JSON snapshot).
pub(crate) fn bad_column(idx: usize, what: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        format!("invalid {what}: {value}").into(),
    )
}
