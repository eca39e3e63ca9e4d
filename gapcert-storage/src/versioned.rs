//! The optimistic-concurrency primitive shared by every mutable table.
//!
//! Contract: callers run inside a BEGIN IMMEDIATE transaction (see
//! `connection::writer`), so the write lock is already held when the
//! version is checked and no second writer can interleave between the
//! check and the UPDATE. Update statements additionally carry
//! `AND version = ?expected` with `SET version = version + 1`, and
//! [`explain_zero_rows`] turns a zero-row UPDATE into the precise
//! `NotFound`/`VersionConflict` outcome.

use gapcert_core::errors::StorageError;
use rusqlite::{params, Connection};

/// Read the stored version of a row. `NotFound` when the row is absent.
///
/// `table` must be one of this crate's fixed table names; it is
/// interpolated into SQL and must never come from request input.
pub fn fetch_version(
    conn: &Connection,
    table: &'static str,
    id: i64,
) -> Result<i64, StorageError> {
    let sql = format!("SELECT version FROM {table} WHERE id = ?1");
    let mut stmt = conn
        .prepare_cached(&sql)
        .map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;
    match stmt.query_row(params![id], |row| row.get(0)) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::NotFound { table, id }),
        Err(e) => Err(StorageError::Sqlite {
            message: e.to_string(),
        }),
    }
}

/// Fail with `VersionConflict` unless the stored version equals the one
/// the caller last observed.
pub fn ensure_version(
    conn: &Connection,
    table: &'static str,
    id: i64,
    expected: i64,
) -> Result<(), StorageError> {
    let stored = fetch_version(conn, table, id)?;
    if stored != expected {
        return Err(StorageError::VersionConflict { table, id });
    }
    Ok(())
}

/// Disambiguate a version-guarded UPDATE that touched zero rows:
/// the row either vanished (`NotFound`) or its version moved
/// (`VersionConflict`).
pub fn explain_zero_rows(
    conn: &Connection,
    table: &'static str,
    id: i64,
) -> StorageError {
    match fetch_version(conn, table, id) {
        Ok(_) => StorageError::VersionConflict { table, id },
        Err(e) => e,
    }
}
