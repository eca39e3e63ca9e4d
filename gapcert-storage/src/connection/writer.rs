//! Write transactions — BEGIN IMMEDIATE so the write lock is taken at
//! transaction start and a version check can never race its update.

use gapcert_core::errors::StorageError;
use rusqlite::{Connection, TransactionBehavior};

/// Execute a write operation inside a BEGIN IMMEDIATE transaction.
/// Rolls back on error, commits on success.
///
/// Generic over the error type so service layers can raise their own
/// errors (converted from `StorageError` where storage is the cause)
/// from inside the transaction and still trigger a rollback.
pub fn with_immediate_transaction<F, T, E>(conn: &Connection, f: F) -> Result<T, E>
where
    E: From<StorageError>,
    F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, E>,
{
    // Issue a single BEGIN IMMEDIATE and wrap it in a Transaction whose
    // default drop behavior rolls back; committing on success is explicit
    // below. (unchecked_transaction() would issue a second, DEFERRED BEGIN
    // and nest onto this one.)
    let tx = rusqlite::Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(
        |e| {
            E::from(StorageError::Sqlite {
                message: format!("begin immediate: {e}"),
            })
        },
    )?;

    let result = f(&tx)?;

    tx.commit().map_err(|e| {
        E::from(StorageError::Sqlite {
            message: format!("commit: {e}"),
        })
    })?;

    Ok(result)
}
