//! Audit-log retention: the only sanctioned way audit rows are removed.
//!
//! Three administrative purge operations, each returning how many rows it
//! deleted: by age, by record, and everything (with explicit caller
//! confirmation enforced one layer up).

use gapcert_core::errors::StorageError;
use rusqlite::{params, Connection};

use crate::now_epoch;

/// Delete audit entries older than `days`. Returns the deleted count.
pub fn delete_old_logs(conn: &Connection, days: u32) -> Result<u64, StorageError> {
    let cutoff = now_epoch() - (days as i64 * 86_400);
    let deleted = conn
        .execute(
            "DELETE FROM audit_logs WHERE created_at < ?1",
            params![cutoff],
        )
        .map_err(|e| StorageError::Sqlite {
            message: format!("delete old logs: {e}"),
        })? as u64;
    if deleted > 0 {
        tracing::info!(deleted, days, "purged aged audit entries");
    }
    Ok(deleted)
}

/// Delete all audit entries of one record. Returns the deleted count.
pub fn delete_record_logs(
    conn: &Connection,
    table_name: &str,
    record_id: i64,
) -> Result<u64, StorageError> {
    let deleted = conn
        .execute(
            "DELETE FROM audit_logs WHERE table_name = ?1 AND record_id = ?2",
            params![table_name, record_id],
        )
        .map_err(|e| StorageError::Sqlite {
            message: format!("delete record logs: {e}"),
        })? as u64;
    tracing::info!(deleted, table_name, record_id, "purged record audit entries");
    Ok(deleted)
}

/// Delete the entire audit trail. Returns the deleted count.
pub fn delete_all_logs(conn: &Connection) -> Result<u64, StorageError> {
    let deleted = conn
        .execute("DELETE FROM audit_logs", [])
        .map_err(|e| StorageError::Sqlite {
            message: format!("delete all logs: {e}"),
        })? as u64;
    tracing::warn!(deleted, "purged entire audit trail");
    Ok(deleted)
}
