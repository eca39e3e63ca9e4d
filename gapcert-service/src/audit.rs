//! The audit recorder: full before/after snapshots, written inside the
//! mutation's own transaction.
//!
//! Atomicity is strict: if the audit insert fails the transaction rolls
//! back and the mutation fails with it — a committed change always has
//! its audit row. The recorder stores whole serialized documents; it
//! never diffs fields.

use gapcert_core::errors::StorageError;
use gapcert_core::types::AuditAction;
use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;

use gapcert_storage::queries::audit_logs;

fn snapshot<T: Serialize>(record: &T) -> Result<Value, StorageError> {
    serde_json::to_value(record).map_err(|e| StorageError::Sqlite {
        message: format!("encode audit snapshot: {e}"),
    })
}

/// Record a CREATE: no prior state.
pub fn record_create<T: Serialize>(
    conn: &Connection,
    table_name: &str,
    record_id: i64,
    user_id: i64,
    new: &T,
    now: i64,
) -> Result<(), StorageError> {
    let new_data = snapshot(new)?;
    audit_logs::insert(
        conn,
        table_name,
        record_id,
        AuditAction::Create,
        user_id,
        None,
        Some(&new_data),
        now,
    )?;
    Ok(())
}

/// Record an UPDATE: both sides present.
pub fn record_update<T: Serialize, U: Serialize>(
    conn: &Connection,
    table_name: &str,
    record_id: i64,
    user_id: i64,
    old: &T,
    new: &U,
    now: i64,
) -> Result<(), StorageError> {
    let old_data = snapshot(old)?;
    let new_data = snapshot(new)?;
    audit_logs::insert(
        conn,
        table_name,
        record_id,
        AuditAction::Update,
        user_id,
        Some(&old_data),
        Some(&new_data),
        now,
    )?;
    Ok(())
}

/// Record a DELETE: no new state.
pub fn record_delete<T: Serialize>(
    conn: &Connection,
    table_name: &str,
    record_id: i64,
    user_id: i64,
    old: &T,
    now: i64,
) -> Result<(), StorageError> {
    let old_data = snapshot(old)?;
    audit_logs::insert(
        conn,
        table_name,
        record_id,
        AuditAction::Delete,
        user_id,
        Some(&old_data),
        None,
        now,
    )?;
    Ok(())
}
