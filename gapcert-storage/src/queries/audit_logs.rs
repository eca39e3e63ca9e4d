//! Queries for the audit_logs table — the append-only audit trail.

use gapcert_core::errors::StorageError;
use gapcert_core::types::{AuditAction, AuditLogEntry};
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::Value;

use super::{bad_column, sqlite_err};
use crate::listing::SortColumns;

pub const SORT_COLUMNS: SortColumns = SortColumns {
    allowed: &[
        ("tableName", "table_name"),
        ("recordId", "record_id"),
        ("action", "action"),
        ("userId", "user_id"),
        ("createdAt", "created_at"),
    ],
    tiebreak: "id",
};

/// Filters of the audit browser; all optional, combined with AND.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub table_name: Option<String>,
    pub record_id: Option<i64>,
    pub user_id: Option<i64>,
    pub action: Option<AuditAction>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

const SELECT: &str = "SELECT id, table_name, record_id, action, user_id, old_data, new_data,
        created_at FROM audit_logs";

fn parse_snapshot(idx: usize, s: Option<String>) -> rusqlite::Result<Option<Value>> {
    match s {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|_| bad_column(idx, "snapshot json", &json)),
        None => Ok(None),
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<AuditLogEntry> {
    let action_s: String = row.get(3)?;
    Ok(AuditLogEntry {
        id: row.get(0)?,
        table_name: row.get(1)?,
        record_id: row.get(2)?,
        action: AuditAction::from_str(&action_s)
            .ok_or_else(|| bad_column(3, "audit action", &action_s))?,
        user_id: row.get(4)?,
        old_data: parse_snapshot(5, row.get(5)?)?,
        new_data: parse_snapshot(6, row.get(6)?)?,
        created_at: row.get(7)?,
    })
}

/// Append one audit entry. Runs inside the mutation's own transaction so
/// a committed mutation is never unaudited.
pub fn insert(
    conn: &Connection,
    table_name: &str,
    record_id: i64,
    action: AuditAction,
    user_id: i64,
    old_data: Option<&Value>,
    new_data: Option<&Value>,
    now: i64,
) -> Result<i64, StorageError> {
    let old_json = old_data
        .map(|v| serde_json::to_string(v))
        .transpose()
        .map_err(|e| StorageError::Sqlite {
            message: format!("encode old snapshot: {e}"),
        })?;
    let new_json = new_data
        .map(|v| serde_json::to_string(v))
        .transpose()
        .map_err(|e| StorageError::Sqlite {
            message: format!("encode new snapshot: {e}"),
        })?;

    conn.execute(
        "INSERT INTO audit_logs
            (table_name, record_id, action, user_id, old_data, new_data, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            table_name,
            record_id,
            action.as_str(),
            user_id,
            old_json,
            new_json,
            now
        ],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

/// Filtered, sorted, paged audit query with the filtered total.
pub fn list_paged(
    conn: &Connection,
    filter: &AuditLogFilter,
    order_by: &str,
    limit: u32,
    offset: u32,
) -> Result<(Vec<AuditLogEntry>, u64), StorageError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<rusqlite::types::Value> = Vec::new();

    if let Some(ref table) = filter.table_name {
        clauses.push("table_name = ?".to_string());
        values.push(table.clone().into());
    }
    if let Some(record_id) = filter.record_id {
        clauses.push("record_id = ?".to_string());
        values.push(record_id.into());
    }
    if let Some(user_id) = filter.user_id {
        clauses.push("user_id = ?".to_string());
        values.push(user_id.into());
    }
    if let Some(action) = filter.action {
        clauses.push("action = ?".to_string());
        values.push(action.as_str().to_string().into());
    }
    if let Some(start) = filter.start_date {
        clauses.push("created_at >= ?".to_string());
        values.push(start.into());
    }
    if let Some(end) = filter.end_date {
        clauses.push("created_at <= ?".to_string());
        values.push(end.into());
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM audit_logs{where_sql}"),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )
        .map_err(sqlite_err)?;

    let sql = format!("{SELECT}{where_sql} ORDER BY {order_by} LIMIT ? OFFSET ?");
    values.push((limit as i64).into());
    values.push((offset as i64).into());

    let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), map_row)
        .map_err(sqlite_err)?;
    let results = rows
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;

    Ok((results, total as u64))
}

/// Entries for one record, newest first (unpaged convenience for the
/// record-history view).
pub fn list_for_record(
    conn: &Connection,
    table_name: &str,
    record_id: i64,
) -> Result<Vec<AuditLogEntry>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "{SELECT} WHERE table_name = ?1 AND record_id = ?2 ORDER BY created_at DESC, id DESC"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![table_name, record_id], map_row)
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}
