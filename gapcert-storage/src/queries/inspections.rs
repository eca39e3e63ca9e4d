//! Queries for the inspections table and its item rows.

use gapcert_core::errors::StorageError;
use gapcert_core::types::{Inspection, InspectionItem, InspectionResult, InspectionStatus};
use rusqlite::{params, params_from_iter, Connection, Row};

use super::{bad_column, sqlite_err};
use crate::listing::SortColumns;
use crate::versioned::explain_zero_rows;

pub const SORT_COLUMNS: SortColumns = SortColumns {
    allowed: &[
        ("inspectionDateTime", "inspection_date_time"),
        ("status", "status"),
        ("result", "result"),
        ("createdAt", "created_at"),
        ("updatedAt", "updated_at"),
    ],
    tiebreak: "id",
};

#[derive(Debug, Clone, Default)]
pub struct InspectionFilter {
    pub rubber_farm_id: Option<i64>,
    /// Role scoping: restrict to inspections of farms owned by this user.
    pub farm_owner_user_id: Option<i64>,
    pub status: Option<InspectionStatus>,
    pub date_from: Option<i64>,
    pub date_to: Option<i64>,
}

const SELECT: &str = "SELECT id, rubber_farm_id, inspection_type_id, inspection_date_time,
        chief_auditor_id, status, result, main_failed, secondary_compliance,
        version, created_at, updated_at FROM inspections";

fn map_row(row: &Row<'_>) -> rusqlite::Result<Inspection> {
    let status_s: String = row.get(5)?;
    let result_s: Option<String> = row.get(6)?;
    Ok(Inspection {
        id: row.get(0)?,
        rubber_farm_id: row.get(1)?,
        inspection_type_id: row.get(2)?,
        inspection_date_time: row.get(3)?,
        chief_auditor_id: row.get(4)?,
        status: InspectionStatus::from_str(&status_s)
            .ok_or_else(|| bad_column(5, "inspection status", &status_s))?,
        result: match result_s {
            Some(s) => Some(
                InspectionResult::from_str(&s)
                    .ok_or_else(|| bad_column(6, "inspection result", &s))?,
            ),
            None => None,
        },
        main_failed: row.get(7)?,
        secondary_compliance: row.get(8)?,
        version: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// Insert a freshly scheduled inspection. Returns the new row id.
pub fn insert(
    conn: &Connection,
    rubber_farm_id: i64,
    inspection_type_id: i64,
    inspection_date_time: i64,
    chief_auditor_id: i64,
    status: InspectionStatus,
    now: i64,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO inspections
            (rubber_farm_id, inspection_type_id, inspection_date_time, chief_auditor_id,
             status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            rubber_farm_id,
            inspection_type_id,
            inspection_date_time,
            chief_auditor_id,
            status.as_str(),
            now
        ],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn add_auditor(
    conn: &Connection,
    inspection_id: i64,
    user_id: i64,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR IGNORE INTO inspection_auditors (inspection_id, user_id) VALUES (?1, ?2)",
        params![inspection_id, user_id],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn list_auditors(conn: &Connection, inspection_id: i64) -> Result<Vec<i64>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT user_id FROM inspection_auditors WHERE inspection_id = ?1 ORDER BY user_id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![inspection_id], |row| row.get(0))
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

pub fn get(conn: &Connection, id: i64) -> Result<Inspection, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("{SELECT} WHERE id = ?1"))
        .map_err(sqlite_err)?;
    match stmt.query_row(params![id], map_row) {
        Ok(inspection) => Ok(inspection),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::NotFound {
            table: "inspections",
            id,
        }),
        Err(e) => Err(sqlite_err(e)),
    }
}

/// Whether the farm has an inspection that is not yet terminal
/// (anything other than `inspected` + `pass`/`fail`).
pub fn has_active_inspection(
    conn: &Connection,
    rubber_farm_id: i64,
) -> Result<bool, StorageError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM inspections
             WHERE rubber_farm_id = ?1
               AND NOT (status = 'inspected' AND result IN ('pass', 'fail'))",
            params![rubber_farm_id],
            |row| row.get(0),
        )
        .map_err(sqlite_err)?;
    Ok(count > 0)
}

/// Version-guarded status/result transition.
pub fn update_status(
    conn: &Connection,
    id: i64,
    status: InspectionStatus,
    result: Option<InspectionResult>,
    expected_version: i64,
    now: i64,
) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE inspections SET status = ?1, result = ?2,
                version = version + 1, updated_at = ?3
             WHERE id = ?4 AND version = ?5",
            params![
                status.as_str(),
                result.map(|r| r.as_str()),
                now,
                id,
                expected_version
            ],
        )
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(explain_zero_rows(conn, "inspections", id));
    }
    Ok(())
}

/// Version-guarded finalization: persists the computed result and the
/// aggregate columns together.
pub fn finalize(
    conn: &Connection,
    id: i64,
    result: InspectionResult,
    main_failed: i64,
    secondary_compliance: i64,
    expected_version: i64,
    now: i64,
) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE inspections SET result = ?1, main_failed = ?2,
                secondary_compliance = ?3, version = version + 1, updated_at = ?4
             WHERE id = ?5 AND version = ?6",
            params![
                result.as_str(),
                main_failed,
                secondary_compliance,
                now,
                id,
                expected_version
            ],
        )
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(explain_zero_rows(conn, "inspections", id));
    }
    Ok(())
}

// ─── Item rows ─────────────────────────────────────────────────────────

pub fn insert_item(
    conn: &Connection,
    inspection_id: i64,
    item_no: i64,
    name: &str,
    now: i64,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO inspection_items (inspection_id, item_no, name, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![inspection_id, item_no, name, now],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn list_items(
    conn: &Connection,
    inspection_id: i64,
) -> Result<Vec<InspectionItem>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, inspection_id, item_no, name, version, created_at, updated_at
             FROM inspection_items WHERE inspection_id = ?1 ORDER BY item_no",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![inspection_id], |row| {
            Ok(InspectionItem {
                id: row.get(0)?,
                inspection_id: row.get(1)?,
                item_no: row.get(2)?,
                name: row.get(3)?,
                version: row.get(4)?,
                created_at: row.get(5)?,
                updated_at: row.get(6)?,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// Filtered, sorted, paged listing with the filtered total.
pub fn list_paged(
    conn: &Connection,
    filter: &InspectionFilter,
    order_by: &str,
    limit: u32,
    offset: u32,
) -> Result<(Vec<Inspection>, u64), StorageError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<rusqlite::types::Value> = Vec::new();

    if let Some(farm_id) = filter.rubber_farm_id {
        clauses.push("rubber_farm_id = ?".to_string());
        values.push(farm_id.into());
    }
    if let Some(owner) = filter.farm_owner_user_id {
        clauses.push(
            "rubber_farm_id IN (SELECT id FROM rubber_farms WHERE owner_user_id = ?)".to_string(),
        );
        values.push(owner.into());
    }
    if let Some(status) = filter.status {
        clauses.push("status = ?".to_string());
        values.push(status.as_str().to_string().into());
    }
    if let Some(from) = filter.date_from {
        clauses.push("inspection_date_time >= ?".to_string());
        values.push(from.into());
    }
    if let Some(to) = filter.date_to {
        clauses.push("inspection_date_time <= ?".to_string());
        values.push(to.into());
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM inspections{where_sql}"),
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
