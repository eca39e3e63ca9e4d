//! Queries for the requirements table (per-item evaluations).

use gapcert_core::errors::StorageError;
use gapcert_core::types::{EvaluationResult, Requirement, RequirementLevel};
use rusqlite::{params, Connection, Row};

use super::{bad_column, sqlite_err};
use crate::versioned::explain_zero_rows;

const SELECT: &str = "SELECT id, inspection_item_id, requirement_no, name, level,
        evaluation_result, evaluation_method, note, version, created_at, updated_at
        FROM requirements";

fn map_row(row: &Row<'_>) -> rusqlite::Result<Requirement> {
    let level_s: String = row.get(4)?;
    let eval_s: Option<String> = row.get(5)?;
    Ok(Requirement {
        id: row.get(0)?,
        inspection_item_id: row.get(1)?,
        requirement_no: row.get(2)?,
        name: row.get(3)?,
        level: RequirementLevel::from_str(&level_s)
            .ok_or_else(|| bad_column(4, "requirement level", &level_s))?,
        evaluation_result: match eval_s {
            Some(s) => Some(
                EvaluationResult::from_str(&s)
                    .ok_or_else(|| bad_column(5, "evaluation result", &s))?,
            ),
            None => None,
        },
        evaluation_method: row.get(6)?,
        note: row.get(7)?,
        version: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Insert an unevaluated requirement copied from a template.
pub fn insert(
    conn: &Connection,
    inspection_item_id: i64,
    requirement_no: i64,
    name: &str,
    level: RequirementLevel,
    now: i64,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO requirements
            (inspection_item_id, requirement_no, name, level, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![inspection_item_id, requirement_no, name, level.as_str(), now],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Requirement, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("{SELECT} WHERE id = ?1"))
        .map_err(sqlite_err)?;
    match stmt.query_row(params![id], map_row) {
        Ok(req) => Ok(req),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::NotFound {
            table: "requirements",
            id,
        }),
        Err(e) => Err(sqlite_err(e)),
    }
}

/// The inspection a requirement belongs to (via its item).
pub fn inspection_of(conn: &Connection, requirement_id: i64) -> Result<i64, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT i.inspection_id FROM requirements r
             JOIN inspection_items i ON i.id = r.inspection_item_id
             WHERE r.id = ?1",
        )
        .map_err(sqlite_err)?;
    match stmt.query_row(params![requirement_id], |row| row.get(0)) {
        Ok(id) => Ok(id),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::NotFound {
            table: "requirements",
            id: requirement_id,
        }),
        Err(e) => Err(sqlite_err(e)),
    }
}

/// All requirements of an inspection, checklist order.
pub fn list_for_inspection(
    conn: &Connection,
    inspection_id: i64,
) -> Result<Vec<Requirement>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT r.id, r.inspection_item_id, r.requirement_no, r.name, r.level,
                    r.evaluation_result, r.evaluation_method, r.note, r.version,
                    r.created_at, r.updated_at
             FROM requirements r
             JOIN inspection_items i ON i.id = r.inspection_item_id
             WHERE i.inspection_id = ?1
             ORDER BY i.item_no, r.requirement_no",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![inspection_id], map_row).map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// How many requirements of the inspection still lack an evaluation.
pub fn count_unevaluated(conn: &Connection, inspection_id: i64) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM requirements r
         JOIN inspection_items i ON i.id = r.inspection_item_id
         WHERE i.inspection_id = ?1 AND r.evaluation_result IS NULL",
        params![inspection_id],
        |row| row.get(0),
    )
    .map_err(sqlite_err)
}

/// Version-guarded evaluation save.
pub fn update_evaluation(
    conn: &Connection,
    id: i64,
    evaluation_result: EvaluationResult,
    evaluation_method: Option<&str>,
    note: Option<&str>,
    expected_version: i64,
    now: i64,
) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE requirements SET evaluation_result = ?1, evaluation_method = ?2,
                note = ?3, version = version + 1, updated_at = ?4
             WHERE id = ?5 AND version = ?6",
            params![
                evaluation_result.as_str(),
                evaluation_method,
                note,
                now,
                id,
                expected_version
            ],
        )
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(explain_zero_rows(conn, "requirements", id));
    }
    Ok(())
}
