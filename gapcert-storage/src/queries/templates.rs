//! Queries for the master checklist reference data: inspection types and
//! their item/requirement templates.

use gapcert_core::errors::StorageError;
use gapcert_core::types::{InspectionType, ItemTemplate, RequirementLevel, RequirementTemplate};
use rusqlite::{params, Connection};

use super::{bad_column, sqlite_err};

pub fn insert_type(conn: &Connection, name: &str) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO inspection_types (name) VALUES (?1)",
        params![name],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_type(conn: &Connection, id: i64) -> Result<InspectionType, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, name FROM inspection_types WHERE id = ?1")
        .map_err(sqlite_err)?;
    match stmt.query_row(params![id], |row| {
        Ok(InspectionType {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }) {
        Ok(t) => Ok(t),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::NotFound {
            table: "inspection_types",
            id,
        }),
        Err(e) => Err(sqlite_err(e)),
    }
}

pub fn insert_item_template(
    conn: &Connection,
    inspection_type_id: i64,
    item_no: i64,
    name: &str,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO inspection_item_templates (inspection_type_id, item_no, name)
         VALUES (?1, ?2, ?3)",
        params![inspection_type_id, item_no, name],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_requirement_template(
    conn: &Connection,
    item_template_id: i64,
    requirement_no: i64,
    name: &str,
    level: RequirementLevel,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO requirement_templates (item_template_id, requirement_no, name, level)
         VALUES (?1, ?2, ?3, ?4)",
        params![item_template_id, requirement_no, name, level.as_str()],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

/// Item templates of a type, in checklist order.
pub fn list_item_templates(
    conn: &Connection,
    inspection_type_id: i64,
) -> Result<Vec<ItemTemplate>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, inspection_type_id, item_no, name
             FROM inspection_item_templates WHERE inspection_type_id = ?1 ORDER BY item_no",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![inspection_type_id], |row| {
            Ok(ItemTemplate {
                id: row.get(0)?,
                inspection_type_id: row.get(1)?,
                item_no: row.get(2)?,
                name: row.get(3)?,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// Requirement templates of one checklist item, in order.
pub fn list_requirement_templates(
    conn: &Connection,
    item_template_id: i64,
) -> Result<Vec<RequirementTemplate>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, item_template_id, requirement_no, name, level
             FROM requirement_templates WHERE item_template_id = ?1 ORDER BY requirement_no",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![item_template_id], |row| {
            let level_s: String = row.get(4)?;
            Ok(RequirementTemplate {
                id: row.get(0)?,
                item_template_id: row.get(1)?,
                requirement_no: row.get(2)?,
                name: row.get(3)?,
                level: RequirementLevel::from_str(&level_s)
                    .ok_or_else(|| bad_column(4, "requirement level", &level_s))?,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}
