//! Queries for the planting_details table.

use gapcert_core::errors::StorageError;
use gapcert_core::types::{PlantingData, PlantingDetail};
use rusqlite::{params, Connection, Row};

use super::sqlite_err;
use crate::versioned::explain_zero_rows;

const SELECT: &str = "SELECT id, rubber_farm_id, specie, area_of_plot, number_of_rubber,
        number_of_tapping, age_of_rubber, year_of_tapping, month_of_tapping,
        total_production, version, created_at, updated_at FROM planting_details";

fn map_row(row: &Row<'_>) -> rusqlite::Result<PlantingDetail> {
    Ok(PlantingDetail {
        id: row.get(0)?,
        rubber_farm_id: row.get(1)?,
        specie: row.get(2)?,
        area_of_plot: row.get(3)?,
        number_of_rubber: row.get(4)?,
        number_of_tapping: row.get(5)?,
        age_of_rubber: row.get(6)?,
        year_of_tapping: row.get(7)?,
        month_of_tapping: row.get(8)?,
        total_production: row.get(9)?,
        version: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

pub fn insert(
    conn: &Connection,
    rubber_farm_id: i64,
    data: &PlantingData,
    now: i64,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO planting_details
            (rubber_farm_id, specie, area_of_plot, number_of_rubber, number_of_tapping,
             age_of_rubber, year_of_tapping, month_of_tapping, total_production,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            rubber_farm_id,
            data.specie,
            data.area_of_plot,
            data.number_of_rubber,
            data.number_of_tapping,
            data.age_of_rubber,
            data.year_of_tapping,
            data.month_of_tapping,
            data.total_production,
            now
        ],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<PlantingDetail, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("{SELECT} WHERE id = ?1"))
        .map_err(sqlite_err)?;
    match stmt.query_row(params![id], map_row) {
        Ok(detail) => Ok(detail),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::NotFound {
            table: "planting_details",
            id,
        }),
        Err(e) => Err(sqlite_err(e)),
    }
}

/// All details of a farm, in insertion order.
pub fn list_for_farm(
    conn: &Connection,
    rubber_farm_id: i64,
) -> Result<Vec<PlantingDetail>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("{SELECT} WHERE rubber_farm_id = ?1 ORDER BY id"))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![rubber_farm_id], map_row)
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// Version-guarded field update.
pub fn update(
    conn: &Connection,
    id: i64,
    data: &PlantingData,
    expected_version: i64,
    now: i64,
) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE planting_details SET
                specie = ?1, area_of_plot = ?2, number_of_rubber = ?3,
                number_of_tapping = ?4, age_of_rubber = ?5, year_of_tapping = ?6,
                month_of_tapping = ?7, total_production = ?8,
                version = version + 1, updated_at = ?9
             WHERE id = ?10 AND version = ?11",
            params![
                data.specie,
                data.area_of_plot,
                data.number_of_rubber,
                data.number_of_tapping,
                data.age_of_rubber,
                data.year_of_tapping,
                data.month_of_tapping,
                data.total_production,
                now,
                id,
                expected_version
            ],
        )
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(explain_zero_rows(conn, "planting_details", id));
    }
    Ok(())
}

/// Remove a planting detail row. The caller audits the deletion.
pub fn delete(conn: &Connection, id: i64) -> Result<(), StorageError> {
    let changed = conn
        .execute("DELETE FROM planting_details WHERE id = ?1", params![id])
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(StorageError::NotFound {
            table: "planting_details",
            id,
        });
    }
    Ok(())
}
