//! Queries for the rubber_farms table.

use gapcert_core::errors::StorageError;
use gapcert_core::types::{FarmData, RubberFarm};
use rusqlite::{params, params_from_iter, Connection, Row};

use super::sqlite_err;
use crate::listing::SortColumns;
use crate::versioned::explain_zero_rows;

/// Sortable fields exposed to the farm list endpoint.
pub const SORT_COLUMNS: SortColumns = SortColumns {
    allowed: &[
        ("villageName", "village_name"),
        ("subdistrict", "subdistrict"),
        ("district", "district"),
        ("province", "province"),
        ("createdAt", "created_at"),
        ("updatedAt", "updated_at"),
    ],
    tiebreak: "id",
};

/// Entity-specific filters for the farm list.
#[derive(Debug, Clone, Default)]
pub struct FarmFilter {
    /// Role scoping: a farmer only sees their own farms.
    pub owner_user_id: Option<i64>,
    pub province: Option<String>,
    /// Substring match over the location fields.
    pub text: Option<String>,
    pub created_from: Option<i64>,
    pub created_to: Option<i64>,
}

const SELECT: &str = "SELECT id, owner_user_id, village_name, moo, road, alley, subdistrict,
        district, province, version, created_at, updated_at FROM rubber_farms";

fn map_row(row: &Row<'_>) -> rusqlite::Result<RubberFarm> {
    Ok(RubberFarm {
        id: row.get(0)?,
        owner_user_id: row.get(1)?,
        village_name: row.get(2)?,
        moo: row.get(3)?,
        road: row.get(4)?,
        alley: row.get(5)?,
        subdistrict: row.get(6)?,
        district: row.get(7)?,
        province: row.get(8)?,
        version: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// Insert a farm (version starts at 1). Returns the new row id.
pub fn insert(
    conn: &Connection,
    owner_user_id: i64,
    data: &FarmData,
    now: i64,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO rubber_farms
            (owner_user_id, village_name, moo, road, alley, subdistrict, district, province,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            owner_user_id,
            data.village_name,
            data.moo,
            data.road,
            data.alley,
            data.subdistrict,
            data.district,
            data.province,
            now
        ],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<RubberFarm, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("{SELECT} WHERE id = ?1"))
        .map_err(sqlite_err)?;
    match stmt.query_row(params![id], map_row) {
        Ok(farm) => Ok(farm),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::NotFound {
            table: "rubber_farms",
            id,
        }),
        Err(e) => Err(sqlite_err(e)),
    }
}

/// Version-guarded field update. The WHERE clause carries the observed
/// version; zero affected rows means the row vanished or moved on.
pub fn update(
    conn: &Connection,
    id: i64,
    data: &FarmData,
    expected_version: i64,
    now: i64,
) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE rubber_farms SET
                village_name = ?1, moo = ?2, road = ?3, alley = ?4,
                subdistrict = ?5, district = ?6, province = ?7,
                version = version + 1, updated_at = ?8
             WHERE id = ?9 AND version = ?10",
            params![
                data.village_name,
                data.moo,
                data.road,
                data.alley,
                data.subdistrict,
                data.district,
                data.province,
                now,
                id,
                expected_version
            ],
        )
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(explain_zero_rows(conn, "rubber_farms", id));
    }
    Ok(())
}

/// Filtered, sorted, paged listing. Returns the page plus the filtered
/// total.
pub fn list_paged(
    conn: &Connection,
    filter: &FarmFilter,
    order_by: &str,
    limit: u32,
    offset: u32,
) -> Result<(Vec<RubberFarm>, u64), StorageError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<rusqlite::types::Value> = Vec::new();

    if let Some(owner) = filter.owner_user_id {
        clauses.push("owner_user_id = ?".to_string());
        values.push(owner.into());
    }
    if let Some(ref province) = filter.province {
        clauses.push("province = ?".to_string());
        values.push(province.clone().into());
    }
    if let Some(ref text) = filter.text {
        clauses.push(
            "(village_name LIKE ? OR subdistrict LIKE ? OR district LIKE ?)".to_string(),
        );
        let pattern = format!("%{text}%");
        values.push(pattern.clone().into());
        values.push(pattern.clone().into());
        values.push(pattern.into());
    }
    if let Some(from) = filter.created_from {
        clauses.push("created_at >= ?".to_string());
        values.push(from.into());
    }
    if let Some(to) = filter.created_to {
        clauses.push("created_at <= ?".to_string());
        values.push(to.into());
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM rubber_farms{where_sql}"),
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
