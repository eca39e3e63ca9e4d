//! Queries for the certificates table.

use chrono::NaiveDate;
use gapcert_core::errors::StorageError;
use gapcert_core::types::Certificate;
use rusqlite::{params, params_from_iter, Connection, Row};

use super::{bad_column, sqlite_err};
use crate::listing::SortColumns;
use crate::versioned::explain_zero_rows;

pub const SORT_COLUMNS: SortColumns = SortColumns {
    allowed: &[
        ("certificateNo", "certificate_no"),
        ("effectiveDate", "effective_date"),
        ("expiryDate", "expiry_date"),
        ("createdAt", "created_at"),
        ("updatedAt", "updated_at"),
    ],
    tiebreak: "id",
};

#[derive(Debug, Clone, Default)]
pub struct CertificateFilter {
    /// Role scoping: certificates rooted at farms owned by this user.
    pub farm_owner_user_id: Option<i64>,
    pub active: Option<bool>,
    pub cancel_request: Option<bool>,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
}

const SELECT: &str = "SELECT id, inspection_id, certificate_no, effective_date, expiry_date,
        active, cancel_request, cancel_request_detail, files_json, version,
        created_at, updated_at FROM certificates";

fn parse_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| bad_column(idx, "date", s))
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Certificate> {
    let effective_s: String = row.get(3)?;
    let expiry_s: String = row.get(4)?;
    let files_s: String = row.get(8)?;
    Ok(Certificate {
        id: row.get(0)?,
        inspection_id: row.get(1)?,
        certificate_no: row.get(2)?,
        effective_date: parse_date(3, &effective_s)?,
        expiry_date: parse_date(4, &expiry_s)?,
        active: row.get::<_, i64>(5)? != 0,
        cancel_request: row.get::<_, i64>(6)? != 0,
        cancel_request_detail: row.get(7)?,
        files: serde_json::from_str(&files_s)
            .map_err(|_| bad_column(8, "files json", &files_s))?,
        version: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

pub fn insert(
    conn: &Connection,
    inspection_id: i64,
    certificate_no: &str,
    effective_date: NaiveDate,
    expiry_date: NaiveDate,
    files: &[String],
    now: i64,
) -> Result<i64, StorageError> {
    let files_json = serde_json::to_string(files).map_err(|e| StorageError::Sqlite {
        message: format!("encode files: {e}"),
    })?;
    conn.execute(
        "INSERT INTO certificates
            (inspection_id, certificate_no, effective_date, expiry_date, files_json,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            inspection_id,
            certificate_no,
            effective_date.format("%Y-%m-%d").to_string(),
            expiry_date.format("%Y-%m-%d").to_string(),
            files_json,
            now
        ],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Certificate, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("{SELECT} WHERE id = ?1"))
        .map_err(sqlite_err)?;
    match stmt.query_row(params![id], map_row) {
        Ok(cert) => Ok(cert),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::NotFound {
            table: "certificates",
            id,
        }),
        Err(e) => Err(sqlite_err(e)),
    }
}

/// Owner of the farm a certificate is rooted at (for farmer scoping).
pub fn farm_owner(conn: &Connection, certificate_id: i64) -> Result<i64, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT f.owner_user_id FROM certificates c
             JOIN inspections i ON i.id = c.inspection_id
             JOIN rubber_farms f ON f.id = i.rubber_farm_id
             WHERE c.id = ?1",
        )
        .map_err(sqlite_err)?;
    match stmt.query_row(params![certificate_id], |row| row.get(0)) {
        Ok(owner) => Ok(owner),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::NotFound {
            table: "certificates",
            id: certificate_id,
        }),
        Err(e) => Err(sqlite_err(e)),
    }
}

pub fn exists_for_inspection(
    conn: &Connection,
    inspection_id: i64,
) -> Result<bool, StorageError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM certificates WHERE inspection_id = ?1",
            params![inspection_id],
            |row| row.get(0),
        )
        .map_err(sqlite_err)?;
    Ok(count > 0)
}

/// Version-guarded cancellation-request write (sets the flag and detail).
pub fn set_cancel_request(
    conn: &Connection,
    id: i64,
    detail: &str,
    expected_version: i64,
    now: i64,
) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE certificates SET cancel_request = 1, cancel_request_detail = ?1,
                version = version + 1, updated_at = ?2
             WHERE id = ?3 AND version = ?4",
            params![detail, now, id, expected_version],
        )
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(explain_zero_rows(conn, "certificates", id));
    }
    Ok(())
}

/// Version-guarded edit of the cancellation detail text.
pub fn update_cancel_detail(
    conn: &Connection,
    id: i64,
    detail: &str,
    expected_version: i64,
    now: i64,
) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE certificates SET cancel_request_detail = ?1,
                version = version + 1, updated_at = ?2
             WHERE id = ?3 AND version = ?4",
            params![detail, now, id, expected_version],
        )
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(explain_zero_rows(conn, "certificates", id));
    }
    Ok(())
}

/// Version-guarded revocation: clears the active flag.
pub fn revoke(
    conn: &Connection,
    id: i64,
    expected_version: i64,
    now: i64,
) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE certificates SET active = 0, version = version + 1, updated_at = ?1
             WHERE id = ?2 AND version = ?3",
            params![now, id, expected_version],
        )
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(explain_zero_rows(conn, "certificates", id));
    }
    Ok(())
}

/// Filtered, sorted, paged listing with the filtered total.
pub fn list_paged(
    conn: &Connection,
    filter: &CertificateFilter,
    order_by: &str,
    limit: u32,
    offset: u32,
) -> Result<(Vec<Certificate>, u64), StorageError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<rusqlite::types::Value> = Vec::new();

    if let Some(owner) = filter.farm_owner_user_id {
        clauses.push(
            "inspection_id IN (
                SELECT i.id FROM inspections i
                JOIN rubber_farms f ON f.id = i.rubber_farm_id
                WHERE f.owner_user_id = ?)"
                .to_string(),
        );
        values.push(owner.into());
    }
    if let Some(active) = filter.active {
        clauses.push("active = ?".to_string());
        values.push((active as i64).into());
    }
    if let Some(cancel) = filter.cancel_request {
        clauses.push("cancel_request = ?".to_string());
        values.push((cancel as i64).into());
    }
    if let Some(from) = filter.effective_from {
        clauses.push("effective_date >= ?".to_string());
        values.push(from.format("%Y-%m-%d").to_string().into());
    }
    if let Some(to) = filter.effective_to {
        clauses.push("effective_date <= ?".to_string());
        values.push(to.format("%Y-%m-%d").to_string().into());
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM certificates{where_sql}"),
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
