//! Schema migrations driven by `PRAGMA user_version`.
//! Each migration is a single SQL batch applied in its own transaction;
//! the user_version is bumped together with the batch, so a failed
//! migration leaves the schema at the previous version.

pub mod v001_farms;
pub mod v002_inspections;
pub mod v003_certificates;
pub mod v004_audit;

use gapcert_core::errors::StorageError;
use rusqlite::Connection;

const MIGRATIONS: &[&str] = &[
    v001_farms::MIGRATION_SQL,
    v002_inspections::MIGRATION_SQL,
    v003_certificates::MIGRATION_SQL,
    v004_audit::MIGRATION_SQL,
];

/// Apply all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| StorageError::Sqlite {
            message: format!("read user_version: {e}"),
        })?;

    for (idx, sql) in MIGRATIONS.iter().enumerate() {
        let version = idx as i64 + 1;
        if version <= current {
            continue;
        }
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StorageError::Sqlite {
                message: format!("migration v{version:03} begin: {e}"),
            })?;
        tx.execute_batch(sql).map_err(|e| StorageError::Sqlite {
            message: format!("migration v{version:03}: {e}"),
        })?;
        tx.pragma_update(None, "user_version", version)
            .map_err(|e| StorageError::Sqlite {
                message: format!("migration v{version:03} bump: {e}"),
            })?;
        tx.commit().map_err(|e| StorageError::Sqlite {
            message: format!("migration v{version:03} commit: {e}"),
        })?;
        tracing::debug!(version, "applied schema migration");
    }

    Ok(())
}

/// Current schema version according to this build.
pub fn latest_version() -> i64 {
    MIGRATIONS.len() as i64
}
