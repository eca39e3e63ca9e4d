//! The audit browser and retention operations — admin-only.

use std::sync::Arc;

use gapcert_core::errors::DomainError;
use gapcert_core::types::listing::{Page, PageRequest, Paginator};
use gapcert_core::types::{AuditLogEntry, Principal, Role};

use gapcert_storage::connection::writer::with_immediate_transaction;
use gapcert_storage::connection::DatabaseManager;
use gapcert_storage::queries::audit_logs::{self, AuditLogFilter};
use gapcert_storage::retention;

#[derive(Clone)]
pub struct AuditLogService {
    db: Arc<DatabaseManager>,
    default_retention_days: u32,
    max_page_limit: u32,
}

impl AuditLogService {
    pub fn new(db: Arc<DatabaseManager>, default_retention_days: u32, max_page_limit: u32) -> Self {
        Self {
            db,
            default_retention_days,
            max_page_limit,
        }
    }

    /// Filtered, sorted, paged audit browsing.
    pub fn list(
        &self,
        principal: &Principal,
        filter: AuditLogFilter,
        mut page: PageRequest,
    ) -> Result<Page<AuditLogEntry>, DomainError> {
        principal.require(Role::Admin)?;
        page.clamp_limit(self.max_page_limit);
        let order_by = audit_logs::SORT_COLUMNS
            .order_by(&page.sort_specs())
            .map_err(|e| DomainError::validation(format!("unknown sort field: {}", e.field)))?;

        let (results, total) = self.db.with_reader(|conn| {
            audit_logs::list_paged(conn, &filter, &order_by, page.limit, page.offset)
                .map_err(DomainError::from)
        })?;
        Ok(Page {
            results,
            paginator: Paginator {
                limit: page.limit,
                offset: page.offset,
                total,
            },
        })
    }

    /// Purge entries older than `days` (configured default when omitted).
    pub fn purge_old(
        &self,
        principal: &Principal,
        days: Option<u32>,
    ) -> Result<u64, DomainError> {
        principal.require(Role::Admin)?;
        let days = days.unwrap_or(self.default_retention_days);
        if days == 0 {
            return Err(DomainError::validation("days must be at least 1"));
        }
        let deleted = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                retention::delete_old_logs(tx, days).map_err(DomainError::from)
            })
        })?;
        Ok(deleted)
    }

    /// Purge every entry of one record.
    pub fn purge_record(
        &self,
        principal: &Principal,
        table_name: &str,
        record_id: i64,
    ) -> Result<u64, DomainError> {
        principal.require(Role::Admin)?;
        if table_name.trim().is_empty() {
            return Err(DomainError::validation("tableName must not be empty"));
        }
        let deleted = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                retention::delete_record_logs(tx, table_name, record_id)
                    .map_err(DomainError::from)
            })
        })?;
        Ok(deleted)
    }

    /// Purge the entire trail. Demands explicit confirmation so the most
    /// destructive operation cannot happen by accident.
    pub fn purge_all(&self, principal: &Principal, confirm: bool) -> Result<u64, DomainError> {
        principal.require(Role::Admin)?;
        if !confirm {
            return Err(DomainError::validation(
                "deleting all audit logs requires confirm=true",
            ));
        }
        let deleted: u64 = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                retention::delete_all_logs(tx).map_err(DomainError::from)
            })
        })?;
        // Reclaim the WAL after a mass delete.
        self.db.checkpoint().map_err(DomainError::from)?;
        Ok(deleted)
    }
}
