//! Shared application state: the database manager and the services
//! constructed over it.

use std::path::Path;
use std::sync::Arc;

use gapcert_core::config::GapcertConfig;
use gapcert_core::errors::StorageError;
use gapcert_service::audit_logs::AuditLogService;
use gapcert_service::certificates::CertificateService;
use gapcert_service::farms::FarmService;
use gapcert_service::inspections::InspectionService;
use gapcert_storage::connection::DatabaseManager;

#[derive(Clone)]
pub struct AppState {
    pub farms: FarmService,
    pub inspections: InspectionService,
    pub certificates: CertificateService,
    pub audit_logs: AuditLogService,
}

impl AppState {
    pub fn new(config: &GapcertConfig) -> Result<Self, StorageError> {
        let db = Arc::new(DatabaseManager::open(Path::new(config.server.db_path()))?);
        let max_page_limit = config.server.max_page_limit();

        Ok(Self {
            farms: FarmService::new(Arc::clone(&db), max_page_limit),
            inspections: InspectionService::new(
                Arc::clone(&db),
                config.certification.compliance_threshold(),
                max_page_limit,
            ),
            certificates: CertificateService::new(
                Arc::clone(&db),
                config.certification.validity_months(),
                max_page_limit,
            ),
            audit_logs: AuditLogService::new(
                Arc::clone(&db),
                config.certification.retention_days(),
                max_page_limit,
            ),
        })
    }
}
