//! Certificate lifecycle: issuance from a passed inspection, the
//! farmer's cancellation-request sub-workflow, and committee revocation.

use std::sync::Arc;

use chrono::{Months, NaiveDate};
use gapcert_core::errors::DomainError;
use gapcert_core::types::listing::{Page, PageRequest, Paginator};
use gapcert_core::types::{Certificate, Principal, Role, MAX_CANCEL_DETAIL_LEN};
use serde::Deserialize;

use gapcert_storage::connection::writer::with_immediate_transaction;
use gapcert_storage::connection::DatabaseManager;
use gapcert_storage::now_epoch;
use gapcert_storage::queries::certificates::{self, CertificateFilter};
use gapcert_storage::queries::inspections;

use crate::audit;
use crate::lifecycle;

/// Body of `POST /certificates/issue`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificate {
    pub inspection_id: i64,
    pub effective_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub files: Vec<String>,
}

/// Body of the cancellation-request and detail-edit endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationDetail {
    pub detail: String,
    pub version: i64,
}

#[derive(Clone)]
pub struct CertificateService {
    db: Arc<DatabaseManager>,
    validity_months: u32,
    max_page_limit: u32,
}

impl CertificateService {
    pub fn new(db: Arc<DatabaseManager>, validity_months: u32, max_page_limit: u32) -> Self {
        Self {
            db,
            validity_months,
            max_page_limit,
        }
    }

    /// Committee issues a certificate from a passed inspection. All
    /// preconditions are checked before anything is written.
    pub fn issue(&self, principal: &Principal, req: IssueCertificate) -> Result<i64, DomainError> {
        principal.require(Role::Committee)?;
        if req.files.is_empty() {
            return Err(DomainError::validation(
                "at least one supporting file is required",
            ));
        }
        if req.effective_date > req.expiry_date {
            return Err(DomainError::validation(
                "effectiveDate must not be after expiryDate",
            ));
        }
        let max_expiry = req
            .effective_date
            .checked_add_months(Months::new(self.validity_months))
            .ok_or_else(|| DomainError::validation("effectiveDate out of range"))?;
        if req.expiry_date > max_expiry {
            return Err(DomainError::validation(format!(
                "expiryDate exceeds the {}-month validity cap",
                self.validity_months
            )));
        }

        let user_id = principal.user_id;
        let certificate_id: i64 = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let now = now_epoch();
                let inspection = inspections::get(tx, req.inspection_id)?;
                if !inspection.is_terminal()
                    || inspection.result != Some(gapcert_core::types::InspectionResult::Pass)
                {
                    return Err(DomainError::illegal_transition(
                        "inspections",
                        req.inspection_id,
                        "certificate requires a passed inspection",
                    ));
                }
                if certificates::exists_for_inspection(tx, req.inspection_id)? {
                    return Err(DomainError::validation(
                        "inspection already has a certificate",
                    ));
                }

                let certificate_no = format!(
                    "GAP-{}-{:06}",
                    req.effective_date.format("%Y"),
                    req.inspection_id
                );
                let certificate_id = certificates::insert(
                    tx,
                    req.inspection_id,
                    &certificate_no,
                    req.effective_date,
                    req.expiry_date,
                    &req.files,
                    now,
                )?;
                let certificate = certificates::get(tx, certificate_id)?;
                audit::record_create(
                    tx,
                    "certificates",
                    certificate_id,
                    user_id,
                    &certificate,
                    now,
                )?;
                Ok(certificate_id)
            })
        })?;

        tracing::info!(
            certificate_id,
            inspection_id = req.inspection_id,
            user_id,
            "certificate issued"
        );
        Ok(certificate_id)
    }

    /// Farmer opens a cancellation request on their own certificate.
    pub fn request_cancellation(
        &self,
        principal: &Principal,
        certificate_id: i64,
        req: CancellationDetail,
    ) -> Result<Certificate, DomainError> {
        principal.require(Role::Farmer)?;
        validate_detail(&req.detail)?;

        let user_id = principal.user_id;
        let updated: Certificate = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let now = now_epoch();
                let owner = certificates::farm_owner(tx, certificate_id)?;
                if owner != user_id {
                    return Err(DomainError::authorization(
                        "not the owner of this certificate",
                    ));
                }
                let old_row = certificates::get(tx, certificate_id)?;
                if !lifecycle::can_request_cancellation(old_row.state()) {
                    return Err(DomainError::illegal_transition(
                        "certificates",
                        certificate_id,
                        "certificate is not in the issued state",
                    ));
                }

                certificates::set_cancel_request(tx, certificate_id, &req.detail, req.version, now)?;
                let new_row = certificates::get(tx, certificate_id)?;
                audit::record_update(
                    tx,
                    "certificates",
                    certificate_id,
                    user_id,
                    &old_row,
                    &new_row,
                    now,
                )?;
                Ok(new_row)
            })
        })?;

        tracing::info!(certificate_id, user_id, "cancellation requested");
        Ok(updated)
    }

    /// Farmer edits the free-text detail while the request is open.
    pub fn update_cancellation_detail(
        &self,
        principal: &Principal,
        certificate_id: i64,
        req: CancellationDetail,
    ) -> Result<Certificate, DomainError> {
        principal.require(Role::Farmer)?;
        validate_detail(&req.detail)?;

        let user_id = principal.user_id;
        let updated: Certificate = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let now = now_epoch();
                let owner = certificates::farm_owner(tx, certificate_id)?;
                if owner != user_id {
                    return Err(DomainError::authorization(
                        "not the owner of this certificate",
                    ));
                }
                let old_row = certificates::get(tx, certificate_id)?;
                if !lifecycle::can_edit_cancellation_detail(old_row.state()) {
                    return Err(DomainError::illegal_transition(
                        "certificates",
                        certificate_id,
                        "no open cancellation request",
                    ));
                }

                certificates::update_cancel_detail(
                    tx,
                    certificate_id,
                    &req.detail,
                    req.version,
                    now,
                )?;
                let new_row = certificates::get(tx, certificate_id)?;
                audit::record_update(
                    tx,
                    "certificates",
                    certificate_id,
                    user_id,
                    &old_row,
                    &new_row,
                    now,
                )?;
                Ok(new_row)
            })
        })?;

        Ok(updated)
    }

    /// Committee revokes a certificate with an open cancellation request.
    pub fn revoke(
        &self,
        principal: &Principal,
        certificate_id: i64,
        expected_version: i64,
    ) -> Result<Certificate, DomainError> {
        principal.require(Role::Committee)?;

        let user_id = principal.user_id;
        let updated: Certificate = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let now = now_epoch();
                let old_row = certificates::get(tx, certificate_id)?;
                if !lifecycle::can_revoke(old_row.state()) {
                    return Err(DomainError::illegal_transition(
                        "certificates",
                        certificate_id,
                        "certificate has no open cancellation request",
                    ));
                }

                certificates::revoke(tx, certificate_id, expected_version, now)?;
                let new_row = certificates::get(tx, certificate_id)?;
                audit::record_update(
                    tx,
                    "certificates",
                    certificate_id,
                    user_id,
                    &old_row,
                    &new_row,
                    now,
                )?;
                Ok(new_row)
            })
        })?;

        tracing::info!(certificate_id, user_id, "certificate revoked");
        Ok(updated)
    }

    pub fn get(
        &self,
        principal: &Principal,
        certificate_id: i64,
    ) -> Result<Certificate, DomainError> {
        let (certificate, owner) = self.db.with_reader(|conn| {
            let certificate = certificates::get(conn, certificate_id)?;
            let owner = certificates::farm_owner(conn, certificate_id)?;
            Ok::<_, DomainError>((certificate, owner))
        })?;
        if principal.role == Role::Farmer && owner != principal.user_id {
            return Err(DomainError::authorization(
                "not the owner of this certificate",
            ));
        }
        Ok(certificate)
    }

    /// Role-scoped, filtered, sorted, paged certificate listing.
    pub fn list(
        &self,
        principal: &Principal,
        mut filter: CertificateFilter,
        mut page: PageRequest,
    ) -> Result<Page<Certificate>, DomainError> {
        if principal.role == Role::Farmer {
            filter.farm_owner_user_id = Some(principal.user_id);
        }
        page.clamp_limit(self.max_page_limit);
        let order_by = certificates::SORT_COLUMNS
            .order_by(&page.sort_specs())
            .map_err(|e| DomainError::validation(format!("unknown sort field: {}", e.field)))?;

        let (results, total) = self.db.with_reader(|conn| {
            certificates::list_paged(conn, &filter, &order_by, page.limit, page.offset)
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
}

fn validate_detail(detail: &str) -> Result<(), DomainError> {
    if detail.trim().is_empty() {
        return Err(DomainError::validation("detail must not be empty"));
    }
    if detail.chars().count() > MAX_CANCEL_DETAIL_LEN {
        return Err(DomainError::validation(format!(
            "detail must not exceed {MAX_CANCEL_DETAIL_LEN} characters"
        )));
    }
    Ok(())
}
