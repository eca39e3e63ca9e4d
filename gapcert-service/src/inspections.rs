//! Inspection lifecycle: scheduling, evaluation saves, visit completion,
//! and result finalization.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gapcert_core::errors::DomainError;
use gapcert_core::types::listing::{Page, PageRequest, Paginator};
use gapcert_core::types::{
    EvaluationResult, Inspection, InspectionItem, InspectionResult, InspectionStatus, Principal,
    Requirement, Role,
};
use serde::{Deserialize, Serialize};

use gapcert_storage::connection::writer::with_immediate_transaction;
use gapcert_storage::connection::DatabaseManager;
use gapcert_storage::now_epoch;
use gapcert_storage::queries::inspections::{self, InspectionFilter};
use gapcert_storage::queries::{farms, requirements, templates};
use gapcert_storage::versioned;

use crate::aggregation::{self, RequirementSummary};
use crate::audit;
use crate::lifecycle;

/// Body of `POST /inspections/schedule`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInspection {
    pub rubber_farm_id: i64,
    pub inspection_type_id: i64,
    pub inspection_date_and_time: DateTime<Utc>,
    #[serde(default)]
    pub additional_auditor_ids: Vec<i64>,
}

/// Body of `PUT /requirements/{id}` — one evaluation save.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEvaluation {
    pub evaluation_result: EvaluationResult,
    pub evaluation_method: Option<String>,
    pub note: Option<String>,
    pub version: i64,
}

/// An inspection with its co-auditors and checklist tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionDetail {
    pub inspection: Inspection,
    pub additional_auditor_ids: Vec<i64>,
    pub items: Vec<InspectionItem>,
    pub requirements: Vec<Requirement>,
}

/// Outcome of finalization: the computed verdict and its aggregates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeOutcome {
    pub result: InspectionResult,
    #[serde(flatten)]
    pub summary: RequirementSummary,
}

#[derive(Clone)]
pub struct InspectionService {
    db: Arc<DatabaseManager>,
    compliance_threshold: u32,
    max_page_limit: u32,
}

impl InspectionService {
    pub fn new(db: Arc<DatabaseManager>, compliance_threshold: u32, max_page_limit: u32) -> Self {
        Self {
            db,
            compliance_threshold,
            max_page_limit,
        }
    }

    /// Auditor schedules a visit: creates the inspection in
    /// `AwaitingInspection` and copies the type's checklist templates into
    /// live item/requirement rows, all in one transaction.
    pub fn schedule(
        &self,
        principal: &Principal,
        req: ScheduleInspection,
    ) -> Result<i64, DomainError> {
        principal.require(Role::Auditor)?;
        let scheduled_at = req.inspection_date_and_time.timestamp();
        if scheduled_at <= now_epoch() {
            return Err(DomainError::validation(
                "inspectionDateAndTime must be in the future",
            ));
        }

        let user_id = principal.user_id;
        let inspection_id: i64 = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let now = now_epoch();
                // Farm and type must exist before anything is created.
                farms::get(tx, req.rubber_farm_id)?;
                templates::get_type(tx, req.inspection_type_id)?;

                if inspections::has_active_inspection(tx, req.rubber_farm_id)? {
                    return Err(DomainError::illegal_transition(
                        "inspections",
                        req.rubber_farm_id,
                        "farm already has an inspection in progress",
                    ));
                }

                let item_templates = templates::list_item_templates(tx, req.inspection_type_id)?;
                if item_templates.is_empty() {
                    return Err(DomainError::validation(
                        "inspection type has no checklist configured",
                    ));
                }

                let inspection_id = inspections::insert(
                    tx,
                    req.rubber_farm_id,
                    req.inspection_type_id,
                    scheduled_at,
                    user_id,
                    InspectionStatus::AwaitingInspection,
                    now,
                )?;
                let inspection = inspections::get(tx, inspection_id)?;
                audit::record_create(tx, "inspections", inspection_id, user_id, &inspection, now)?;

                for auditor_id in &req.additional_auditor_ids {
                    inspections::add_auditor(tx, inspection_id, *auditor_id)?;
                }

                for item_template in &item_templates {
                    let item_id = inspections::insert_item(
                        tx,
                        inspection_id,
                        item_template.item_no,
                        &item_template.name,
                        now,
                    )?;
                    let item = InspectionItem {
                        id: item_id,
                        inspection_id,
                        item_no: item_template.item_no,
                        name: item_template.name.clone(),
                        version: 1,
                        created_at: now,
                        updated_at: now,
                    };
                    audit::record_create(tx, "inspection_items", item_id, user_id, &item, now)?;

                    let requirement_templates =
                        templates::list_requirement_templates(tx, item_template.id)?;
                    for req_template in &requirement_templates {
                        let requirement_id = requirements::insert(
                            tx,
                            item_id,
                            req_template.requirement_no,
                            &req_template.name,
                            req_template.level,
                            now,
                        )?;
                        let requirement = Requirement {
                            id: requirement_id,
                            inspection_item_id: item_id,
                            requirement_no: req_template.requirement_no,
                            name: req_template.name.clone(),
                            level: req_template.level,
                            evaluation_result: None,
                            evaluation_method: None,
                            note: None,
                            version: 1,
                            created_at: now,
                            updated_at: now,
                        };
                        audit::record_create(
                            tx,
                            "requirements",
                            requirement_id,
                            user_id,
                            &requirement,
                            now,
                        )?;
                    }
                }

                Ok(inspection_id)
            })
        })?;

        tracing::info!(
            inspection_id,
            rubber_farm_id = req.rubber_farm_id,
            user_id,
            "inspection scheduled"
        );
        Ok(inspection_id)
    }

    /// Auditor records one requirement evaluation. Partial saves of an
    /// item are allowed; only completion demands the full checklist.
    pub fn save_evaluation(
        &self,
        principal: &Principal,
        requirement_id: i64,
        req: SaveEvaluation,
    ) -> Result<Requirement, DomainError> {
        principal.require(Role::Auditor)?;
        if let Some(ref method) = req.evaluation_method {
            if method.trim().is_empty() {
                return Err(DomainError::validation(
                    "evaluationMethod must not be empty when supplied",
                ));
            }
        }

        let user_id = principal.user_id;
        let updated: Requirement = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let now = now_epoch();
                let inspection_id = requirements::inspection_of(tx, requirement_id)?;
                let inspection = inspections::get(tx, inspection_id)?;
                if !lifecycle::can_record_evaluation(inspection.status) {
                    return Err(DomainError::illegal_transition(
                        "inspections",
                        inspection_id,
                        "evaluations can no longer be recorded",
                    ));
                }

                let old_row = requirements::get(tx, requirement_id)?;
                requirements::update_evaluation(
                    tx,
                    requirement_id,
                    req.evaluation_result,
                    req.evaluation_method.as_deref(),
                    req.note.as_deref(),
                    req.version,
                    now,
                )?;
                let new_row = requirements::get(tx, requirement_id)?;
                audit::record_update(
                    tx,
                    "requirements",
                    requirement_id,
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

    /// Auditor marks the visit complete: `AwaitingInspection →
    /// Inspected{AwaitingResult}`. Rejected while any requirement of the
    /// inspection lacks an evaluation.
    pub fn complete(
        &self,
        principal: &Principal,
        inspection_id: i64,
        expected_version: i64,
    ) -> Result<Inspection, DomainError> {
        principal.require(Role::Auditor)?;

        let user_id = principal.user_id;
        let updated: Inspection = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let now = now_epoch();
                let old_row = inspections::get(tx, inspection_id)?;
                // Stale clients get the conflict, not a lifecycle error
                // computed against state they never saw.
                versioned::ensure_version(tx, "inspections", inspection_id, expected_version)?;
                if !lifecycle::can_complete(old_row.status) {
                    return Err(DomainError::illegal_transition(
                        "inspections",
                        inspection_id,
                        "inspection is not awaiting its visit",
                    ));
                }
                let unevaluated = requirements::count_unevaluated(tx, inspection_id)?;
                if unevaluated > 0 {
                    return Err(DomainError::illegal_transition(
                        "inspections",
                        inspection_id,
                        format!("{unevaluated} requirement(s) still lack an evaluation"),
                    ));
                }

                inspections::update_status(
                    tx,
                    inspection_id,
                    InspectionStatus::Inspected,
                    Some(InspectionResult::AwaitingResult),
                    expected_version,
                    now,
                )?;
                let new_row = inspections::get(tx, inspection_id)?;
                audit::record_update(
                    tx,
                    "inspections",
                    inspection_id,
                    user_id,
                    &old_row,
                    &new_row,
                    now,
                )?;
                Ok(new_row)
            })
        })?;

        tracing::info!(inspection_id, user_id, "inspection visit completed");
        Ok(updated)
    }

    /// Finalize the result. The verdict is never chosen by the caller —
    /// it is computed from the recorded evaluations and persisted with
    /// the aggregates under the version guard.
    pub fn finalize(
        &self,
        principal: &Principal,
        inspection_id: i64,
        expected_version: i64,
    ) -> Result<FinalizeOutcome, DomainError> {
        principal.require(Role::Auditor)?;

        let user_id = principal.user_id;
        let threshold = self.compliance_threshold;
        let outcome: FinalizeOutcome = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let now = now_epoch();
                let old_row = inspections::get(tx, inspection_id)?;
                versioned::ensure_version(tx, "inspections", inspection_id, expected_version)?;
                if !lifecycle::can_finalize(old_row.status, old_row.result) {
                    return Err(DomainError::illegal_transition(
                        "inspections",
                        inspection_id,
                        "result is not awaiting finalization",
                    ));
                }

                let evaluations = requirements::list_for_inspection(tx, inspection_id)?;
                let summary = aggregation::summarize(
                    evaluations
                        .iter()
                        .map(|r| (r.level, r.evaluation_result)),
                    threshold,
                );
                let result = if summary.is_passed {
                    InspectionResult::Pass
                } else {
                    InspectionResult::Fail
                };

                inspections::finalize(
                    tx,
                    inspection_id,
                    result,
                    summary.main_failed as i64,
                    summary.secondary_compliance as i64,
                    expected_version,
                    now,
                )?;
                let new_row = inspections::get(tx, inspection_id)?;
                audit::record_update(
                    tx,
                    "inspections",
                    inspection_id,
                    user_id,
                    &old_row,
                    &new_row,
                    now,
                )?;
                Ok(FinalizeOutcome { result, summary })
            })
        })?;

        tracing::info!(
            inspection_id,
            user_id,
            result = outcome.result.as_str(),
            "inspection result finalized"
        );
        Ok(outcome)
    }

    /// Inspection with its co-auditors and full requirement tree.
    pub fn get(
        &self,
        principal: &Principal,
        inspection_id: i64,
    ) -> Result<InspectionDetail, DomainError> {
        let (detail, owner) = self.db.with_reader(|conn| {
            let inspection = inspections::get(conn, inspection_id)?;
            let items = inspections::list_items(conn, inspection_id)?;
            let requirements = requirements::list_for_inspection(conn, inspection_id)?;
            let additional_auditor_ids = inspections::list_auditors(conn, inspection_id)?;
            let farm = farms::get(conn, inspection.rubber_farm_id)?;
            Ok::<_, DomainError>((
                InspectionDetail {
                    inspection,
                    additional_auditor_ids,
                    items,
                    requirements,
                },
                farm.owner_user_id,
            ))
        })?;
        if principal.role == Role::Farmer && owner != principal.user_id {
            return Err(DomainError::authorization("not the owner of this farm"));
        }
        Ok(detail)
    }

    /// Role-scoped, filtered, sorted, paged inspection listing.
    pub fn list(
        &self,
        principal: &Principal,
        mut filter: InspectionFilter,
        mut page: PageRequest,
    ) -> Result<Page<Inspection>, DomainError> {
        if principal.role == Role::Farmer {
            filter.farm_owner_user_id = Some(principal.user_id);
        }
        page.clamp_limit(self.max_page_limit);
        let order_by = inspections::SORT_COLUMNS
            .order_by(&page.sort_specs())
            .map_err(|e| DomainError::validation(format!("unknown sort field: {}", e.field)))?;

        let (results, total) = self.db.with_reader(|conn| {
            inspections::list_paged(conn, &filter, &order_by, page.limit, page.offset)
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
