//! Farm registration and the farm-with-details update workflow.
//!
//! The update path wraps two version domains (the farm and each planting
//! detail) in a single transaction: every guard must hold or nothing is
//! written.

use std::sync::Arc;

use gapcert_core::errors::DomainError;
use gapcert_core::types::listing::{Page, PageRequest, Paginator};
use gapcert_core::types::{FarmData, PlantingData, PlantingDetail, Principal, Role, RubberFarm};
use serde::Deserialize;

use gapcert_storage::connection::writer::with_immediate_transaction;
use gapcert_storage::connection::DatabaseManager;
use gapcert_storage::now_epoch;
use gapcert_storage::queries::farms::{self, FarmFilter};
use gapcert_storage::queries::planting_details;

use crate::audit;

/// `farmData` as it arrives on the wire: fields plus the observed version.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmPayload {
    #[serde(flatten)]
    pub data: FarmData,
    pub version: i64,
}

/// An existing planting detail being edited: id, fields, observed version.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingDetailPayload {
    pub id: i64,
    #[serde(flatten)]
    pub data: PlantingData,
    pub version: i64,
}

/// Body of `PUT /rubber-farms/{id}/update-with-details`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFarmWithDetails {
    pub farm_data: FarmPayload,
    #[serde(default)]
    pub existing_planting_details: Vec<ExistingDetailPayload>,
    #[serde(default)]
    pub new_planting_details: Vec<PlantingData>,
    #[serde(default)]
    pub deleted_planting_detail_ids: Vec<i64>,
}

#[derive(Clone)]
pub struct FarmService {
    db: Arc<DatabaseManager>,
    max_page_limit: u32,
}

impl FarmService {
    pub fn new(db: Arc<DatabaseManager>, max_page_limit: u32) -> Self {
        Self { db, max_page_limit }
    }

    /// Farmer registers a farm with its initial planting details.
    pub fn create(
        &self,
        principal: &Principal,
        data: FarmData,
        details: Vec<PlantingData>,
    ) -> Result<(RubberFarm, Vec<PlantingDetail>), DomainError> {
        principal.require(Role::Farmer)?;
        validate_farm_data(&data)?;
        for detail in &details {
            validate_planting_data(detail)?;
        }

        let user_id = principal.user_id;
        let result: (RubberFarm, Vec<PlantingDetail>) = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let now = now_epoch();
                let farm_id = farms::insert(tx, user_id, &data, now)?;
                let farm = farms::get(tx, farm_id)?;
                audit::record_create(tx, "rubber_farms", farm_id, user_id, &farm, now)?;

                for detail in &details {
                    let detail_id = planting_details::insert(tx, farm_id, detail, now)?;
                    let row = planting_details::get(tx, detail_id)?;
                    audit::record_create(tx, "planting_details", detail_id, user_id, &row, now)?;
                }

                let rows = planting_details::list_for_farm(tx, farm_id)?;
                Ok::<_, DomainError>((farm, rows))
            })
        })?;

        tracing::info!(farm_id = result.0.id, user_id, "farm registered");
        Ok(result)
    }

    pub fn get(
        &self,
        principal: &Principal,
        farm_id: i64,
    ) -> Result<(RubberFarm, Vec<PlantingDetail>), DomainError> {
        let (farm, details) = self.db.with_reader(|conn| {
            let farm = farms::get(conn, farm_id)?;
            let details = planting_details::list_for_farm(conn, farm_id)?;
            Ok::<_, DomainError>((farm, details))
        })?;
        ensure_can_touch(principal, &farm)?;
        Ok((farm, details))
    }

    /// The combined farm + planting-details update: farm fields, edits to
    /// existing details, new details, and deletions, all version-guarded
    /// and all-or-nothing.
    pub fn update_with_details(
        &self,
        principal: &Principal,
        farm_id: i64,
        req: UpdateFarmWithDetails,
    ) -> Result<(RubberFarm, Vec<PlantingDetail>), DomainError> {
        validate_farm_data(&req.farm_data.data)?;
        for existing in &req.existing_planting_details {
            validate_planting_data(&existing.data)?;
            if req.deleted_planting_detail_ids.contains(&existing.id) {
                return Err(DomainError::validation(format!(
                    "planting detail {} is both edited and deleted",
                    existing.id
                )));
            }
        }
        for new_detail in &req.new_planting_details {
            validate_planting_data(new_detail)?;
        }

        let user_id = principal.user_id;
        let principal = *principal;
        let result: (RubberFarm, Vec<PlantingDetail>) = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let now = now_epoch();
                let old_farm = farms::get(tx, farm_id)?;
                ensure_can_touch(&principal, &old_farm)?;

                farms::update(tx, farm_id, &req.farm_data.data, req.farm_data.version, now)?;
                let new_farm = farms::get(tx, farm_id)?;
                audit::record_update(
                    tx,
                    "rubber_farms",
                    farm_id,
                    user_id,
                    &old_farm,
                    &new_farm,
                    now,
                )?;

                for existing in &req.existing_planting_details {
                    let old_row = planting_details::get(tx, existing.id)?;
                    if old_row.rubber_farm_id != farm_id {
                        return Err(DomainError::validation(format!(
                            "planting detail {} does not belong to farm {farm_id}",
                            existing.id
                        )));
                    }
                    planting_details::update(
                        tx,
                        existing.id,
                        &existing.data,
                        existing.version,
                        now,
                    )?;
                    let new_row = planting_details::get(tx, existing.id)?;
                    audit::record_update(
                        tx,
                        "planting_details",
                        existing.id,
                        user_id,
                        &old_row,
                        &new_row,
                        now,
                    )?;
                }

                for new_detail in &req.new_planting_details {
                    let detail_id = planting_details::insert(tx, farm_id, new_detail, now)?;
                    let row = planting_details::get(tx, detail_id)?;
                    audit::record_create(tx, "planting_details", detail_id, user_id, &row, now)?;
                }

                for &deleted_id in &req.deleted_planting_detail_ids {
                    let old_row = planting_details::get(tx, deleted_id)?;
                    if old_row.rubber_farm_id != farm_id {
                        return Err(DomainError::validation(format!(
                            "planting detail {deleted_id} does not belong to farm {farm_id}"
                        )));
                    }
                    planting_details::delete(tx, deleted_id)?;
                    audit::record_delete(
                        tx,
                        "planting_details",
                        deleted_id,
                        user_id,
                        &old_row,
                        now,
                    )?;
                }

                let rows = planting_details::list_for_farm(tx, farm_id)?;
                Ok((new_farm, rows))
            })
        })?;

        tracing::info!(farm_id, user_id, "farm updated with details");
        Ok(result)
    }

    /// Role-scoped, filtered, sorted, paged farm listing.
    pub fn list(
        &self,
        principal: &Principal,
        mut filter: FarmFilter,
        mut page: PageRequest,
    ) -> Result<Page<RubberFarm>, DomainError> {
        if principal.role == Role::Farmer {
            filter.owner_user_id = Some(principal.user_id);
        }
        page.clamp_limit(self.max_page_limit);
        let order_by = farms::SORT_COLUMNS
            .order_by(&page.sort_specs())
            .map_err(|e| DomainError::validation(format!("unknown sort field: {}", e.field)))?;

        let (results, total) = self.db.with_reader(|conn| {
            farms::list_paged(conn, &filter, &order_by, page.limit, page.offset)
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

/// Farmers may only touch farms they own; auditors may touch any (the
/// garden-data flow). Other roles have no farm surface.
fn ensure_can_touch(principal: &Principal, farm: &RubberFarm) -> Result<(), DomainError> {
    match principal.role {
        Role::Farmer => {
            if farm.owner_user_id != principal.user_id {
                return Err(DomainError::authorization("not the owner of this farm"));
            }
            Ok(())
        }
        Role::Auditor => Ok(()),
        _ => Err(DomainError::authorization("requires farmer or auditor role")),
    }
}

fn validate_farm_data(data: &FarmData) -> Result<(), DomainError> {
    for (field, value) in [
        ("villageName", &data.village_name),
        ("subdistrict", &data.subdistrict),
        ("district", &data.district),
        ("province", &data.province),
    ] {
        if value.trim().is_empty() {
            return Err(DomainError::validation(format!("{field} must not be empty")));
        }
    }
    Ok(())
}

fn validate_planting_data(data: &PlantingData) -> Result<(), DomainError> {
    if data.specie.trim().is_empty() {
        return Err(DomainError::validation("specie must not be empty"));
    }
    if data.area_of_plot <= 0.0 {
        return Err(DomainError::validation("areaOfPlot must be positive"));
    }
    if data.number_of_rubber < 0 || data.number_of_tapping < 0 || data.age_of_rubber < 0 {
        return Err(DomainError::validation("tree counts must not be negative"));
    }
    if let Some(month) = data.month_of_tapping {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation("monthOfTapping must be 1-12"));
        }
    }
    Ok(())
}
