//! Inspection endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use gapcert_core::types::listing::Page;
use gapcert_core::types::{Inspection, InspectionStatus, Requirement};
use gapcert_service::inspections::{
    FinalizeOutcome, InspectionDetail, SaveEvaluation, ScheduleInspection,
};
use gapcert_storage::queries::inspections::InspectionFilter;

use super::{bad_request, build_page, run_blocking, ApiError, AuthPrincipal};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub inspection_id: i64,
}

/// Body of the version-guarded transition endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionBody {
    pub version: i64,
}

pub async fn schedule(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(body): Json<ScheduleInspection>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let service = state.inspections.clone();
    let inspection_id = run_blocking("schedule_inspection", principal, move || {
        service.schedule(&principal, body)
    })
    .await?;
    Ok(Json(ScheduleResponse { inspection_id }))
}

pub async fn save_evaluation(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<i64>,
    Json(body): Json<SaveEvaluation>,
) -> Result<Json<Requirement>, ApiError> {
    let service = state.inspections.clone();
    let requirement = run_blocking("save_evaluation", principal, move || {
        service.save_evaluation(&principal, id, body)
    })
    .await?;
    Ok(Json(requirement))
}

pub async fn complete(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<i64>,
    Json(body): Json<VersionBody>,
) -> Result<Json<Inspection>, ApiError> {
    let service = state.inspections.clone();
    let inspection = run_blocking("complete_inspection", principal, move || {
        service.complete(&principal, id, body.version)
    })
    .await?;
    Ok(Json(inspection))
}

pub async fn finalize(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<i64>,
    Json(body): Json<VersionBody>,
) -> Result<Json<FinalizeOutcome>, ApiError> {
    let service = state.inspections.clone();
    let outcome = run_blocking("finalize_inspection", principal, move || {
        service.finalize(&principal, id, body.version)
    })
    .await?;
    Ok(Json(outcome))
}

pub async fn get_one(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<i64>,
) -> Result<Json<InspectionDetail>, ApiError> {
    let service = state.inspections.clone();
    let detail = run_blocking("get_inspection", principal, move || {
        service.get(&principal, id)
    })
    .await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionListParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    pub multi_sort_meta: Option<String>,
    pub rubber_farm_id: Option<i64>,
    pub status: Option<String>,
    pub date_from: Option<i64>,
    pub date_to: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Query(params): Query<InspectionListParams>,
) -> Result<Json<Page<Inspection>>, ApiError> {
    let page = build_page(
        params.limit,
        params.offset,
        params.sort_field,
        params.sort_order,
        params.multi_sort_meta.as_deref(),
    )?;
    let status = match params.status {
        Some(raw) => Some(
            InspectionStatus::from_str(&raw)
                .ok_or_else(|| bad_request(format!("invalid status: {raw}")))?,
        ),
        None => None,
    };
    let filter = InspectionFilter {
        rubber_farm_id: params.rubber_farm_id,
        farm_owner_user_id: None,
        status,
        date_from: params.date_from,
        date_to: params.date_to,
    };

    let service = state.inspections.clone();
    let page = run_blocking("list_inspections", principal, move || {
        service.list(&principal, filter, page)
    })
    .await?;
    Ok(Json(page))
}
