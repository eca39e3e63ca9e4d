//! Farm endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use gapcert_core::types::listing::Page;
use gapcert_core::types::{FarmData, PlantingData, PlantingDetail, RubberFarm};
use gapcert_service::farms::UpdateFarmWithDetails;
use gapcert_storage::queries::farms::FarmFilter;

use super::{build_page, run_blocking, ApiError, AuthPrincipal};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFarmRequest {
    pub farm_data: FarmData,
    #[serde(default)]
    pub planting_details: Vec<PlantingData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFarmResponse {
    pub rubber_farm_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmWithDetailsResponse {
    pub rubber_farm: RubberFarm,
    pub planting_details: Vec<PlantingDetail>,
}

pub async fn create(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(body): Json<CreateFarmRequest>,
) -> Result<Json<CreateFarmResponse>, ApiError> {
    let service = state.farms.clone();
    let (farm, _) = run_blocking("create_farm", principal, move || {
        service.create(&principal, body.farm_data, body.planting_details)
    })
    .await?;
    Ok(Json(CreateFarmResponse {
        rubber_farm_id: farm.id,
    }))
}

pub async fn get_one(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<i64>,
) -> Result<Json<FarmWithDetailsResponse>, ApiError> {
    let service = state.farms.clone();
    let (rubber_farm, planting_details) =
        run_blocking("get_farm", principal, move || service.get(&principal, id)).await?;
    Ok(Json(FarmWithDetailsResponse {
        rubber_farm,
        planting_details,
    }))
}

pub async fn update_with_details(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<i64>,
    Json(body): Json<UpdateFarmWithDetails>,
) -> Result<Json<FarmWithDetailsResponse>, ApiError> {
    let service = state.farms.clone();
    let (rubber_farm, planting_details) =
        run_blocking("update_farm_with_details", principal, move || {
            service.update_with_details(&principal, id, body)
        })
        .await?;
    Ok(Json(FarmWithDetailsResponse {
        rubber_farm,
        planting_details,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmListParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    pub multi_sort_meta: Option<String>,
    pub province: Option<String>,
    pub text: Option<String>,
    pub created_from: Option<i64>,
    pub created_to: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Query(params): Query<FarmListParams>,
) -> Result<Json<Page<RubberFarm>>, ApiError> {
    let page = build_page(
        params.limit,
        params.offset,
        params.sort_field,
        params.sort_order,
        params.multi_sort_meta.as_deref(),
    )?;
    let filter = FarmFilter {
        owner_user_id: None,
        province: params.province,
        text: params.text,
        created_from: params.created_from,
        created_to: params.created_to,
    };

    let service = state.farms.clone();
    let page = run_blocking("list_farms", principal, move || {
        service.list(&principal, filter, page)
    })
    .await?;
    Ok(Json(page))
}
