//! Certificate endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use gapcert_core::types::listing::Page;
use gapcert_core::types::Certificate;
use gapcert_service::certificates::{CancellationDetail, IssueCertificate};
use gapcert_storage::queries::certificates::CertificateFilter;

use super::{build_page, run_blocking, ApiError, AuthPrincipal};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub certificate_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionBody {
    pub version: i64,
}

pub async fn issue(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(body): Json<IssueCertificate>,
) -> Result<Json<IssueResponse>, ApiError> {
    let service = state.certificates.clone();
    let certificate_id = run_blocking("issue_certificate", principal, move || {
        service.issue(&principal, body)
    })
    .await?;
    Ok(Json(IssueResponse { certificate_id }))
}

pub async fn request_cancellation(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<i64>,
    Json(body): Json<CancellationDetail>,
) -> Result<Json<Certificate>, ApiError> {
    let service = state.certificates.clone();
    let certificate = run_blocking("request_cancellation", principal, move || {
        service.request_cancellation(&principal, id, body)
    })
    .await?;
    Ok(Json(certificate))
}

pub async fn update_cancellation_detail(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<i64>,
    Json(body): Json<CancellationDetail>,
) -> Result<Json<Certificate>, ApiError> {
    let service = state.certificates.clone();
    let certificate = run_blocking("update_cancellation_detail", principal, move || {
        service.update_cancellation_detail(&principal, id, body)
    })
    .await?;
    Ok(Json(certificate))
}

pub async fn revoke(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<i64>,
    Json(body): Json<VersionBody>,
) -> Result<Json<Certificate>, ApiError> {
    let service = state.certificates.clone();
    let certificate = run_blocking("revoke_certificate", principal, move || {
        service.revoke(&principal, id, body.version)
    })
    .await?;
    Ok(Json(certificate))
}

pub async fn get_one(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<i64>,
) -> Result<Json<Certificate>, ApiError> {
    let service = state.certificates.clone();
    let certificate = run_blocking("get_certificate", principal, move || {
        service.get(&principal, id)
    })
    .await?;
    Ok(Json(certificate))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateListParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    pub multi_sort_meta: Option<String>,
    pub active: Option<bool>,
    pub cancel_request: Option<bool>,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
}

pub async fn list(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Query(params): Query<CertificateListParams>,
) -> Result<Json<Page<Certificate>>, ApiError> {
    let page = build_page(
        params.limit,
        params.offset,
        params.sort_field,
        params.sort_order,
        params.multi_sort_meta.as_deref(),
    )?;
    let filter = CertificateFilter {
        farm_owner_user_id: None,
        active: params.active,
        cancel_request: params.cancel_request,
        effective_from: params.effective_from,
        effective_to: params.effective_to,
    };

    let service = state.certificates.clone();
    let page = run_blocking("list_certificates", principal, move || {
        service.list(&principal, filter, page)
    })
    .await?;
    Ok(Json(page))
}
