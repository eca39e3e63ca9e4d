//! Audit browser and retention endpoints (admin-only; the services
//! enforce the role).

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use gapcert_core::types::listing::Page;
use gapcert_core::types::{AuditAction, AuditLogEntry};
use gapcert_storage::queries::audit_logs::AuditLogFilter;

use super::{bad_request, build_page, run_blocking, ApiError, AuthPrincipal};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeResponse {
    pub deleted_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditListParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    pub multi_sort_meta: Option<String>,
    pub table_name: Option<String>,
    pub record_id: Option<i64>,
    pub user_id: Option<i64>,
    pub action: Option<String>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Query(params): Query<AuditListParams>,
) -> Result<Json<Page<AuditLogEntry>>, ApiError> {
    let page = build_page(
        params.limit,
        params.offset,
        params.sort_field,
        params.sort_order,
        params.multi_sort_meta.as_deref(),
    )?;
    let action = match params.action {
        Some(raw) => Some(
            AuditAction::from_str(&raw)
                .ok_or_else(|| bad_request(format!("invalid action: {raw}")))?,
        ),
        None => None,
    };
    let filter = AuditLogFilter {
        table_name: params.table_name,
        record_id: params.record_id,
        user_id: params.user_id,
        action,
        start_date: params.start_date,
        end_date: params.end_date,
    };

    let service = state.audit_logs.clone();
    let page = run_blocking("list_audit_logs", principal, move || {
        service.list(&principal, filter, page)
    })
    .await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct PurgeOldParams {
    pub days: Option<u32>,
}

pub async fn purge_old(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Query(params): Query<PurgeOldParams>,
) -> Result<Json<PurgeResponse>, ApiError> {
    let service = state.audit_logs.clone();
    let deleted_count = run_blocking("purge_old_audit_logs", principal, move || {
        service.purge_old(&principal, params.days)
    })
    .await?;
    Ok(Json(PurgeResponse { deleted_count }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeRecordParams {
    pub table_name: String,
    pub record_id: i64,
}

pub async fn purge_record(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Query(params): Query<PurgeRecordParams>,
) -> Result<Json<PurgeResponse>, ApiError> {
    let service = state.audit_logs.clone();
    let deleted_count = run_blocking("purge_record_audit_logs", principal, move || {
        service.purge_record(&principal, &params.table_name, params.record_id)
    })
    .await?;
    Ok(Json(PurgeResponse { deleted_count }))
}

#[derive(Debug, Deserialize)]
pub struct PurgeAllParams {
    pub confirm: Option<bool>,
}

pub async fn purge_all(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Query(params): Query<PurgeAllParams>,
) -> Result<Json<PurgeResponse>, ApiError> {
    let service = state.audit_logs.clone();
    let deleted_count = run_blocking("purge_all_audit_logs", principal, move || {
        service.purge_all(&principal, params.confirm.unwrap_or(false))
    })
    .await?;
    Ok(Json(PurgeResponse { deleted_count }))
}
