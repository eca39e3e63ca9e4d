//! Router, principal extraction, and the typed-error → status mapping.
//!
//! One fixed status per error type: Validation → 400, Authorization →
//! 401, NotFound → 404, VersionConflict → 409 with a `userMessage`
//! telling the caller to reload, IllegalTransition → 409 with a plain
//! `message`, storage/unexpected → 500 after logging. Conflicts are
//! never retried server-side.

mod audit_logs;
mod certificates;
mod farms;
mod inspections;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Serialize;

use gapcert_core::errors::{DomainError, ErrorCode};
use gapcert_core::types::listing::{PageRequest, SortOrder, SortSpec};
use gapcert_core::types::{Principal, Role};

use crate::state::AppState;

pub type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "userMessage", skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/rubber-farms", post(farms::create))
        .route("/rubber-farms/paginated", get(farms::list))
        .route("/rubber-farms/{id}", get(farms::get_one))
        .route(
            "/rubber-farms/{id}/update-with-details",
            put(farms::update_with_details),
        )
        .route("/inspections/schedule", post(inspections::schedule))
        .route("/inspections/paginated", get(inspections::list))
        .route("/inspections/{id}", get(inspections::get_one))
        .route("/inspections/{id}/complete", post(inspections::complete))
        .route("/inspections/{id}/finalize", post(inspections::finalize))
        .route("/requirements/{id}", put(inspections::save_evaluation))
        .route("/certificates/issue", post(certificates::issue))
        .route("/certificates/paginated", get(certificates::list))
        .route("/certificates/{id}", get(certificates::get_one))
        .route(
            "/certificates/{id}/request-cancellation",
            put(certificates::request_cancellation),
        )
        .route(
            "/certificates/{id}/cancellation-detail",
            put(certificates::update_cancellation_detail),
        )
        .route("/certificates/{id}/revoke", put(certificates::revoke))
        .route("/audit-logs/paginated", get(audit_logs::list))
        .route("/audit-logs/old", delete(audit_logs::purge_old))
        .route("/audit-logs/record", delete(audit_logs::purge_record))
        .route("/audit-logs/all", delete(audit_logs::purge_all))
        .with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// The authenticated principal, as supplied by the upstream gateway in
/// trusted headers. Missing or malformed identity is a 401.
pub struct AuthPrincipal(pub Principal);

impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());
        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|v| v.to_str().ok())
            .and_then(Role::from_str);

        match (user_id, role) {
            (Some(user_id), Some(role)) => Ok(AuthPrincipal(Principal::new(user_id, role))),
            _ => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody {
                    message: Some("missing or invalid authentication".to_string()),
                    user_message: None,
                }),
            )),
        }
    }
}

/// Translate a domain error into its fixed status + body shape.
pub(crate) fn domain_error(operation: &'static str, principal: &Principal, e: DomainError) -> ApiError {
    let status = match &e {
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::Authorization { .. } => StatusCode::UNAUTHORIZED,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::VersionConflict { .. } => StatusCode::CONFLICT,
        DomainError::IllegalTransition { .. } => StatusCode::CONFLICT,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(
            operation,
            user_id = principal.user_id,
            role = principal.role.as_str(),
            error_code = e.error_code(),
            error = %e,
            "unexpected failure"
        );
        return (
            status,
            Json(ErrorBody {
                message: Some("internal server error".to_string()),
                user_message: None,
            }),
        );
    }

    tracing::debug!(
        operation,
        user_id = principal.user_id,
        error_code = e.error_code(),
        error = %e,
        "request rejected"
    );

    if let DomainError::VersionConflict { .. } = e {
        return (
            status,
            Json(ErrorBody {
                message: None,
                user_message: Some(format!("{e}; reload the record and try again")),
            }),
        );
    }

    (
        status,
        Json(ErrorBody {
            message: Some(e.to_string()),
            user_message: None,
        }),
    )
}

/// Run a synchronous service call on the blocking pool.
pub(crate) async fn run_blocking<T, F>(
    operation: &'static str,
    principal: Principal,
    f: F,
) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(|e| domain_error(operation, &principal, e)),
        Err(join_error) => {
            tracing::error!(operation, error = %join_error, "blocking task failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    message: Some("internal server error".to_string()),
                    user_message: None,
                }),
            ))
        }
    }
}

pub(crate) fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            message: Some(message.into()),
            user_message: None,
        }),
    )
}

/// Assemble a [`PageRequest`] from the raw query parameters shared by
/// every list endpoint. `multiSortMeta` arrives as a JSON-encoded array
/// of `{field, order}`.
pub(crate) fn build_page(
    limit: Option<u32>,
    offset: Option<u32>,
    sort_field: Option<String>,
    sort_order: Option<String>,
    multi_sort_meta: Option<&str>,
) -> Result<PageRequest, ApiError> {
    let sort_order = match sort_order {
        Some(raw) => Some(
            SortOrder::from_str(&raw)
                .ok_or_else(|| bad_request(format!("invalid sortOrder: {raw}")))?,
        ),
        None => None,
    };
    let multi_sort: Vec<SortSpec> = match multi_sort_meta {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|_| bad_request("multiSortMeta must be a JSON array of {field, order}"))?,
        None => Vec::new(),
    };

    Ok(PageRequest {
        limit: limit.unwrap_or(50),
        offset: offset.unwrap_or(0),
        sort_field,
        sort_order,
        multi_sort,
    })
}
