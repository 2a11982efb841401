//! LGPD portal routes.
//!
//! Every route requires a session. Filing and resolving requests are
//! state-changing and also require the session's CSRF token; the review
//! queue is pastor-only.

use accounts::Role;
use accounts::lgpd::NewLgpdRequest;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use super::auth::{AuthUser, error_response};
use crate::services::lgpd::{self, LgpdError};
use crate::state::AppState;

/// Roles that review and resolve LGPD requests.
pub const REVIEWER_ROLES: &[Role] = &[Role::Pastor];

pub fn lgpd_error_to_status(err: &LgpdError) -> StatusCode {
    match err {
        LgpdError::NotFound(_) => StatusCode::NOT_FOUND,
        LgpdError::DetailsTooLong => StatusCode::UNPROCESSABLE_ENTITY,
        LgpdError::UnknownKind(_) | LgpdError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn lgpd_failure(err: &LgpdError) -> Response {
    let status = lgpd_error_to_status(err);
    if status.is_server_error() {
        tracing::error!(error = %err, "lgpd operation failed");
        return error_response(status, "Internal server error");
    }
    error_response(status, &err.to_string())
}

/// `GET /api/lgpd/my-data` — export the caller's personal data.
pub async fn my_data(State(state): State<AppState>, auth: AuthUser) -> Response {
    match lgpd::export_personal_data(&state.pool, &auth.user).await {
        Ok(export) => Json(export).into_response(),
        Err(e) => lgpd_failure(&e),
    }
}

/// `POST /api/lgpd/requests` — file a request for the caller.
pub async fn create_request(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<NewLgpdRequest>, JsonRejection>,
) -> Response {
    if let Err(status) = auth.require_csrf() {
        return error_response(status, "Invalid CSRF token");
    }
    let Ok(Json(new)) = body else {
        return error_response(StatusCode::BAD_REQUEST, "kind must be access, correction or deletion");
    };

    match lgpd::create_request(&state.pool, auth.user.id, &new).await {
        Ok(request) => {
            tracing::info!(user_id = auth.user.id, request_id = request.id, kind = new.kind.as_str(), "lgpd request filed");
            (StatusCode::CREATED, Json(request)).into_response()
        }
        Err(e) => lgpd_failure(&e),
    }
}

/// `GET /api/lgpd/requests` — pending requests, reviewers only.
pub async fn list_requests(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(status) = auth.require_role(REVIEWER_ROLES) {
        return status.into_response();
    }
    match lgpd::list_pending(&state.pool).await {
        Ok(requests) => Json(requests).into_response(),
        Err(e) => lgpd_failure(&e),
    }
}

/// `POST /api/lgpd/requests/{id}/resolve` — close a pending request.
pub async fn resolve_request(State(state): State<AppState>, auth: AuthUser, Path(id): Path<i64>) -> Response {
    if let Err(status) = auth.require_role(REVIEWER_ROLES) {
        return status.into_response();
    }
    if let Err(status) = auth.require_csrf() {
        return error_response(status, "Invalid CSRF token");
    }

    match lgpd::resolve_request(&state.pool, id, auth.user.id).await {
        Ok(()) => {
            tracing::info!(request_id = id, resolved_by = auth.user.id, "lgpd request resolved");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => lgpd_failure(&e),
    }
}

#[cfg(test)]
#[path = "lgpd_test.rs"]
mod tests;
