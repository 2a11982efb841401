//! Auth routes: login, session lookup, CSRF token issue, logout.

use accounts::{
    CSRF_HEADER, CsrfTokenResponse, ErrorBody, LoginRequest, LogoutRequest, Role, SESSION_HEADER, SessionPayload,
    SessionResponse, User,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use crate::services::auth::{self as auth_svc, LoginError};
use crate::services::session::{self, LogoutOutcome};
use crate::state::AppState;

/// Message returned for any failed credential check.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Trimmed, non-empty header value.
pub(crate) fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the `x-session-id` header.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: User,
    pub session_id: String,
    /// CSRF token bound to the session, if one was issued.
    pub csrf_token: Option<String>,
    /// CSRF token the request presented in `x-csrf-token`.
    pub presented_csrf: Option<String>,
}

impl AuthUser {
    /// Require one of `allowed` roles. 403 otherwise, including for roles
    /// this server does not recognize.
    pub fn require_role(&self, allowed: &[Role]) -> Result<Role, StatusCode> {
        match self.user.known_role() {
            Ok(role) if allowed.contains(&role) => Ok(role),
            _ => Err(StatusCode::FORBIDDEN),
        }
    }

    /// Require a presented CSRF token matching the session's. A session
    /// without a bound token cannot make CSRF-protected requests.
    pub fn require_csrf(&self) -> Result<(), StatusCode> {
        let bound = self.csrf_token.as_deref().ok_or(StatusCode::FORBIDDEN)?;
        if session::csrf_matches(bound, self.presented_csrf.as_deref()) {
            Ok(())
        } else {
            Err(StatusCode::FORBIDDEN)
        }
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(session_id) = header_value(&parts.headers, SESSION_HEADER) else {
            return Err(StatusCode::UNAUTHORIZED);
        };

        let app_state = AppState::from_ref(state);
        let record = session::validate_session(&app_state.pool, session_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "session lookup failed");
                StatusCode::INTERNAL_SERVER_ERROR
            })?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self {
            user: record.user,
            session_id: session_id.to_owned(),
            csrf_token: record.csrf_token,
            presented_csrf: header_value(&parts.headers, CSRF_HEADER).map(str::to_owned),
        })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

pub fn login_error_to_status(err: &LoginError) -> StatusCode {
    match err {
        LoginError::MissingFields => StatusCode::BAD_REQUEST,
        LoginError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        LoginError::Password(_) | LoginError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn login_error_message(err: &LoginError) -> &'static str {
    match err {
        LoginError::MissingFields => "Username and password are required",
        LoginError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE,
        LoginError::Password(_) | LoginError::Db(_) => "Internal server error",
    }
}

/// `POST /api/auth/login` — check credentials and open a session.
pub async fn login(State(state): State<AppState>, body: Result<Json<LoginRequest>, JsonRejection>) -> Response {
    let Ok(Json(request)) = body else {
        return error_response(StatusCode::BAD_REQUEST, "Username and password are required");
    };

    match auth_svc::login(&state.pool, &request, state.session_ttl_hours).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            let status = login_error_to_status(&e);
            if status.is_server_error() {
                tracing::error!(error = %e, "login failed");
            } else {
                tracing::debug!(error = %e, "login rejected");
            }
            error_response(status, login_error_message(&e))
        }
    }
}

/// `GET /api/auth/session` — describe the current session.
pub async fn session(auth: AuthUser) -> Json<SessionResponse> {
    Json(SessionResponse { session: SessionPayload::from(auth.user) })
}

/// `GET /api/auth/csrf-token` — bind a fresh CSRF token to the session.
pub async fn csrf_token(State(state): State<AppState>, auth: AuthUser) -> Result<Json<CsrfTokenResponse>, StatusCode> {
    let token = session::issue_csrf_token(&state.pool, &auth.session_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "csrf token issue failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(CsrfTokenResponse { csrf_token: token }))
}

/// `POST /api/auth/logout` — delete the session named in the body.
///
/// Unknown sessions succeed. Once a CSRF token has been issued for the
/// session, the request must carry it.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap, Json(request): Json<LogoutRequest>) -> Response {
    let session_id = request.session_id.trim();
    if session_id.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    let presented = header_value(&headers, CSRF_HEADER);
    match session::logout_session(&state.pool, session_id, presented).await {
        Ok(LogoutOutcome::Deleted | LogoutOutcome::Unknown) => StatusCode::NO_CONTENT.into_response(),
        Ok(LogoutOutcome::CsrfMismatch) => error_response(StatusCode::FORBIDDEN, "Invalid CSRF token"),
        Err(e) => {
            tracing::error!(error = %e, "logout failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
