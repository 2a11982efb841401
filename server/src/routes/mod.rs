//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the auth endpoints the client core talks to, the LGPD portal API,
//! and a health probe under a single Axum router. Clients authenticate with
//! the `x-session-id` header, so CORS allows any origin without credentials.

pub mod auth;
pub mod lgpd;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/session", get(auth::session))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/csrf-token", get(auth::csrf_token))
        .route("/api/lgpd/my-data", get(lgpd::my_data))
        .route("/api/lgpd/requests", get(lgpd::list_requests).post(lgpd::create_request))
        .route("/api/lgpd/requests/{id}/resolve", post(lgpd::resolve_request))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
