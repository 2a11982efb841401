//! REST client for the auth and LGPD endpoints.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns `Result<_, ApiError>`. A non-2xx status becomes
//! [`ApiError::Rejected`] carrying the server's `{ error }` message when the
//! body has one; the auth session decides what a rejection means.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use accounts::lgpd::PersonalDataExport;
use accounts::{
    CSRF_HEADER, ErrorBody, LoginRequest, LoginResponse, LogoutRequest, SESSION_HEADER, SessionPayload,
    SessionResponse,
};
use serde::de::DeserializeOwned;

use super::csrf::CsrfTokens;
use super::endpoint;

pub const SESSION_PATH: &str = "/api/auth/session";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const CSRF_TOKEN_PATH: &str = "/api/auth/csrf-token";
pub const PERSONAL_DATA_PATH: &str = "/api/lgpd/my-data";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("request rejected: status {status}")]
    Rejected { status: u16, message: Option<String> },

    /// A success response body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Decode(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Backend auth operations the auth session depends on.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /api/auth/session` for the given session identifier.
    async fn verify_session(&self, session_id: &str) -> Result<SessionPayload, ApiError>;

    /// `POST /api/auth/login`.
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// `POST /api/auth/logout`. The response body is not inspected.
    async fn logout(&self, session_id: &str) -> Result<(), ApiError>;
}

// =============================================================================
// HTTP IMPLEMENTATION
// =============================================================================

/// reqwest-backed [`AuthApi`].
///
/// Mutating requests carry the CSRF token currently held by the shared
/// token source.
pub struct HttpAuthApi {
    http: reqwest::Client,
    base_url: String,
    csrf: Arc<dyn CsrfTokens>,
}

impl HttpAuthApi {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, csrf: Arc<dyn CsrfTokens>) -> Self {
        Self { http, base_url: base_url.into(), csrf }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.post(endpoint(&self.base_url, path));
        match self.csrf.current() {
            Some(token) => builder.header(CSRF_HEADER, token),
            None => builder,
        }
    }

    /// `GET /api/lgpd/my-data` — personal data export for the session's user.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// unexpected body.
    pub async fn personal_data(&self, session_id: &str) -> Result<PersonalDataExport, ApiError> {
        let resp = self
            .http
            .get(endpoint(&self.base_url, PERSONAL_DATA_PATH))
            .header(SESSION_HEADER, session_id)
            .send()
            .await
            .map_err(transport)?;
        decode_success(resp).await
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthApi {
    async fn verify_session(&self, session_id: &str) -> Result<SessionPayload, ApiError> {
        let resp = self
            .http
            .get(endpoint(&self.base_url, SESSION_PATH))
            .header(SESSION_HEADER, session_id)
            .send()
            .await
            .map_err(transport)?;
        let body: SessionResponse = decode_success(resp).await?;
        Ok(body.session)
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let resp = self
            .post(LOGIN_PATH)
            .json(credentials)
            .send()
            .await
            .map_err(transport)?;
        decode_success(resp).await
    }

    async fn logout(&self, session_id: &str) -> Result<(), ApiError> {
        let body = LogoutRequest { session_id: session_id.to_owned() };
        let resp = self
            .post(LOGOUT_PATH)
            .header(SESSION_HEADER, session_id)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }
        Ok(())
    }
}

// =============================================================================
// RESPONSE HELPERS
// =============================================================================

pub(crate) fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

/// Extract the `{ error }` message from a rejection body, if any.
pub(crate) fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error.trim().to_owned())
        .filter(|m| !m.is_empty())
}

pub(crate) async fn rejection(resp: reqwest::Response) -> ApiError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    ApiError::Rejected { status, message: parse_error_message(&body) }
}

pub(crate) async fn decode_success<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    if !resp.status().is_success() {
        return Err(rejection(resp).await);
    }
    let body = resp.text().await.map_err(transport)?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}
