//! Anti-forgery token lifecycle.
//!
//! A token is fetched right after login, bound server-side to the session,
//! and sent as `x-csrf-token` on mutating requests. Logout clears it.

use std::sync::{PoisonError, RwLock};

use accounts::{CsrfTokenResponse, SESSION_HEADER};

use super::api::{ApiError, CSRF_TOKEN_PATH, decode_success, transport};
use super::endpoint;

/// Source of the current CSRF token.
#[async_trait::async_trait]
pub trait CsrfTokens: Send + Sync {
    /// Fetch a fresh token for the session and cache it.
    async fn refresh(&self, session_id: &str) -> Result<String, ApiError>;

    /// Drop the cached token.
    fn clear(&self);

    fn current(&self) -> Option<String>;
}

/// reqwest-backed [`CsrfTokens`] with an in-memory cache.
pub struct CsrfTokenManager {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl CsrfTokenManager {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into(), token: RwLock::new(None) }
    }
}

#[async_trait::async_trait]
impl CsrfTokens for CsrfTokenManager {
    async fn refresh(&self, session_id: &str) -> Result<String, ApiError> {
        let resp = self
            .http
            .get(endpoint(&self.base_url, CSRF_TOKEN_PATH))
            .header(SESSION_HEADER, session_id)
            .send()
            .await
            .map_err(transport)?;
        let body: CsrfTokenResponse = decode_success(resp).await?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(body.csrf_token.clone());
        Ok(body.csrf_token)
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn current(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
