//! Client core of the church administration app.
//!
//! ARCHITECTURE
//! ============
//! - `net`: reqwest clients for the auth endpoints and the CSRF token.
//! - `state`: the [`AuthSession`], single source of truth for who is signed in.
//! - `util`: session storage, navigation seam, and the role-gated route guard.
//!
//! Hosts build one [`AuthSession`] at startup (see [`connect`]) and pass it
//! to whatever needs auth state.

pub mod net;
pub mod state;
pub mod util;

use std::sync::Arc;

pub use net::api::{ApiError, AuthApi, HttpAuthApi};
pub use net::csrf::{CsrfTokenManager, CsrfTokens};
pub use state::auth::{AuthError, AuthSession, AuthState, RemoteInvalidation};
pub use util::guard::{GuardDecision, Outlet, ProtectedRoute};
pub use util::navigate::{HistoryNavigator, Navigator};
pub use util::storage::{FileStore, MemoryStore, SessionStore, StorageError};

/// Wire an [`AuthSession`] to the backend at `base_url`.
///
/// Returns the session and the HTTP API it uses, for callers that also need
/// the non-auth endpoints.
///
/// # Errors
///
/// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
pub fn connect(
    base_url: &str,
    store: Box<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
) -> Result<(AuthSession, Arc<HttpAuthApi>), ApiError> {
    let http = net::build_http_client()?;
    let csrf: Arc<dyn CsrfTokens> = Arc::new(CsrfTokenManager::new(http.clone(), base_url));
    let api = Arc::new(HttpAuthApi::new(http, base_url, csrf.clone()));
    let session = AuthSession::new(api.clone(), csrf, store, navigator);
    Ok((session, api))
}
