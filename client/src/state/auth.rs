//! Auth session for the current client user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthSession` is the single source of truth for who is signed in. The
//! host builds one at startup with its collaborators (backend API, CSRF
//! token source, session store, navigator) and hands it to whatever needs
//! auth state; route guards read [`AuthState`] from it.
//!
//! DESIGN
//! ======
//! Every state change is written through to the store in the same step, so
//! a restart reads back exactly what was in memory. Mutating operations take
//! `&mut self`; one session cannot run `login` and `logout` at once, and a
//! dropped operation future leaves no late update behind.
//!
//! Logout is split into a fallible remote phase and an infallible local
//! phase. Whatever the backend says, the local phase runs.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use accounts::{LOGIN_ROUTE, LoginRequest, SESSION_ID_KEY, USER_KEY, User};
use tracing::{debug, info, warn};

use crate::net::api::{ApiError, AuthApi};
use crate::net::csrf::CsrfTokens;
use crate::util::guard::{Outlet, ProtectedRoute};
use crate::util::navigate::Navigator;
use crate::util::storage::{SessionStore, StorageError, load_session_id, save_user};

/// Shown when a login rejection carries no message of its own.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
}

impl AuthState {
    /// Initial state before the first session check settles.
    #[must_use]
    pub fn loading() -> Self {
        Self { user: None, loading: true }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self { user: None, loading: false }
    }

    #[must_use]
    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user), loading: false }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::loading()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The backend refused the credentials. The message is user-displayable.
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("could not reach the server: {0}")]
    Unavailable(ApiError),

    #[error("could not save the session: {0}")]
    Storage(#[from] StorageError),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { message, .. } => {
                Self::InvalidCredentials(message.unwrap_or_else(|| INVALID_CREDENTIALS_MESSAGE.to_owned()))
            }
            other => Self::Unavailable(other),
        }
    }
}

/// Outcome of the best-effort remote phase of logout.
#[derive(Debug)]
pub enum RemoteInvalidation {
    /// The backend accepted the logout.
    Acknowledged,
    /// No session identifier was stored; nothing to invalidate.
    Skipped,
    /// The backend rejected the request or could not be reached.
    Failed(ApiError),
}

// =============================================================================
// AUTH SESSION
// =============================================================================

pub struct AuthSession {
    api: Arc<dyn AuthApi>,
    csrf: Arc<dyn CsrfTokens>,
    store: Box<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    state: AuthState,
}

impl AuthSession {
    /// Start a session in the loading state. Call [`Self::check_session`]
    /// once the host is ready.
    pub fn new(
        api: Arc<dyn AuthApi>,
        csrf: Arc<dyn CsrfTokens>,
        store: Box<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self { api, csrf, store, navigator, state: AuthState::loading() }
    }

    #[must_use]
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    /// Stored session identifier, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<String> {
        load_session_id(self.store.as_ref())
    }

    /// Evaluate a route guard against the current state, redirecting through
    /// this session's navigator.
    pub fn guard(&self, route: &mut ProtectedRoute) -> Outlet {
        route.render(&self.state, self.navigator.as_ref())
    }

    /// Verify the stored session with the backend.
    ///
    /// Without a stored identifier this settles as signed out, drops any
    /// orphaned cached user, and makes no request. Any failure, whether a rejection or a transport error, clears
    /// the stored session and settles as signed out; it never settles as
    /// signed in.
    pub async fn check_session(&mut self) {
        let Some(session_id) = self.session_id() else {
            if let Err(e) = self.store.remove(USER_KEY) {
                warn!(error = %e, "failed to clear cached user profile");
            }
            self.state = AuthState::signed_out();
            return;
        };

        let verified = self.api.verify_session(&session_id).await;
        match verified {
            Ok(payload) => {
                let user = User::from(payload);
                if let Err(e) = save_user(self.store.as_mut(), &user) {
                    warn!(error = %e, "failed to cache user profile");
                }
                self.state = AuthState::signed_in(user);
                if self.csrf.current().is_none() {
                    self.refresh_csrf(&session_id).await;
                }
            }
            Err(ApiError::Rejected { status, .. }) => {
                debug!(status, "stored session rejected");
                self.clear_stored_session();
                self.state = AuthState::signed_out();
            }
            Err(e) => {
                warn!(error = %e, "session check failed; treating session as invalid");
                self.clear_stored_session();
                self.state = AuthState::signed_out();
            }
        }
    }

    /// Sign in with username and password.
    ///
    /// On success the session identifier and user are stored, state becomes
    /// signed in, and a CSRF token is fetched for the new session. Any token
    /// held for a previous session is dropped first, so a failed fetch
    /// leaves no token rather than a stale one; the failure is logged and
    /// does not fail the login.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the backend rejects
    /// the login, [`AuthError::Unavailable`] when it cannot be reached, and
    /// [`AuthError::Storage`] when the session cannot be saved. On any error
    /// the previous state and stored keys are left as they were.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<User, AuthError> {
        let credentials = LoginRequest { username: username.to_owned(), password: password.to_owned() };
        let response = self.api.login(&credentials).await?;

        self.persist(&response.session_id, &response.user)?;
        self.state = AuthState::signed_in(response.user.clone());
        info!(username = %response.user.username, role = %response.user.role, "signed in");

        self.csrf.clear();
        self.refresh_csrf(&response.session_id).await;
        Ok(response.user)
    }

    /// Sign out: notify the backend, then tear down local state.
    ///
    /// The local phase always runs, so after this returns no session
    /// identifier or user is stored and state is signed out.
    pub async fn logout(&mut self) -> RemoteInvalidation {
        let outcome = self.invalidate_remote().await;
        self.teardown_local();
        outcome
    }

    /// Best-effort backend logout for the stored session.
    pub async fn invalidate_remote(&self) -> RemoteInvalidation {
        let Some(session_id) = self.session_id() else {
            return RemoteInvalidation::Skipped;
        };
        match self.api.logout(&session_id).await {
            Ok(()) => RemoteInvalidation::Acknowledged,
            Err(e) => {
                warn!(error = %e, "logout request failed; clearing local session anyway");
                RemoteInvalidation::Failed(e)
            }
        }
    }

    /// Drop the CSRF token and stored session, settle as signed out, and
    /// navigate to the login route.
    pub fn teardown_local(&mut self) {
        self.clear_stored_session();
        self.state = AuthState::signed_out();
        self.navigator.navigate(LOGIN_ROUTE);
    }

    async fn refresh_csrf(&self, session_id: &str) {
        if let Err(e) = self.csrf.refresh(session_id).await {
            warn!(error = %e, "csrf token refresh failed");
        }
    }

    fn clear_stored_session(&mut self) {
        self.csrf.clear();
        for key in [SESSION_ID_KEY, USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(error = %e, key, "failed to clear stored session key");
            }
        }
    }

    /// Write both session keys, restoring the previous values if the second
    /// write fails.
    fn persist(&mut self, session_id: &str, user: &User) -> Result<(), StorageError> {
        let previous_id = self.store.get(SESSION_ID_KEY);
        let previous_user = self.store.get(USER_KEY);

        let written = self
            .store
            .set(SESSION_ID_KEY, session_id)
            .and_then(|()| save_user(self.store.as_mut(), user));
        if let Err(e) = written {
            self.restore(SESSION_ID_KEY, previous_id.as_deref());
            self.restore(USER_KEY, previous_user.as_deref());
            return Err(e);
        }
        Ok(())
    }

    fn restore(&mut self, key: &str, previous: Option<&str>) {
        let restored = match previous {
            Some(value) => self.store.set(key, value),
            None => self.store.remove(key),
        };
        if let Err(e) = restored {
            warn!(error = %e, key, "failed to restore stored session key");
        }
    }
}
