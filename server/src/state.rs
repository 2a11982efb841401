//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the database pool and the session lifetime applied at login; all
//! session and LGPD data lives in Postgres, so there is no in-memory cache
//! to keep coherent across handlers.

use sqlx::PgPool;

/// Clone is required by Axum; `PgPool` is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Lifetime of newly created sessions.
    pub session_ttl_hours: i32,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, session_ttl_hours: i32) -> Self {
        Self { pool, session_ttl_hours }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
