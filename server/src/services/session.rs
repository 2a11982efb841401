//! Session and CSRF token management.
//!
//! ARCHITECTURE
//! ============
//! A session is an opaque 64-hex identifier mapped to a user row, with an
//! absolute expiry. Clients send it in `x-session-id`. Each session may carry
//! one CSRF token, issued on demand and rotated on every issue; mutating
//! requests present it in `x-csrf-token`.
//!
//! TRADE-OFFS
//! ==========
//! Logout enforces CSRF only once a token has been issued for the session, so
//! a client that never fetched one can still sign out. Unknown or already
//! deleted sessions log out successfully; logout is idempotent.

use std::fmt::Write;

use accounts::User;
use rand::Rng;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Compare a presented CSRF token against the one bound to a session without
/// short-circuiting on the first differing byte.
#[must_use]
pub fn csrf_matches(bound: &str, presented: Option<&str>) -> bool {
    let Some(presented) = presented else {
        return false;
    };
    let (a, b) = (bound.as_bytes(), presented.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Session row joined with its user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user: User,
    /// CSRF token currently bound to the session, if one was issued.
    pub csrf_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The session existed and was deleted.
    Deleted,
    /// No such session; nothing to do.
    Unknown,
    /// A CSRF token is bound to the session and the request did not carry it.
    CsrfMismatch,
}

pub(crate) fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("user_id"),
        username: row.get("username"),
        role: row.get("role"),
        member_id: row.get("member_id"),
        visitor_id: row.get("visitor_id"),
    }
}

/// Create a session for the given user, returning its identifier.
pub async fn create_session(pool: &PgPool, user_id: i64, ttl_hours: i32) -> Result<String, sqlx::Error> {
    let session_id = generate_token();
    sqlx::query(
        "INSERT INTO sessions (id, user_id, expires_at)
         VALUES ($1, $2, now() + make_interval(hours => $3))",
    )
    .bind(&session_id)
    .bind(user_id)
    .bind(ttl_hours)
    .execute(pool)
    .await?;
    Ok(session_id)
}

/// Validate a session identifier and return the associated user.
///
/// Expired sessions validate as absent.
pub async fn validate_session(pool: &PgPool, session_id: &str) -> Result<Option<SessionRecord>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT
              u.id AS user_id,
              u.username,
              u.role,
              u.member_id,
              u.visitor_id,
              s.csrf_token
          FROM sessions s
          JOIN users u ON u.id = s.user_id
          WHERE s.id = $1 AND s.expires_at > now()",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| SessionRecord { user: user_from_row(&r), csrf_token: r.get("csrf_token") }))
}

/// Bind a fresh CSRF token to a live session, replacing any previous one.
///
/// Returns `None` when the session does not exist or has expired.
pub async fn issue_csrf_token(pool: &PgPool, session_id: &str) -> Result<Option<String>, sqlx::Error> {
    let token = generate_token();
    let updated = sqlx::query("UPDATE sessions SET csrf_token = $2 WHERE id = $1 AND expires_at > now()")
        .bind(session_id)
        .bind(&token)
        .execute(pool)
        .await?;
    Ok((updated.rows_affected() > 0).then_some(token))
}

/// Delete a session by identifier. Returns whether a row was removed.
pub async fn delete_session(pool: &PgPool, session_id: &str) -> Result<bool, sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(session_id)
        .execute(pool)
        .await?;
    Ok(deleted.rows_affected() > 0)
}

/// Logout with CSRF enforcement.
pub async fn logout_session(
    pool: &PgPool,
    session_id: &str,
    presented_csrf: Option<&str>,
) -> Result<LogoutOutcome, sqlx::Error> {
    let row = sqlx::query("SELECT csrf_token FROM sessions WHERE id = $1")
        .bind(session_id)
        .fetch_optional(pool)
        .await?;
    let Some(row) = row else {
        return Ok(LogoutOutcome::Unknown);
    };

    let bound: Option<String> = row.get("csrf_token");
    if let Some(bound) = bound.as_deref() {
        if !csrf_matches(bound, presented_csrf) {
            return Ok(LogoutOutcome::CsrfMismatch);
        }
    }

    if delete_session(pool, session_id).await? {
        Ok(LogoutOutcome::Deleted)
    } else {
        Ok(LogoutOutcome::Unknown)
    }
}

/// Remove every expired session. Returns the number of rows deleted.
pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
        .execute(pool)
        .await?;
    Ok(deleted.rows_affected())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
