//! Username/password login.
//!
//! ERROR HANDLING
//! ==============
//! Unknown usernames and wrong passwords both surface as
//! [`LoginError::InvalidCredentials`] so responses do not reveal which
//! usernames exist.

use accounts::{LoginRequest, LoginResponse, User};
use sqlx::{PgPool, Row};
use tracing::info;

use super::password::{PasswordError, verify_password};
use super::session;

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("username and password are required")]
    MissingFields,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Reject blank credentials before touching the database.
pub fn validate_credentials(request: &LoginRequest) -> Result<(), LoginError> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(LoginError::MissingFields);
    }
    Ok(())
}

/// Look up a user by username and check the password.
pub async fn authenticate(pool: &PgPool, username: &str, password: &str) -> Result<User, LoginError> {
    let row = sqlx::query(
        "SELECT id AS user_id, username, role, member_id, visitor_id, password_hash
         FROM users WHERE username = $1",
    )
    .bind(username.trim())
    .fetch_optional(pool)
    .await?
    .ok_or(LoginError::InvalidCredentials)?;

    let hash: String = row.get("password_hash");
    if !verify_password(password, &hash)? {
        return Err(LoginError::InvalidCredentials);
    }
    Ok(session::user_from_row(&row))
}

/// Validate, authenticate, and open a session.
pub async fn login(pool: &PgPool, request: &LoginRequest, ttl_hours: i32) -> Result<LoginResponse, LoginError> {
    validate_credentials(request)?;
    let user = authenticate(pool, &request.username, &request.password).await?;
    let session_id = session::create_session(pool, user.id, ttl_hours).await?;
    info!(user_id = user.id, role = %user.role, "session created");
    Ok(LoginResponse { user, session_id })
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
