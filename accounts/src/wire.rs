//! Auth endpoint payloads and the user record.

use serde::{Deserialize, Serialize};

use crate::role::{Role, UnknownRole};

/// Identity record as seen by clients.
///
/// `role` keeps the raw wire string: a role the client does not know about
/// is carried through and routed to the login page rather than rejected at
/// parse time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<i64>,
}

impl User {
    /// Parse the wire role.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownRole`] if the role string names no known role.
    pub fn known_role(&self) -> Result<Role, UnknownRole> {
        self.role.parse()
    }
}

/// Session description returned by `GET /api/auth/session`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub user_id: i64,
    pub username: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<i64>,
}

impl From<SessionPayload> for User {
    fn from(session: SessionPayload) -> Self {
        Self {
            id: session.user_id,
            username: session.username,
            role: session.role,
            member_id: session.member_id,
            visitor_id: session.visitor_id,
        }
    }
}

impl From<User> for SessionPayload {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            role: user.role,
            member_id: user.member_id,
            visitor_id: user.visitor_id,
        }
    }
}

/// Envelope of `GET /api/auth/session`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: SessionPayload,
}

/// Body of `POST /api/auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful response of `POST /api/auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub session_id: String,
}

/// Body of `POST /api/auth/logout`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub session_id: String,
}

/// Response of `GET /api/auth/csrf-token`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}

/// Error payload returned with non-2xx responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

#[cfg(test)]
#[path = "wire_test.rs"]
mod tests;
