//! Shared account model for the church administration app.
//!
//! This crate owns the wire representation used by both `server` and
//! `client`: roles, the user record, auth endpoint payloads, LGPD portal
//! payloads, and the static role-to-route table consulted by route guards.

pub mod lgpd;
pub mod role;
pub mod routes;
pub mod wire;

pub use role::{Role, UnknownRole};
pub use routes::{LOGIN_ROUTE, RoleRedirect, RoleRoutes, RouteTableError};
pub use wire::{
    CsrfTokenResponse, ErrorBody, LoginRequest, LoginResponse, LogoutRequest, SessionPayload, SessionResponse, User,
};

/// Request header carrying the opaque session identifier.
pub const SESSION_HEADER: &str = "x-session-id";

/// Request header carrying the anti-forgery token on mutating requests.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Client storage key holding the session identifier.
pub const SESSION_ID_KEY: &str = "sessionId";

/// Client storage key holding the serialized [`User`].
pub const USER_KEY: &str = "user";
