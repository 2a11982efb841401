//! Domain services used by the HTTP routes and the seed binary.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation and auth plumbing.

pub mod auth;
pub mod lgpd;
pub mod password;
pub mod session;
