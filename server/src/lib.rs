//! Backend for the church administration app.
//!
//! ARCHITECTURE
//! ============
//! - `routes`: Axum router, auth extractor and handlers.
//! - `services`: sessions, credentials, and the LGPD portal over Postgres.
//! - `seed`: demo data loader behind the `seed` binary.
//! - `config`, `db`, `state`: startup plumbing shared by both binaries.

pub mod config;
pub mod db;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
