//! Client-side state holders.

pub mod auth;
