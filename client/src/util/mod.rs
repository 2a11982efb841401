//! Utility helpers shared by the auth session and its hosts.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate storage and navigation concerns from auth logic
//! so each host (browser shell, CLI, tests) can plug in its own.

pub mod guard;
pub mod navigate;
pub mod storage;
