// Public fallible APIs in this crate share one concrete error contract (`AuditError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod advisor;
pub mod client;
pub mod config;
pub mod confidence;
pub mod delivery;
pub mod error;
pub mod models;
pub mod questions;
pub mod rate_limit;
pub mod sanitize;
pub mod state;
pub mod transition;
pub mod webhook;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::AuditService;
pub use config::AppConfig;
pub use error::{AuditError, ErrorPayload, Result};
