//! # cvgen_core
//!
//! Core domain logic shared by the resume generator services: token
//! issuance and verification, identities, and the repository interfaces the
//! HTTP layer consumes.

pub mod auth;
pub mod models;
pub mod resumes;
pub mod startup;
pub mod users;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
