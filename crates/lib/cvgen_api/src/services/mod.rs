//! Business logic services.

pub mod auth;
pub mod cookies;
pub mod remote_auth;
