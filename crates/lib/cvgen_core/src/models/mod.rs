//! Domain models.

pub mod auth;
pub mod resume;
pub mod user;
