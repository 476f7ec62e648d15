//! Request middleware.

pub mod roles;
pub mod session;
