//! HTTP request handlers.

pub mod auth;
pub mod resumes;
pub mod users;
