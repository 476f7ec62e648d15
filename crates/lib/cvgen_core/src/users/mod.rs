//! User storage and role lookup.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::UserId;
use crate::models::user::{User, UserProfile};

pub use memory::MemoryUserRepository;

/// Role granted to the first registered account.
pub const ADMIN_ROLE: &str = "admin";

/// Role granted to every other account.
pub const USER_ROLE: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Fails with `Conflict` when the login is taken.
    async fn create_user(
        &self,
        login: &str,
        password_hash: &str,
        roles: Vec<String>,
    ) -> Result<User, RepositoryError>;

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn user_count(&self) -> Result<u64, RepositoryError>;

    /// Store the first profile for `id`. Fails with `Conflict` when one exists.
    async fn create_profile(
        &self,
        id: UserId,
        profile: UserProfile,
    ) -> Result<UserProfile, RepositoryError>;

    /// Replace the profile for `id`. `None` when there is nothing to replace.
    async fn update_profile(
        &self,
        id: UserId,
        profile: UserProfile,
    ) -> Result<Option<UserProfile>, RepositoryError>;

    async fn find_profile(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError>;

    /// Readiness check used at startup.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Current roles for a user, consulted when a refresh re-mints an access token.
#[async_trait]
pub trait RoleProvider: Send + Sync {
    /// Roles for `id`; empty when the user is unknown.
    async fn roles_for(&self, id: UserId) -> Vec<String>;
}

/// Grants no roles to anyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoles;

#[async_trait]
impl RoleProvider for NoRoles {
    async fn roles_for(&self, _id: UserId) -> Vec<String> {
        Vec::new()
    }
}
