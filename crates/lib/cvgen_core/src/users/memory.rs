//! In-memory user repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RepositoryError, RoleProvider, UserRepository};
use crate::models::auth::UserId;
use crate::models::user::{User, UserProfile};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    by_login: HashMap<String, UserId>,
    profiles: HashMap<UserId, UserProfile>,
    last_id: u64,
}

/// Process-local user store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    inner: RwLock<Inner>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create_user(
        &self,
        login: &str,
        password_hash: &str,
        roles: Vec<String>,
    ) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.by_login.contains_key(login) {
            return Err(RepositoryError::Conflict(format!(
                "login {login:?} already exists"
            )));
        }

        let next = inner.last_id + 1;
        let id = UserId::new(next)
            .ok_or_else(|| RepositoryError::Unavailable("user id space exhausted".into()))?;
        inner.last_id = next;

        let user = User {
            id,
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            roles,
        };
        inner.by_login.insert(user.login.clone(), id);
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_login
            .get(login)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn user_count(&self) -> Result<u64, RepositoryError> {
        Ok(self.inner.read().await.users.len() as u64)
    }

    async fn create_profile(
        &self,
        id: UserId,
        profile: UserProfile,
    ) -> Result<UserProfile, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.profiles.contains_key(&id) {
            return Err(RepositoryError::Conflict(format!(
                "profile for user {id} already exists"
            )));
        }
        inner.profiles.insert(id, profile.clone());
        Ok(profile)
    }

    async fn update_profile(
        &self,
        id: UserId,
        profile: UserProfile,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        let mut inner = self.inner.write().await;
        Ok(inner.profiles.get_mut(&id).map(|stored| {
            *stored = profile.clone();
            profile
        }))
    }

    async fn find_profile(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.inner.read().await.profiles.get(&id).cloned())
    }
}

#[async_trait]
impl RoleProvider for MemoryUserRepository {
    async fn roles_for(&self, id: UserId) -> Vec<String> {
        self.inner
            .read()
            .await
            .users
            .get(&id)
            .map(|u| u.roles.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_sequential_and_nonzero() {
        let repo = MemoryUserRepository::new();
        let a = repo.create_user("alice_", "h", vec![]).await.unwrap();
        let b = repo.create_user("bobbyy", "h", vec![]).await.unwrap();
        assert_eq!(a.id.get(), 1);
        assert_eq!(b.id.get(), 2);
        assert_eq!(repo.user_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn duplicate_login_conflicts() {
        let repo = MemoryUserRepository::new();
        repo.create_user("alice_", "h", vec![]).await.unwrap();
        let err = repo.create_user("alice_", "h2", vec![]).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.user_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn lookups_and_roles() {
        let repo = MemoryUserRepository::new();
        let user = repo
            .create_user("carol_", "h", vec!["admin".into()])
            .await
            .unwrap();

        let found = repo.find_by_login("carol_").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(repo.find_by_login("nobody").await.unwrap().is_none());
        assert_eq!(repo.find_by_id(user.id).await.unwrap().unwrap().login, "carol_");

        assert_eq!(repo.roles_for(user.id).await, vec!["admin".to_string()]);
        assert!(repo.roles_for(UserId::new(99).unwrap()).await.is_empty());
    }

    #[tokio::test]
    async fn profile_is_created_once_then_replaced() {
        let repo = MemoryUserRepository::new();
        let id = repo.create_user("dana__", "h", vec![]).await.unwrap().id;
        let first = UserProfile {
            name: Some("Dana".into()),
            ..Default::default()
        };

        assert!(repo.find_profile(id).await.unwrap().is_none());
        assert!(
            repo.update_profile(id, first.clone())
                .await
                .unwrap()
                .is_none()
        );
        repo.create_profile(id, first.clone()).await.unwrap();
        assert!(matches!(
            repo.create_profile(id, UserProfile::default()).await,
            Err(RepositoryError::Conflict(_))
        ));

        let second = UserProfile {
            location: Some("Berlin".into()),
            ..Default::default()
        };
        assert_eq!(
            repo.update_profile(id, second.clone()).await.unwrap(),
            Some(second.clone())
        );
        assert_eq!(repo.find_profile(id).await.unwrap(), Some(second));
    }
}
