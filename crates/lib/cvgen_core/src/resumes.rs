//! Resume metadata index, scoped per owner.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::auth::UserId;
use crate::models::resume::ResumeInfo;
use crate::users::RepositoryError;

/// Per-user resume index.
#[async_trait]
pub trait ResumeIndex: Send + Sync {
    /// Resumes owned by `owner`, oldest first.
    async fn list_for_user(&self, owner: UserId) -> Result<Vec<ResumeInfo>, RepositoryError>;

    async fn add(&self, owner: UserId, title: &str) -> Result<ResumeInfo, RepositoryError>;

    /// Resume `id` if `owner` owns it. Another owner's id reads as absent.
    async fn get(&self, owner: UserId, id: u64) -> Result<Option<ResumeInfo>, RepositoryError>;

    /// Remove resume `id` if `owner` owns it; `false` when nothing was removed.
    async fn delete(&self, owner: UserId, id: u64) -> Result<bool, RepositoryError>;

    /// Readiness check used at startup.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Inner {
    by_owner: HashMap<UserId, Vec<ResumeInfo>>,
    last_id: u64,
}

#[derive(Debug, Default)]
pub struct MemoryResumeIndex {
    inner: RwLock<Inner>,
}

impl MemoryResumeIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeIndex for MemoryResumeIndex {
    async fn list_for_user(&self, owner: UserId) -> Result<Vec<ResumeInfo>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .await
            .by_owner
            .get(&owner)
            .cloned()
            .unwrap_or_default())
    }

    async fn add(&self, owner: UserId, title: &str) -> Result<ResumeInfo, RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let info = ResumeInfo {
            id: inner.last_id,
            owner,
            title: title.to_string(),
            created_at: Utc::now(),
        };
        inner.by_owner.entry(owner).or_default().push(info.clone());
        Ok(info)
    }

    async fn get(&self, owner: UserId, id: u64) -> Result<Option<ResumeInfo>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .await
            .by_owner
            .get(&owner)
            .and_then(|resumes| resumes.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn delete(&self, owner: UserId, id: u64) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        let Some(resumes) = inner.by_owner.get_mut(&owner) else {
            return Ok(false);
        };
        let before = resumes.len();
        resumes.retain(|r| r.id != id);
        Ok(resumes.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listing_is_scoped_to_owner() {
        let index = MemoryResumeIndex::new();
        let alice = UserId::new(1).unwrap();
        let bob = UserId::new(2).unwrap();

        index.add(alice, "Backend engineer").await.unwrap();
        index.add(alice, "Team lead").await.unwrap();
        index.add(bob, "Designer").await.unwrap();

        let titles: Vec<_> = index
            .list_for_user(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, ["Backend engineer", "Team lead"]);
        assert!(index.list_for_user(UserId::new(3).unwrap()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_and_delete_ignore_other_owners() {
        let index = MemoryResumeIndex::new();
        let alice = UserId::new(1).unwrap();
        let bob = UserId::new(2).unwrap();
        let cv = index.add(alice, "Backend engineer").await.unwrap();

        assert_eq!(index.get(alice, cv.id).await.unwrap(), Some(cv.clone()));
        assert!(index.get(bob, cv.id).await.unwrap().is_none());
        assert!(!index.delete(bob, cv.id).await.unwrap());
        assert!(index.get(alice, cv.id).await.unwrap().is_some());

        assert!(index.delete(alice, cv.id).await.unwrap());
        assert!(!index.delete(alice, cv.id).await.unwrap());
        assert!(index.list_for_user(alice).await.unwrap().is_empty());
    }
}
