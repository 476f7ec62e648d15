//! Resume metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::auth::UserId;

/// Listing entry for a stored resume. The file itself lives in object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeInfo {
    pub id: u64,
    pub owner: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Body of a resume creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewResume {
    pub title: String,
}
