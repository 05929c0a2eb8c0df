//! Saved Job Entity
//!
//! Bookmark of a job by a job seeker. Unique per (user, job).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJob {
    #[serde(rename = "_id")]
    pub id: String,

    pub user_id: String,

    pub job_id: String,

    pub created_at: DateTime<Utc>,
}

impl SavedJob {
    pub fn new(user_id: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            id: super::new_id(),
            user_id: user_id.into(),
            job_id: job_id.into(),
            created_at: Utc::now(),
        }
    }
}
