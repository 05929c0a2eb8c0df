//! Review Entity
//!
//! One review per (user, company), enforced by a unique index. The rating
//! range is validated here; the accepted-application requirement for
//! job-cited reviews lives in the rating service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,

    pub company_id: String,

    /// Reviewer account
    pub user_id: String,

    /// Job the reviewer was hired for, when cited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    /// 1 to 5 inclusive
    pub rating: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        company_id: impl Into<String>,
        user_id: impl Into<String>,
        rating: i32,
    ) -> Result<Self> {
        validate_rating(rating)?;
        let now = Utc::now();
        Ok(Self {
            id: super::new_id(),
            company_id: company_id.into(),
            user_id: user_id.into(),
            job_id: None,
            rating,
            title: None,
            comment: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_job(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn set_rating(&mut self, rating: i32) -> Result<()> {
        validate_rating(rating)?;
        self.rating = rating;
        self.updated_at = Utc::now();
        Ok(())
    }
}

pub fn validate_rating(rating: i32) -> Result<()> {
    if !(1..=5).contains(&rating) {
        return Err(BoardError::validation("rating must be between 1 and 5"));
    }
    Ok(())
}
