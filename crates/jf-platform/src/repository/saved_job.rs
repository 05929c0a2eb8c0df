//! Saved Job Repository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use crate::domain::SavedJob;
use crate::error::{BoardError, Result};

/// Bookmark persistence seam.
#[async_trait]
pub trait SavedJobStore: Send + Sync {
    async fn insert(&self, saved: &SavedJob) -> Result<()>;
    async fn find_by_user(&self, user_id: &str, skip: u64, limit: i64) -> Result<Vec<SavedJob>>;
    async fn count_by_user(&self, user_id: &str) -> Result<u64>;
    async fn delete_by_user_and_job(&self, user_id: &str, job_id: &str) -> Result<bool>;
}

pub struct SavedJobRepository {
    collection: Collection<SavedJob>,
}

impl SavedJobRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("saved_jobs"),
        }
    }

    pub async fn insert(&self, saved: &SavedJob) -> Result<()> {
        self.collection
            .insert_one(saved)
            .await
            .map_err(|e| BoardError::from_insert(e, "SavedJob", "jobId", &saved.job_id))?;
        Ok(())
    }

    pub async fn find_by_user(&self, user_id: &str, skip: u64, limit: i64) -> Result<Vec<SavedJob>> {
        let cursor = self
            .collection
            .find(doc! { "userId": user_id })
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_by_user(&self, user_id: &str) -> Result<u64> {
        Ok(self.collection.count_documents(doc! { "userId": user_id }).await?)
    }

    pub async fn delete_by_user_and_job(&self, user_id: &str, job_id: &str) -> Result<bool> {
        let result = self
            .collection
            .delete_one(doc! { "userId": user_id, "jobId": job_id })
            .await?;
        Ok(result.deleted_count > 0)
    }
}

#[async_trait]
impl SavedJobStore for SavedJobRepository {
    async fn insert(&self, saved: &SavedJob) -> Result<()> {
        SavedJobRepository::insert(self, saved).await
    }

    async fn find_by_user(&self, user_id: &str, skip: u64, limit: i64) -> Result<Vec<SavedJob>> {
        SavedJobRepository::find_by_user(self, user_id, skip, limit).await
    }

    async fn count_by_user(&self, user_id: &str) -> Result<u64> {
        SavedJobRepository::count_by_user(self, user_id).await
    }

    async fn delete_by_user_and_job(&self, user_id: &str, job_id: &str) -> Result<bool> {
        SavedJobRepository::delete_by_user_and_job(self, user_id, job_id).await
    }
}
