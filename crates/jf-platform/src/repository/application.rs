//! Application Repository
//!
//! The unique index on (userId, jobId) is the backstop for the
//! one-application-per-user invariant under concurrent submits.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use crate::domain::Application;
use crate::error::{BoardError, Result};

/// Application persistence seam used by the lifecycle service.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, application: &Application) -> Result<()>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Application>>;
    async fn find_by_user_and_job(&self, user_id: &str, job_id: &str) -> Result<Option<Application>>;
    async fn find_open_by_job(&self, job_id: &str) -> Result<Vec<Application>>;
    async fn update(&self, application: &Application) -> Result<()>;
}

pub struct ApplicationRepository {
    collection: Collection<Application>,
}

impl ApplicationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("applications"),
        }
    }

    pub async fn insert(&self, application: &Application) -> Result<()> {
        self.collection
            .insert_one(application)
            .await
            .map_err(|e| BoardError::from_insert(e, "Application", "jobId", &application.job_id))?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Application>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_user_and_job(&self, user_id: &str, job_id: &str) -> Result<Option<Application>> {
        Ok(self
            .collection
            .find_one(doc! { "userId": user_id, "jobId": job_id })
            .await?)
    }

    pub async fn find_by_job(&self, job_id: &str, skip: u64, limit: i64) -> Result<Vec<Application>> {
        let cursor = self
            .collection
            .find(doc! { "jobId": job_id })
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Applications for a job still awaiting a decision.
    pub async fn find_open_by_job(&self, job_id: &str) -> Result<Vec<Application>> {
        let cursor = self
            .collection
            .find(doc! {
                "jobId": job_id,
                "status": { "$in": ["PENDING", "REVIEWED", "SHORTLISTED"] },
            })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_user(&self, user_id: &str, skip: u64, limit: i64) -> Result<Vec<Application>> {
        let cursor = self
            .collection
            .find(doc! { "userId": user_id })
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_by_job(&self, job_id: &str) -> Result<u64> {
        Ok(self.collection.count_documents(doc! { "jobId": job_id }).await?)
    }

    pub async fn count_by_user(&self, user_id: &str) -> Result<u64> {
        Ok(self.collection.count_documents(doc! { "userId": user_id }).await?)
    }

    /// Whether the user holds an accepted application for the given job.
    pub async fn accepted_exists(&self, user_id: &str, job_id: &str) -> Result<bool> {
        let count = self
            .collection
            .count_documents(doc! { "userId": user_id, "jobId": job_id, "status": "ACCEPTED" })
            .await?;
        Ok(count > 0)
    }

    pub async fn update(&self, application: &Application) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &application.id }, application)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ApplicationStore for ApplicationRepository {
    async fn insert(&self, application: &Application) -> Result<()> {
        ApplicationRepository::insert(self, application).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Application>> {
        ApplicationRepository::find_by_id(self, id).await
    }

    async fn find_by_user_and_job(&self, user_id: &str, job_id: &str) -> Result<Option<Application>> {
        ApplicationRepository::find_by_user_and_job(self, user_id, job_id).await
    }

    async fn find_open_by_job(&self, job_id: &str) -> Result<Vec<Application>> {
        ApplicationRepository::find_open_by_job(self, job_id).await
    }

    async fn update(&self, application: &Application) -> Result<()> {
        ApplicationRepository::update(self, application).await
    }
}
