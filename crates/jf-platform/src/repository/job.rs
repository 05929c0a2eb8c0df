//! Job Repository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{Collection, Database};

use crate::domain::{Job, JobStatus};
use crate::error::Result;

/// Job persistence seam used by the lifecycle services. The mongo-backed
/// `JobRepository` is the production implementation.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, job: &Job) -> Result<()>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Job>>;
    async fn find_published_with_deadline(&self) -> Result<Vec<Job>>;
    async fn update(&self, job: &Job) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<bool>;
    async fn increment_views(&self, id: &str) -> Result<()>;
    async fn increment_applications(&self, id: &str) -> Result<()>;
    async fn adjust_saves(&self, id: &str, delta: i64) -> Result<()>;
}

/// Browse filters for the public job listing.
#[derive(Debug, Default, Clone)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub category: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub company_id: Option<String>,
    pub posted_by: Option<String>,
    pub remote: Option<bool>,
    /// Full-text search over title/description/skills
    pub text: Option<String>,
}

impl JobFilter {
    fn to_document(&self) -> Document {
        let mut filter = doc! {};
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if let Some(ref category) = self.category {
            filter.insert("category", category);
        }
        if let Some(ref job_type) = self.job_type {
            filter.insert("jobType", job_type);
        }
        if let Some(ref level) = self.experience_level {
            filter.insert("experienceLevel", level);
        }
        if let Some(ref company_id) = self.company_id {
            filter.insert("companyId", company_id);
        }
        if let Some(ref posted_by) = self.posted_by {
            filter.insert("postedBy", posted_by);
        }
        if let Some(remote) = self.remote {
            filter.insert("remote", remote);
        }
        if let Some(ref text) = self.text {
            filter.insert("$text", doc! { "$search": text });
        }
        filter
    }
}

pub struct JobRepository {
    collection: Collection<Job>,
}

impl JobRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("jobs"),
        }
    }

    pub async fn insert(&self, job: &Job) -> Result<()> {
        self.collection.insert_one(job).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Job>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_filtered(&self, filter: &JobFilter, skip: u64, limit: i64) -> Result<Vec<Job>> {
        let cursor = self
            .collection
            .find(filter.to_document())
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_filtered(&self, filter: &JobFilter) -> Result<u64> {
        Ok(self.collection.count_documents(filter.to_document()).await?)
    }

    pub async fn find_published_with_deadline(&self) -> Result<Vec<Job>> {
        let cursor = self
            .collection
            .find(doc! {
                "status": JobStatus::Published.as_str(),
                "applicationDeadline": { "$ne": null },
            })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, job: &Job) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &job.id }, job)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    // Counter updates are atomic $inc operations so concurrent requests
    // never lose increments to read-modify-write races.

    pub async fn increment_views(&self, id: &str) -> Result<()> {
        self.collection
            .update_one(doc! { "_id": id }, doc! { "$inc": { "counters.views": 1 } })
            .await?;
        Ok(())
    }

    pub async fn increment_applications(&self, id: &str) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$inc": { "counters.applicationCount": 1 } },
            )
            .await?;
        Ok(())
    }

    pub async fn adjust_saves(&self, id: &str, delta: i64) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$inc": { "counters.saveCount": delta } },
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl JobStore for JobRepository {
    async fn insert(&self, job: &Job) -> Result<()> {
        JobRepository::insert(self, job).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Job>> {
        JobRepository::find_by_id(self, id).await
    }

    async fn find_published_with_deadline(&self) -> Result<Vec<Job>> {
        JobRepository::find_published_with_deadline(self).await
    }

    async fn update(&self, job: &Job) -> Result<()> {
        JobRepository::update(self, job).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        JobRepository::delete(self, id).await
    }

    async fn increment_views(&self, id: &str) -> Result<()> {
        JobRepository::increment_views(self, id).await
    }

    async fn increment_applications(&self, id: &str) -> Result<()> {
        JobRepository::increment_applications(self, id).await
    }

    async fn adjust_saves(&self, id: &str, delta: i64) -> Result<()> {
        JobRepository::adjust_saves(self, id, delta).await
    }
}
