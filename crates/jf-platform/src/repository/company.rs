//! Company Repository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use crate::domain::Company;
use crate::error::Result;

/// Company persistence seam used by the job lifecycle service for the
/// ownership check and the active-jobs counter cascade.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Company>>;
    async fn adjust_active_jobs(&self, id: &str, delta: i64) -> Result<()>;
}

pub struct CompanyRepository {
    collection: Collection<Company>,
}

impl CompanyRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("companies"),
        }
    }

    pub async fn insert(&self, company: &Company) -> Result<()> {
        self.collection.insert_one(company).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Company>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Company>> {
        let cursor = self.collection.find(doc! { "ownerId": owner_id }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_page(&self, skip: u64, limit: i64) -> Result<Vec<Company>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    pub async fn update(&self, company: &Company) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &company.id }, company)
            .await?;
        Ok(())
    }

    /// Atomic adjustment of the active jobs counter.
    pub async fn adjust_active_jobs(&self, id: &str, delta: i64) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$inc": { "activeJobsCount": delta } },
            )
            .await?;
        Ok(())
    }

    /// Write recomputed rating stats onto the company document.
    pub async fn set_rating_stats(&self, id: &str, average: f64, count: u64) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "averageRating": average, "reviewCount": count as i64 } },
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[async_trait]
impl CompanyStore for CompanyRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Company>> {
        CompanyRepository::find_by_id(self, id).await
    }

    async fn adjust_active_jobs(&self, id: &str, delta: i64) -> Result<()> {
        CompanyRepository::adjust_active_jobs(self, id, delta).await
    }
}
