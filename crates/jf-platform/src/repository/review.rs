//! Review Repository

use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use crate::domain::Review;
use crate::error::{BoardError, Result};

pub struct ReviewRepository {
    collection: Collection<Review>,
}

impl ReviewRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("reviews"),
        }
    }

    pub async fn insert(&self, review: &Review) -> Result<()> {
        self.collection
            .insert_one(review)
            .await
            .map_err(|e| BoardError::from_insert(e, "Review", "companyId", &review.company_id))?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Review>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_company(&self, company_id: &str, skip: u64, limit: i64) -> Result<Vec<Review>> {
        let cursor = self
            .collection
            .find(doc! { "companyId": company_id })
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// All ratings for a company, for the full recompute.
    pub async fn ratings_for_company(&self, company_id: &str) -> Result<Vec<i32>> {
        let cursor = self.collection.find(doc! { "companyId": company_id }).await?;
        let reviews: Vec<Review> = cursor.try_collect().await?;
        Ok(reviews.into_iter().map(|r| r.rating).collect())
    }

    pub async fn count_by_company(&self, company_id: &str) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(doc! { "companyId": company_id })
            .await?)
    }

    pub async fn exists_by_user_and_company(&self, user_id: &str, company_id: &str) -> Result<bool> {
        let count = self
            .collection
            .count_documents(doc! { "userId": user_id, "companyId": company_id })
            .await?;
        Ok(count > 0)
    }

    pub async fn update(&self, review: &Review) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &review.id }, review)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
