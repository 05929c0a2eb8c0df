//! Notification Repository

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use crate::domain::Notification;
use crate::error::Result;

/// Notification write seam used by the notifier.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: &Notification) -> Result<()>;
}

pub struct NotificationRepository {
    collection: Collection<Notification>,
}

impl NotificationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("notifications"),
        }
    }

    pub async fn insert(&self, notification: &Notification) -> Result<()> {
        self.collection.insert_one(notification).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Notification>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_user(&self, user_id: &str, unread_only: bool, skip: u64, limit: i64) -> Result<Vec<Notification>> {
        let mut filter = doc! { "userId": user_id };
        if unread_only {
            filter.insert("read", false);
        }
        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_by_user(&self, user_id: &str) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(doc! { "userId": user_id })
            .await?)
    }

    pub async fn count_unread(&self, user_id: &str) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(doc! { "userId": user_id, "read": false })
            .await?)
    }

    pub async fn update(&self, notification: &Notification) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &notification.id }, notification)
            .await?;
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "userId": user_id, "read": false },
                doc! { "$set": { "read": true, "readAt": Utc::now().to_rfc3339() } },
            )
            .await?;
        Ok(result.modified_count)
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<()> {
        NotificationRepository::insert(self, notification).await
    }
}
