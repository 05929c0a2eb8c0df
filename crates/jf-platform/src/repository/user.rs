//! User Repository

use async_trait::async_trait;
use mongodb::{bson::doc, Collection, Database};

use crate::domain::User;
use crate::error::{BoardError, Result};

/// User lookup seam used by the notifier for email addressing.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;
}

pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }

    pub async fn insert(&self, user: &User) -> Result<()> {
        self.collection
            .insert_one(user)
            .await
            .map_err(|e| BoardError::from_insert(e, "User", "email", &user.email))?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .collection
            .find_one(doc! { "email": email.to_lowercase() })
            .await?)
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let count = self
            .collection
            .count_documents(doc! { "email": email.to_lowercase() })
            .await?;
        Ok(count > 0)
    }

    pub async fn update(&self, user: &User) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &user.id }, user)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        UserRepository::find_by_id(self, id).await
    }
}
