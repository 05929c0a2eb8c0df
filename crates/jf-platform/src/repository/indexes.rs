//! Index Bootstrap
//!
//! Declares the unique-key constraints the lifecycle services rely on and
//! the notification retention TTL. Run once at server startup.

use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};
use tracing::info;

use crate::domain::{Application, Notification, Review, SavedJob, User, NOTIFICATION_TTL_SECS};
use crate::domain::Job;
use crate::error::Result;

pub async fn ensure_indexes(db: &Database) -> Result<()> {
    let unique = IndexOptions::builder().unique(true).build();

    // One account per email
    db.collection::<User>("users")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique.clone())
                .build(),
        )
        .await?;

    // One application per (user, job)
    db.collection::<Application>("applications")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "userId": 1, "jobId": 1 })
                .options(unique.clone())
                .build(),
        )
        .await?;

    // One review per (user, company)
    db.collection::<Review>("reviews")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "userId": 1, "companyId": 1 })
                .options(unique.clone())
                .build(),
        )
        .await?;

    // One bookmark per (user, job)
    db.collection::<SavedJob>("saved_jobs")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "userId": 1, "jobId": 1 })
                .options(unique)
                .build(),
        )
        .await?;

    // Notifications expire after the retention window
    db.collection::<Notification>("notifications")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "createdAt": 1 })
                .options(
                    IndexOptions::builder()
                        .expire_after(Duration::from_secs(NOTIFICATION_TTL_SECS))
                        .build(),
                )
                .build(),
        )
        .await?;

    // Text search over the public job listing
    db.collection::<Job>("jobs")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "title": "text", "description": "text", "skills": "text" })
                .build(),
        )
        .await?;

    // Browse filter support
    db.collection::<Job>("jobs")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "status": 1, "category": 1, "createdAt": -1 })
                .build(),
        )
        .await?;

    info!("MongoDB indexes ensured");
    Ok(())
}
