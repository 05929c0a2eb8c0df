//! Notification Entity
//!
//! Best-effort in-app notifications. Retention is a housekeeping property
//! of the store: a TTL index on created_at drops documents after 30 days.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification retention window in seconds (30 days).
pub const NOTIFICATION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// A new application arrived for one of the recipient's jobs
    ApplicationReceived,
    /// The recipient's application changed status
    ApplicationStatus,
    /// A job the recipient applied to or saved was closed
    JobClosed,
    /// The recipient's company received a review
    ReviewReceived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,

    /// Recipient account
    pub user_id: String,

    pub kind: NotificationKind,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    #[serde(default)]
    pub read: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,

    /// Stored as a BSON date: the TTL index only expires real dates.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: impl Into<String>,
        kind: NotificationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: super::new_id(),
            user_id: user_id.into(),
            kind,
            message: message.into(),
            job_id: None,
            application_id: None,
            company_id: None,
            read: false,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_job(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_application(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }

    pub fn with_company(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }

    pub fn mark_read(&mut self) {
        if !self.read {
            self.read = true;
            self.read_at = Some(Utc::now());
        }
    }
}
