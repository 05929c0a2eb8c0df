//! User Entity
//!
//! Job seekers and employers share one account entity distinguished by role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Browses and applies to jobs
    JobSeeker,
    /// Creates companies, posts jobs, reviews applications
    Employer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,

    /// Login identity, unique across the platform
    pub email: String,

    /// Argon2id hash, never serialized to API responses
    pub password_hash: String,

    pub name: String,

    pub role: UserRole,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Profile fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default)]
    pub skills: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: super::new_id(),
            email: email.into().to_lowercase(),
            password_hash: password_hash.into(),
            name: name.into(),
            role,
            active: true,
            headline: None,
            bio: None,
            location: None,
            skills: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_employer(&self) -> bool {
        self.role == UserRole::Employer
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("Jo@Example.COM", "hash", "Jo", UserRole::JobSeeker);
        assert_eq!(user.email, "jo@example.com");
        assert!(user.active);
        assert!(!user.is_employer());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&UserRole::JobSeeker).unwrap(), "\"JOB_SEEKER\"");
        assert_eq!(serde_json::to_string(&UserRole::Employer).unwrap(), "\"EMPLOYER\"");
    }
}
