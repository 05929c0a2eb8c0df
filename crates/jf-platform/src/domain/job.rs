//! Job Entity
//!
//! Owns the posting lifecycle: DRAFT <-> PUBLISHED -> CLOSED, with EXPIRED
//! produced by the deadline sweep. CLOSED and EXPIRED have no outgoing
//! transitions. closed_at is set iff status is CLOSED.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Draft,
    Published,
    Closed,
    Expired,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
            Self::Closed => "CLOSED",
            Self::Expired => "EXPIRED",
        }
    }

    /// No transitions lead away from CLOSED or EXPIRED.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Expired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Lead,
    Executive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SalaryPeriod {
    Hourly,
    Monthly,
    Yearly,
}

/// Salary sub-record. `visible` controls whether the range is exposed on
/// public job responses.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Salary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,

    pub currency: String,

    pub period: SalaryPeriod,

    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

/// Monotonic engagement counters. Views and saves are at-least-once (no
/// distinct-viewer dedup); applications is gated by the one-application-
/// per-user unique index upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCounters {
    #[serde(default)]
    pub views: u64,

    #[serde(default)]
    pub application_count: u64,

    #[serde(default)]
    pub save_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: String,

    /// Employer account that posted the job
    pub posted_by: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    pub title: String,
    pub description: String,
    pub category: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default)]
    pub remote: bool,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<DateTime<Utc>>,

    pub status: JobStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub counters: JobCounters,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a job. Immediate visibility is the default: a job created
    /// without an explicit DRAFT request starts PUBLISHED with
    /// published_at set.
    pub fn new(
        posted_by: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        job_type: JobType,
        experience_level: ExperienceLevel,
    ) -> Result<Self> {
        let title = title.into();
        let description = description.into();
        let category = category.into();

        if title.trim().is_empty() {
            return Err(BoardError::validation("title is required"));
        }
        if description.trim().is_empty() {
            return Err(BoardError::validation("description is required"));
        }
        if category.trim().is_empty() {
            return Err(BoardError::validation("category is required"));
        }

        let now = Utc::now();
        Ok(Self {
            id: super::new_id(),
            posted_by: posted_by.into(),
            company_id: None,
            title,
            description,
            category,
            job_type,
            experience_level,
            location: None,
            remote: false,
            skills: Vec::new(),
            salary: None,
            application_deadline: None,
            status: JobStatus::Published,
            published_at: Some(now),
            closed_at: None,
            counters: JobCounters::default(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_company(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }

    pub fn with_salary(mut self, salary: Salary) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn as_draft(mut self) -> Self {
        self.status = JobStatus::Draft;
        self.published_at = None;
        self
    }

    pub fn is_posted_by(&self, user_id: &str) -> bool {
        self.posted_by == user_id
    }

    fn transition_error(&self, to: JobStatus) -> BoardError {
        BoardError::invalid_transition("Job", self.status.as_str(), to.as_str())
    }

    /// DRAFT -> PUBLISHED
    pub fn publish(&mut self) -> Result<()> {
        if self.status != JobStatus::Draft {
            return Err(self.transition_error(JobStatus::Published));
        }
        self.status = JobStatus::Published;
        self.published_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// PUBLISHED -> DRAFT
    pub fn unpublish(&mut self) -> Result<()> {
        if self.status != JobStatus::Published {
            return Err(self.transition_error(JobStatus::Draft));
        }
        self.status = JobStatus::Draft;
        self.published_at = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Any non-terminal status -> CLOSED. Closing an already-closed job is
    /// an idempotent no-op; the caller can tell from the return value
    /// whether a company counter adjustment is owed.
    pub fn close(&mut self) -> Result<JobCloseOutcome> {
        match self.status {
            JobStatus::Closed => Ok(JobCloseOutcome::AlreadyClosed),
            JobStatus::Expired => Err(self.transition_error(JobStatus::Closed)),
            JobStatus::Published => {
                self.status = JobStatus::Closed;
                self.closed_at = Some(Utc::now());
                self.updated_at = Utc::now();
                Ok(JobCloseOutcome::Closed { was_published: true })
            }
            JobStatus::Draft => {
                self.status = JobStatus::Closed;
                self.closed_at = Some(Utc::now());
                self.updated_at = Utc::now();
                Ok(JobCloseOutcome::Closed { was_published: false })
            }
        }
    }

    /// PUBLISHED -> EXPIRED, produced by the deadline sweep.
    pub fn expire(&mut self) -> Result<()> {
        if self.status != JobStatus::Published {
            return Err(self.transition_error(JobStatus::Expired));
        }
        self.status = JobStatus::Expired;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        self.application_deadline.map(|d| d < now).unwrap_or(false)
    }

    pub fn accepts_applications(&self) -> bool {
        self.status == JobStatus::Published
    }
}

/// Result of a close call, distinguishing the idempotent no-op from a real
/// transition so counter cascades fire exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCloseOutcome {
    Closed { was_published: bool },
    AlreadyClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> Job {
        Job::new(
            "user-1",
            "Backend Engineer",
            "Build services",
            "Engineering",
            JobType::FullTime,
            ExperienceLevel::Mid,
        )
        .unwrap()
    }

    #[test]
    fn test_default_status_is_published() {
        let job = sample_job();
        assert_eq!(job.status, JobStatus::Published);
        assert!(job.published_at.is_some());
        assert!(job.closed_at.is_none());
    }

    #[test]
    fn test_blank_title_rejected() {
        let err = Job::new(
            "user-1",
            "  ",
            "desc",
            "cat",
            JobType::Contract,
            ExperienceLevel::Entry,
        )
        .unwrap_err();
        assert!(matches!(err, BoardError::Validation { .. }));
    }

    #[test]
    fn test_publish_requires_draft() {
        let mut job = sample_job();
        // Already published
        let err = job.publish().unwrap_err();
        assert!(matches!(err, BoardError::InvalidTransition { .. }));
        assert_eq!(job.status, JobStatus::Published);

        let mut draft = sample_job().as_draft();
        assert!(draft.published_at.is_none());
        draft.publish().unwrap();
        assert_eq!(draft.status, JobStatus::Published);
        assert!(draft.published_at.is_some());
    }

    #[test]
    fn test_unpublish_toggles_back_to_draft() {
        let mut job = sample_job();
        job.unpublish().unwrap();
        assert_eq!(job.status, JobStatus::Draft);
        assert!(job.unpublish().is_err());
    }

    #[test]
    fn test_close_sets_closed_at_and_is_idempotent() {
        let mut job = sample_job();
        let outcome = job.close().unwrap();
        assert_eq!(outcome, JobCloseOutcome::Closed { was_published: true });
        assert_eq!(job.status, JobStatus::Closed);
        assert!(job.closed_at.is_some());

        // Second close must not report another transition
        assert_eq!(job.close().unwrap(), JobCloseOutcome::AlreadyClosed);
    }

    #[test]
    fn test_no_path_back_from_closed() {
        let mut job = sample_job();
        job.close().unwrap();
        assert!(job.publish().is_err());
        assert!(job.unpublish().is_err());
        assert!(job.expire().is_err());
    }

    #[test]
    fn test_expire_only_from_published() {
        let mut job = sample_job();
        job.expire().unwrap();
        assert_eq!(job.status, JobStatus::Expired);
        assert!(job.close().is_err());

        let mut draft = sample_job().as_draft();
        assert!(draft.expire().is_err());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&JobStatus::Published).unwrap(), "\"PUBLISHED\"");
        assert_eq!(serde_json::to_string(&JobType::FullTime).unwrap(), "\"FULL_TIME\"");
        assert_eq!(serde_json::to_string(&ExperienceLevel::Senior).unwrap(), "\"SENIOR\"");
    }
}
