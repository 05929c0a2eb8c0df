//! Job Lifecycle
//!
//! Owns the posting state machine and the company active-jobs counter
//! cascade. Only the posting employer may mutate a job.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::{ExperienceLevel, Job, JobCloseOutcome, JobStatus, JobType, Salary};
use crate::error::{BoardError, Result};
use crate::repository::{CompanyStore, JobStore};
use crate::service::AuthContext;

/// Input for job creation. Status defaults to PUBLISHED when `draft` is
/// not requested.
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub category: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub company_id: Option<String>,
    pub location: Option<String>,
    pub remote: bool,
    pub skills: Vec<String>,
    pub salary: Option<Salary>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub draft: bool,
}

/// Owner-editable fields.
#[derive(Default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub remote: Option<bool>,
    pub skills: Option<Vec<String>>,
    pub salary: Option<Salary>,
    pub application_deadline: Option<DateTime<Utc>>,
}

pub struct JobLifecycleService {
    job_repo: Arc<dyn JobStore>,
    company_repo: Arc<dyn CompanyStore>,
}

impl JobLifecycleService {
    pub fn new(job_repo: Arc<dyn JobStore>, company_repo: Arc<dyn CompanyStore>) -> Self {
        Self {
            job_repo,
            company_repo,
        }
    }

    async fn load_owned(&self, job_id: &str, actor_id: &str) -> Result<Job> {
        let job = self
            .job_repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| BoardError::not_found("Job", job_id))?;
        if !job.is_posted_by(actor_id) {
            return Err(BoardError::forbidden("Only the posting employer may modify this job"));
        }
        Ok(job)
    }

    /// Adjust the owning company's active jobs counter, best-effort.
    async fn adjust_company_active(&self, job: &Job, delta: i64) {
        if let Some(ref company_id) = job.company_id {
            if let Err(e) = self.company_repo.adjust_active_jobs(company_id, delta).await {
                warn!(company_id = %company_id, delta, error = %e, "active jobs counter update failed");
            }
        }
    }

    pub async fn create_job(&self, input: NewJob, actor: &AuthContext) -> Result<Job> {
        if !actor.is_employer() {
            return Err(BoardError::forbidden("Only employers can post jobs"));
        }

        let mut job = Job::new(
            &actor.user_id,
            input.title,
            input.description,
            input.category,
            input.job_type,
            input.experience_level,
        )?;

        if let Some(company_id) = input.company_id {
            let company = self
                .company_repo
                .find_by_id(&company_id)
                .await?
                .ok_or_else(|| BoardError::not_found("Company", &company_id))?;
            if !company.is_owned_by(&actor.user_id) {
                return Err(BoardError::forbidden("Company belongs to another employer"));
            }
            job = job.with_company(company_id);
        }

        job.location = input.location;
        job.remote = input.remote;
        job.skills = input.skills;
        job.salary = input.salary;
        job.application_deadline = input.application_deadline;

        if input.draft {
            job = job.as_draft();
        }

        self.job_repo.insert(&job).await?;

        if job.status == JobStatus::Published {
            self.adjust_company_active(&job, 1).await;
        }

        info!(job_id = %job.id, status = job.status.as_str(), "job created");
        Ok(job)
    }

    pub async fn update_job(&self, job_id: &str, actor_id: &str, patch: JobPatch) -> Result<Job> {
        let mut job = self.load_owned(job_id, actor_id).await?;

        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(BoardError::validation("title is required"));
            }
            job.title = title;
        }
        if let Some(description) = patch.description {
            if description.trim().is_empty() {
                return Err(BoardError::validation("description is required"));
            }
            job.description = description;
        }
        if let Some(category) = patch.category {
            job.category = category;
        }
        if let Some(location) = patch.location {
            job.location = Some(location);
        }
        if let Some(remote) = patch.remote {
            job.remote = remote;
        }
        if let Some(skills) = patch.skills {
            job.skills = skills;
        }
        if let Some(salary) = patch.salary {
            job.salary = Some(salary);
        }
        if let Some(deadline) = patch.application_deadline {
            job.application_deadline = Some(deadline);
        }

        job.updated_at = Utc::now();
        self.job_repo.update(&job).await?;
        Ok(job)
    }

    pub async fn publish_job(&self, job_id: &str, actor_id: &str) -> Result<Job> {
        let mut job = self.load_owned(job_id, actor_id).await?;
        job.publish()?;
        self.job_repo.update(&job).await?;
        self.adjust_company_active(&job, 1).await;
        info!(job_id = %job.id, "job published");
        Ok(job)
    }

    pub async fn unpublish_job(&self, job_id: &str, actor_id: &str) -> Result<Job> {
        let mut job = self.load_owned(job_id, actor_id).await?;
        job.unpublish()?;
        self.job_repo.update(&job).await?;
        self.adjust_company_active(&job, -1).await;
        info!(job_id = %job.id, "job unpublished");
        Ok(job)
    }

    /// Close a job. Idempotent: closing an already-closed job returns it
    /// unchanged and never double-decrements the company counter.
    pub async fn close_job(&self, job_id: &str, actor_id: &str) -> Result<Job> {
        let mut job = self.load_owned(job_id, actor_id).await?;
        match job.close()? {
            JobCloseOutcome::AlreadyClosed => Ok(job),
            JobCloseOutcome::Closed { was_published } => {
                self.job_repo.update(&job).await?;
                if was_published {
                    self.adjust_company_active(&job, -1).await;
                }
                info!(job_id = %job.id, "job closed");
                Ok(job)
            }
        }
    }

    /// Hard delete. Existing applications keep their job_id reference.
    pub async fn delete_job(&self, job_id: &str, actor_id: &str) -> Result<()> {
        let job = self.load_owned(job_id, actor_id).await?;
        self.job_repo.delete(&job.id).await?;
        if job.status == JobStatus::Published {
            self.adjust_company_active(&job, -1).await;
        }
        info!(job_id = %job.id, "job deleted");
        Ok(())
    }

    /// Move published jobs whose application deadline has passed to
    /// EXPIRED. Invoked from the maintenance endpoint; there is no
    /// in-process scheduler.
    pub async fn expire_overdue_jobs(&self, now: DateTime<Utc>) -> Result<u64> {
        let candidates = self.job_repo.find_published_with_deadline().await?;
        let mut expired = 0u64;
        for mut job in candidates {
            if !job.deadline_passed(now) {
                continue;
            }
            if job.expire().is_ok() {
                self.job_repo.update(&job).await?;
                self.adjust_company_active(&job, -1).await;
                expired += 1;
            }
        }
        if expired > 0 {
            info!(expired, "expired overdue jobs");
        }
        Ok(expired)
    }

    /// At-least-once view counter; a repeat view by the same user counts
    /// every time.
    pub async fn record_view(&self, job_id: &str) {
        if let Err(e) = self.job_repo.increment_views(job_id).await {
            warn!(job_id, error = %e, "view counter update failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Company;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MemoryJobs {
        jobs: Mutex<HashMap<String, Job>>,
    }

    impl MemoryJobs {
        fn with(job: Job) -> Arc<Self> {
            let mut jobs = HashMap::new();
            jobs.insert(job.id.clone(), job);
            Arc::new(Self {
                jobs: Mutex::new(jobs),
            })
        }

        fn get(&self, id: &str) -> Option<Job> {
            self.jobs.lock().unwrap().get(id).cloned()
        }
    }

    #[async_trait]
    impl JobStore for MemoryJobs {
        async fn insert(&self, job: &Job) -> Result<()> {
            self.jobs.lock().unwrap().insert(job.id.clone(), job.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Job>> {
            Ok(self.get(id))
        }

        async fn find_published_with_deadline(&self) -> Result<Vec<Job>> {
            Ok(self
                .jobs
                .lock()
                .unwrap()
                .values()
                .filter(|j| j.status == JobStatus::Published && j.application_deadline.is_some())
                .cloned()
                .collect())
        }

        async fn update(&self, job: &Job) -> Result<()> {
            self.jobs.lock().unwrap().insert(job.id.clone(), job.clone());
            Ok(())
        }

        async fn delete(&self, id: &str) -> Result<bool> {
            Ok(self.jobs.lock().unwrap().remove(id).is_some())
        }

        async fn increment_views(&self, _id: &str) -> Result<()> {
            Ok(())
        }

        async fn increment_applications(&self, _id: &str) -> Result<()> {
            Ok(())
        }

        async fn adjust_saves(&self, _id: &str, _delta: i64) -> Result<()> {
            Ok(())
        }
    }

    struct NoCompanies;

    #[async_trait]
    impl CompanyStore for NoCompanies {
        async fn find_by_id(&self, _id: &str) -> Result<Option<Company>> {
            Ok(None)
        }

        async fn adjust_active_jobs(&self, _id: &str, _delta: i64) -> Result<()> {
            Ok(())
        }
    }

    fn sample_job() -> Job {
        Job::new(
            "employer-1",
            "Backend Engineer",
            "Build and run the platform services",
            "engineering",
            JobType::FullTime,
            ExperienceLevel::Mid,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_close_requires_the_posting_employer() {
        let job = sample_job();
        let job_id = job.id.clone();
        let jobs = MemoryJobs::with(job);
        let svc = JobLifecycleService::new(jobs.clone(), Arc::new(NoCompanies));

        let result = svc.close_job(&job_id, "employer-2").await;
        assert!(matches!(result, Err(BoardError::Forbidden { .. })));
        assert_eq!(jobs.get(&job_id).unwrap().status, JobStatus::Published);
    }

    #[tokio::test]
    async fn test_owner_closes_job() {
        let job = sample_job();
        let job_id = job.id.clone();
        let jobs = MemoryJobs::with(job);
        let svc = JobLifecycleService::new(jobs.clone(), Arc::new(NoCompanies));

        let closed = svc.close_job(&job_id, "employer-1").await.unwrap();
        assert_eq!(closed.status, JobStatus::Closed);
        assert_eq!(jobs.get(&job_id).unwrap().status, JobStatus::Closed);
    }

    #[tokio::test]
    async fn test_update_requires_the_posting_employer() {
        let job = sample_job();
        let job_id = job.id.clone();
        let jobs = MemoryJobs::with(job);
        let svc = JobLifecycleService::new(jobs, Arc::new(NoCompanies));

        let patch = JobPatch {
            title: Some("Lead Engineer".to_string()),
            ..JobPatch::default()
        };
        let result = svc.update_job(&job_id, "employer-2", patch).await;
        assert!(matches!(result, Err(BoardError::Forbidden { .. })));
    }
}
