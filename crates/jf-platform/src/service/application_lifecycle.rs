//! Application Lifecycle
//!
//! Owns the application state machine and its cascades: counters on
//! submit, job auto-close on acceptance, and best-effort notification and
//! email dispatch. Primary mutations fail fast; side effects never roll
//! them back.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{Application, ApplicationStatus, Job};
use crate::error::{BoardError, Result};
use crate::repository::{ApplicationStore, JobStore};
use crate::service::{AuthContext, JobLifecycleService, Notifier};

pub struct NewApplication {
    pub job_id: String,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
}

pub struct ApplicationLifecycleService {
    application_repo: Arc<dyn ApplicationStore>,
    job_repo: Arc<dyn JobStore>,
    job_lifecycle: Arc<JobLifecycleService>,
    notifier: Arc<Notifier>,
}

impl ApplicationLifecycleService {
    pub fn new(
        application_repo: Arc<dyn ApplicationStore>,
        job_repo: Arc<dyn JobStore>,
        job_lifecycle: Arc<JobLifecycleService>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            application_repo,
            job_repo,
            job_lifecycle,
            notifier,
        }
    }

    async fn load_job(&self, job_id: &str) -> Result<Job> {
        self.job_repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| BoardError::not_found("Job", job_id))
    }

    pub async fn submit_application(
        &self,
        applicant: &AuthContext,
        input: NewApplication,
    ) -> Result<Application> {
        let job = self.load_job(&input.job_id).await?;

        if !job.accepts_applications() {
            return Err(BoardError::invalid_transition(
                "Application",
                job.status.as_str(),
                ApplicationStatus::Pending.as_str(),
            ));
        }
        if job.deadline_passed(Utc::now()) {
            return Err(BoardError::validation("Application deadline has passed"));
        }
        if job.is_posted_by(&applicant.user_id) {
            return Err(BoardError::forbidden("Cannot apply to your own job"));
        }

        // Pre-check for a friendly error; the unique index is the backstop
        // under concurrent submits.
        if self
            .application_repo
            .find_by_user_and_job(&applicant.user_id, &job.id)
            .await?
            .is_some()
        {
            return Err(BoardError::duplicate("Application", "jobId", &job.id));
        }

        let mut application = Application::new(&job.id, &applicant.user_id);
        if let Some(company_id) = job.company_id.clone() {
            application = application.with_company(company_id);
        }
        if let Some(cover_letter) = input.cover_letter {
            application = application.with_cover_letter(cover_letter);
        }
        if let Some(resume_url) = input.resume_url {
            application = application.with_resume_url(resume_url);
        }

        self.application_repo.insert(&application).await?;
        info!(application_id = %application.id, job_id = %job.id, "application submitted");

        // Best-effort cascades, each independently failable.
        if let Err(e) = self.job_repo.increment_applications(&job.id).await {
            warn!(job_id = %job.id, error = %e, "application counter update failed");
        }
        self.notifier.application_received(&job, &application).await;

        Ok(application)
    }

    /// Employer-driven status update. WITHDRAWN is reserved for the
    /// applicant's withdrawal path.
    pub async fn update_status(
        &self,
        application_id: &str,
        new_status: ApplicationStatus,
        actor_id: &str,
        reason: Option<String>,
    ) -> Result<Application> {
        if new_status == ApplicationStatus::Withdrawn {
            return Err(BoardError::validation(
                "Applications are withdrawn by the applicant, not the employer",
            ));
        }
        if new_status == ApplicationStatus::Pending {
            return Err(BoardError::validation("Cannot move an application back to PENDING"));
        }

        let mut application = self
            .application_repo
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| BoardError::not_found("Application", application_id))?;

        let job = self.load_job(&application.job_id).await?;
        if !job.is_posted_by(actor_id) {
            return Err(BoardError::forbidden(
                "Only the job's posting employer may update this application",
            ));
        }

        application.transition_to(new_status, actor_id, reason)?;
        self.application_repo.update(&application).await?;
        info!(
            application_id = %application.id,
            status = new_status.as_str(),
            "application status updated"
        );

        self.notifier
            .application_status_changed(&job, &application, new_status)
            .await;

        Ok(application)
    }

    pub async fn shortlist_application(&self, application_id: &str, actor_id: &str) -> Result<Application> {
        self.update_status(application_id, ApplicationStatus::Shortlisted, actor_id, None)
            .await
    }

    pub async fn review_application(&self, application_id: &str, actor_id: &str) -> Result<Application> {
        self.update_status(application_id, ApplicationStatus::Reviewed, actor_id, None)
            .await
    }

    pub async fn reject_application(
        &self,
        application_id: &str,
        actor_id: &str,
        reason: Option<String>,
    ) -> Result<Application> {
        self.update_status(application_id, ApplicationStatus::Rejected, actor_id, reason)
            .await
    }

    /// Accept an application and auto-close the job. A close failure is
    /// logged but does not fail the accept.
    pub async fn accept_application(&self, application_id: &str, actor_id: &str) -> Result<Application> {
        let application = self
            .update_status(application_id, ApplicationStatus::Accepted, actor_id, None)
            .await?;

        match self
            .job_lifecycle
            .close_job(&application.job_id, actor_id)
            .await
        {
            Ok(job) => {
                // Tell the applicants who are still waiting.
                match self.application_repo.find_open_by_job(&job.id).await {
                    Ok(open) => {
                        let applicant_ids: Vec<String> =
                            open.into_iter().map(|a| a.user_id).collect();
                        self.notifier.job_closed(&job, &applicant_ids).await;
                    }
                    Err(e) => {
                        warn!(job_id = %job.id, error = %e, "open applicant lookup failed");
                    }
                }
            }
            Err(e) => {
                warn!(
                    job_id = %application.job_id,
                    error = %e,
                    "job auto-close after acceptance failed"
                );
            }
        }

        Ok(application)
    }

    /// Applicant-initiated withdrawal. Terminal applications (accepted or
    /// rejected) cannot be withdrawn.
    pub async fn withdraw_application(&self, application_id: &str, actor_id: &str) -> Result<Application> {
        let mut application = self
            .application_repo
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| BoardError::not_found("Application", application_id))?;

        if application.user_id != actor_id {
            return Err(BoardError::forbidden("Only the applicant may withdraw an application"));
        }

        application.withdraw(actor_id)?;
        self.application_repo.update(&application).await?;
        info!(application_id = %application.id, "application withdrawn");

        // Best-effort heads-up for the employer.
        match self.load_job(&application.job_id).await {
            Ok(job) => {
                self.notifier
                    .application_withdrawn(&job, &application)
                    .await;
            }
            Err(e) => {
                warn!(
                    application_id = %application.id,
                    error = %e,
                    "withdrawal notification skipped: job lookup failed"
                );
            }
        }

        Ok(application)
    }

    /// Job owner marks an application viewed on first read.
    pub async fn mark_viewed(&self, application_id: &str, actor_id: &str) -> Result<Application> {
        let mut application = self
            .application_repo
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| BoardError::not_found("Application", application_id))?;

        let job = self.load_job(&application.job_id).await?;
        if !job.is_posted_by(actor_id) {
            return Err(BoardError::forbidden(
                "Only the job's posting employer may view this application",
            ));
        }

        if !application.is_viewed {
            application.mark_viewed();
            self.application_repo.update(&application).await?;
        }
        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Company, ExperienceLevel, JobStatus, JobType, Notification, NotificationKind, User,
        UserRole,
    };
    use crate::repository::{CompanyStore, NotificationStore, UserStore};
    use crate::service::Mailer;
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
    impl crate::repository::JobStore for MemoryJobs {
        async fn insert(&self, job: &Job) -> Result<()> {
            self.jobs.lock().unwrap().insert(job.id.clone(), job.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Job>> {
            Ok(self.get(id))
        }

        async fn find_published_with_deadline(&self) -> Result<Vec<Job>> {
            Ok(vec![])
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

    struct MemoryApplications {
        applications: Mutex<HashMap<String, Application>>,
    }

    impl MemoryApplications {
        fn with(application: Application) -> Arc<Self> {
            let mut applications = HashMap::new();
            applications.insert(application.id.clone(), application);
            Arc::new(Self {
                applications: Mutex::new(applications),
            })
        }

        fn empty() -> Arc<Self> {
            Arc::new(Self {
                applications: Mutex::new(HashMap::new()),
            })
        }

        fn get(&self, id: &str) -> Option<Application> {
            self.applications.lock().unwrap().get(id).cloned()
        }
    }

    #[async_trait]
    impl ApplicationStore for MemoryApplications {
        async fn insert(&self, application: &Application) -> Result<()> {
            self.applications
                .lock()
                .unwrap()
                .insert(application.id.clone(), application.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Application>> {
            Ok(self.get(id))
        }

        async fn find_by_user_and_job(&self, user_id: &str, job_id: &str) -> Result<Option<Application>> {
            Ok(self
                .applications
                .lock()
                .unwrap()
                .values()
                .find(|a| a.user_id == user_id && a.job_id == job_id)
                .cloned())
        }

        async fn find_open_by_job(&self, job_id: &str) -> Result<Vec<Application>> {
            Ok(self
                .applications
                .lock()
                .unwrap()
                .values()
                .filter(|a| {
                    a.job_id == job_id
                        && matches!(
                            a.status,
                            ApplicationStatus::Pending
                                | ApplicationStatus::Reviewed
                                | ApplicationStatus::Shortlisted
                        )
                })
                .cloned()
                .collect())
        }

        async fn update(&self, application: &Application) -> Result<()> {
            self.applications
                .lock()
                .unwrap()
                .insert(application.id.clone(), application.clone());
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

    /// Records stored notifications; can be switched to fail every write.
    struct RecordingNotifications {
        stored: Mutex<Vec<Notification>>,
        failing: bool,
    }

    impl RecordingNotifications {
        fn working() -> Arc<Self> {
            Arc::new(Self {
                stored: Mutex::new(vec![]),
                failing: false,
            })
        }

        fn broken() -> Arc<Self> {
            Arc::new(Self {
                stored: Mutex::new(vec![]),
                failing: true,
            })
        }
    }

    #[async_trait]
    impl NotificationStore for RecordingNotifications {
        async fn insert(&self, notification: &Notification) -> Result<()> {
            if self.failing {
                return Err(BoardError::internal("notification store offline"));
            }
            self.stored.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    struct KnownUsers;

    #[async_trait]
    impl UserStore for KnownUsers {
        async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
            Ok(Some(User::new(
                format!("{id}@example.com"),
                "hash",
                "Test User",
                UserRole::JobSeeker,
            )))
        }
    }

    struct BrokenMailer;

    #[async_trait]
    impl Mailer for BrokenMailer {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("smtp relay unreachable"))
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

    fn applicant(user_id: &str) -> AuthContext {
        AuthContext {
            user_id: user_id.to_string(),
            email: format!("{user_id}@example.com"),
            name: "Test User".to_string(),
            role: UserRole::JobSeeker,
        }
    }

    fn service(
        applications: Arc<MemoryApplications>,
        jobs: Arc<MemoryJobs>,
        notifications: Arc<RecordingNotifications>,
    ) -> ApplicationLifecycleService {
        let notifier = Arc::new(Notifier::new(
            notifications,
            Arc::new(KnownUsers),
            Arc::new(BrokenMailer),
        ));
        let job_lifecycle = Arc::new(JobLifecycleService::new(
            jobs.clone(),
            Arc::new(NoCompanies),
        ));
        ApplicationLifecycleService::new(applications, jobs, job_lifecycle, notifier)
    }

    #[tokio::test]
    async fn test_accept_closes_job_even_when_collaborators_fail() {
        let job = sample_job();
        let job_id = job.id.clone();
        let application = Application::new(&job_id, "seeker-1");
        let application_id = application.id.clone();

        let jobs = MemoryJobs::with(job);
        let applications = MemoryApplications::with(application);
        let svc = service(
            applications.clone(),
            jobs.clone(),
            RecordingNotifications::broken(),
        );

        let accepted = svc
            .accept_application(&application_id, "employer-1")
            .await
            .unwrap();
        assert_eq!(accepted.status, ApplicationStatus::Accepted);
        assert_eq!(
            applications.get(&application_id).unwrap().status,
            ApplicationStatus::Accepted
        );
        assert_eq!(jobs.get(&job_id).unwrap().status, JobStatus::Closed);
    }

    #[tokio::test]
    async fn test_submit_to_closed_job_is_an_invalid_transition() {
        let mut job = sample_job();
        job.close().unwrap();
        let job_id = job.id.clone();

        let svc = service(
            MemoryApplications::empty(),
            MemoryJobs::with(job),
            RecordingNotifications::working(),
        );

        let result = svc
            .submit_application(
                &applicant("seeker-1"),
                NewApplication {
                    job_id,
                    cover_letter: None,
                    resume_url: None,
                },
            )
            .await;
        assert!(matches!(result, Err(BoardError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_withdrawal_notifies_the_job_owner() {
        let job = sample_job();
        let application = Application::new(&job.id, "seeker-1");
        let application_id = application.id.clone();

        let notifications = RecordingNotifications::working();
        let svc = service(
            MemoryApplications::with(application),
            MemoryJobs::with(job),
            notifications.clone(),
        );

        let withdrawn = svc
            .withdraw_application(&application_id, "seeker-1")
            .await
            .unwrap();
        assert_eq!(withdrawn.status, ApplicationStatus::Withdrawn);

        let stored = notifications.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].user_id, "employer-1");
        assert_eq!(stored[0].kind, NotificationKind::ApplicationStatus);
    }
}
