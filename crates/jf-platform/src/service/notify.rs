//! Notifier
//!
//! Best-effort side-effect dispatch: in-app notifications and emails
//! triggered by lifecycle transitions. Every failure here is logged and
//! swallowed so the primary mutation never rolls back.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{
    Application, ApplicationStatus, Job, Notification, NotificationKind, Review,
};
use crate::repository::{NotificationStore, UserStore};
use crate::service::Mailer;

pub struct Notifier {
    notification_repo: Arc<dyn NotificationStore>,
    user_repo: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(
        notification_repo: Arc<dyn NotificationStore>,
        user_repo: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            notification_repo,
            user_repo,
            mailer,
        }
    }

    async fn store(&self, notification: Notification) {
        if let Err(e) = self.notification_repo.insert(&notification).await {
            warn!(user_id = %notification.user_id, error = %e, "notification write failed");
        }
    }

    async fn email(&self, user_id: &str, subject: &str, body: &str) {
        let address = match self.user_repo.find_by_id(user_id).await {
            Ok(Some(user)) => user.email,
            Ok(None) => {
                warn!(user_id, "email skipped: recipient not found");
                return;
            }
            Err(e) => {
                warn!(user_id, error = %e, "email skipped: recipient lookup failed");
                return;
            }
        };
        if let Err(e) = self.mailer.send(&address, subject, body).await {
            warn!(user_id, error = %e, "email delivery failed");
        }
    }

    /// A new application arrived: notify the job owner, confirm to the
    /// applicant by email.
    pub async fn application_received(&self, job: &Job, application: &Application) {
        self.store(
            Notification::new(
                &job.posted_by,
                NotificationKind::ApplicationReceived,
                format!("New application for \"{}\"", job.title),
            )
            .with_job(&job.id)
            .with_application(&application.id),
        )
        .await;

        self.email(
            &application.user_id,
            "Application received",
            &format!(
                "Your application for \"{}\" was submitted and is now pending review.",
                job.title
            ),
        )
        .await;
    }

    /// The employer moved an application: notify and email the applicant.
    pub async fn application_status_changed(
        &self,
        job: &Job,
        application: &Application,
        new_status: ApplicationStatus,
    ) {
        self.store(
            Notification::new(
                &application.user_id,
                NotificationKind::ApplicationStatus,
                format!(
                    "Your application for \"{}\" is now {}",
                    job.title,
                    new_status.as_str()
                ),
            )
            .with_job(&job.id)
            .with_application(&application.id),
        )
        .await;

        self.email(
            &application.user_id,
            &format!("Application update: {}", job.title),
            &format!(
                "The status of your application for \"{}\" changed to {}.",
                job.title,
                new_status.as_str()
            ),
        )
        .await;
    }

    /// An applicant withdrew: notify the job owner.
    pub async fn application_withdrawn(&self, job: &Job, application: &Application) {
        self.store(
            Notification::new(
                &job.posted_by,
                NotificationKind::ApplicationStatus,
                format!("An application for \"{}\" was withdrawn", job.title),
            )
            .with_job(&job.id)
            .with_application(&application.id),
        )
        .await;
    }

    /// The job was filled: tell the applicants still waiting on a decision.
    pub async fn job_closed(&self, job: &Job, open_applicants: &[String]) {
        for user_id in open_applicants {
            self.store(
                Notification::new(
                    user_id,
                    NotificationKind::JobClosed,
                    format!("\"{}\" is no longer accepting applications", job.title),
                )
                .with_job(&job.id),
            )
            .await;
        }
    }

    /// A company received a review: notify the company owner.
    pub async fn review_received(&self, company_owner_id: &str, review: &Review) {
        self.store(
            Notification::new(
                company_owner_id,
                NotificationKind::ReviewReceived,
                format!("Your company received a {}-star review", review.rating),
            )
            .with_company(&review.company_id),
        )
        .await;
    }
}
