//! Application Entity
//!
//! A job seeker's submission against a specific job. Status changes flow
//! through [`Application::transition_to`], which enforces the state machine
//! and appends to the append-only status history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Shortlisted,
    Rejected,
    Accepted,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Reviewed => "REVIEWED",
            Self::Shortlisted => "SHORTLISTED",
            Self::Rejected => "REJECTED",
            Self::Accepted => "ACCEPTED",
            Self::Withdrawn => "WITHDRAWN",
        }
    }

    /// ACCEPTED and REJECTED block withdrawal; WITHDRAWN has no outgoing
    /// transitions by convention.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Withdrawn)
    }

    /// Whether the employer (or applicant, for WITHDRAWN) may move an
    /// application from `self` to `to`.
    pub fn can_transition_to(&self, to: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        match self {
            Pending => matches!(to, Reviewed | Shortlisted | Rejected | Accepted | Withdrawn),
            Reviewed => matches!(to, Shortlisted | Rejected | Accepted | Withdrawn),
            Shortlisted => matches!(to, Reviewed | Rejected | Accepted | Withdrawn),
            Rejected | Accepted | Withdrawn => false,
        }
    }
}

/// One entry in the append-only status history log.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: ApplicationStatus,
    pub changed_at: DateTime<Utc>,
    pub changed_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: String,

    pub job_id: String,

    /// Applicant account
    pub user_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,

    pub status: ApplicationStatus,

    #[serde(default)]
    pub status_history: Vec<StatusChange>,

    #[serde(default)]
    pub is_viewed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewed_at: Option<DateTime<Utc>>,

    /// Set on the first transition away from PENDING
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,

    /// Set when the status reaches ACCEPTED or REJECTED
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn new(job_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        let user_id = user_id.into();
        Self {
            id: super::new_id(),
            job_id: job_id.into(),
            company_id: None,
            cover_letter: None,
            resume_url: None,
            status: ApplicationStatus::Pending,
            status_history: vec![StatusChange {
                status: ApplicationStatus::Pending,
                changed_at: now,
                changed_by: user_id.clone(),
                reason: None,
            }],
            user_id,
            is_viewed: false,
            viewed_at: None,
            reviewed_at: None,
            decision_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_company(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }

    pub fn with_cover_letter(mut self, cover_letter: impl Into<String>) -> Self {
        self.cover_letter = Some(cover_letter.into());
        self
    }

    pub fn with_resume_url(mut self, resume_url: impl Into<String>) -> Self {
        self.resume_url = Some(resume_url.into());
        self
    }

    /// Apply a status transition, appending to the history log and
    /// stamping reviewed_at / decision_at / rejection_reason.
    pub fn transition_to(
        &mut self,
        new_status: ApplicationStatus,
        actor: impl Into<String>,
        reason: Option<String>,
    ) -> Result<()> {
        if !self.status.can_transition_to(new_status) {
            return Err(BoardError::invalid_transition(
                "Application",
                self.status.as_str(),
                new_status.as_str(),
            ));
        }

        let now = Utc::now();

        if self.status == ApplicationStatus::Pending && self.reviewed_at.is_none() {
            self.reviewed_at = Some(now);
        }
        if matches!(new_status, ApplicationStatus::Accepted | ApplicationStatus::Rejected) {
            self.decision_at = Some(now);
        }
        if new_status == ApplicationStatus::Rejected {
            self.rejection_reason = reason.clone();
        }

        self.status = new_status;
        self.status_history.push(StatusChange {
            status: new_status,
            changed_at: now,
            changed_by: actor.into(),
            reason,
        });
        self.updated_at = now;
        Ok(())
    }

    /// Applicant-initiated withdrawal, blocked once a decision was made.
    pub fn withdraw(&mut self, actor: impl Into<String>) -> Result<()> {
        self.transition_to(
            ApplicationStatus::Withdrawn,
            actor,
            Some("Withdrawn by applicant".to_string()),
        )
    }

    pub fn mark_viewed(&mut self) {
        if !self.is_viewed {
            self.is_viewed = true;
            self.viewed_at = Some(Utc::now());
            self.updated_at = Utc::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Application {
        Application::new("job-1", "seeker-1").with_cover_letter("hello")
    }

    #[test]
    fn test_new_application_is_pending_with_history() {
        let app = sample();
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.status_history.len(), 1);
        assert_eq!(app.status_history[0].status, ApplicationStatus::Pending);
        assert!(!app.is_viewed);
    }

    #[test]
    fn test_history_appends_in_order() {
        let mut app = sample();
        app.transition_to(ApplicationStatus::Reviewed, "employer-1", None).unwrap();
        app.transition_to(ApplicationStatus::Shortlisted, "employer-1", None).unwrap();
        app.transition_to(ApplicationStatus::Accepted, "employer-1", None).unwrap();

        let statuses: Vec<_> = app.status_history.iter().map(|h| h.status).collect();
        assert_eq!(
            statuses,
            vec![
                ApplicationStatus::Pending,
                ApplicationStatus::Reviewed,
                ApplicationStatus::Shortlisted,
                ApplicationStatus::Accepted,
            ]
        );
    }

    #[test]
    fn test_reviewed_at_set_on_first_non_pending_only() {
        let mut app = sample();
        app.transition_to(ApplicationStatus::Reviewed, "e", None).unwrap();
        let first = app.reviewed_at.unwrap();
        app.transition_to(ApplicationStatus::Shortlisted, "e", None).unwrap();
        assert_eq!(app.reviewed_at.unwrap(), first);
    }

    #[test]
    fn test_decision_at_and_rejection_reason() {
        let mut app = sample();
        app.transition_to(
            ApplicationStatus::Rejected,
            "e",
            Some("Not enough experience".to_string()),
        )
        .unwrap();
        assert!(app.decision_at.is_some());
        assert_eq!(app.rejection_reason.as_deref(), Some("Not enough experience"));
    }

    #[test]
    fn test_withdraw_blocked_after_decision() {
        let mut accepted = sample();
        accepted.transition_to(ApplicationStatus::Accepted, "e", None).unwrap();
        assert!(matches!(
            accepted.withdraw("seeker-1").unwrap_err(),
            BoardError::InvalidTransition { .. }
        ));

        let mut rejected = sample();
        rejected.transition_to(ApplicationStatus::Rejected, "e", None).unwrap();
        assert!(rejected.withdraw("seeker-1").is_err());
    }

    #[test]
    fn test_withdraw_from_shortlisted() {
        let mut app = sample();
        app.transition_to(ApplicationStatus::Shortlisted, "e", None).unwrap();
        app.withdraw("seeker-1").unwrap();
        assert_eq!(app.status, ApplicationStatus::Withdrawn);
        assert_eq!(
            app.status_history.last().unwrap().reason.as_deref(),
            Some("Withdrawn by applicant")
        );
    }

    #[test]
    fn test_withdrawn_is_terminal() {
        let mut app = sample();
        app.withdraw("seeker-1").unwrap();
        assert!(app.transition_to(ApplicationStatus::Reviewed, "e", None).is_err());
    }

    #[test]
    fn test_mark_viewed_first_read_only() {
        let mut app = sample();
        app.mark_viewed();
        let first = app.viewed_at.unwrap();
        app.mark_viewed();
        assert_eq!(app.viewed_at.unwrap(), first);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ApplicationStatus::Shortlisted).unwrap(),
            "\"SHORTLISTED\""
        );
    }
}
