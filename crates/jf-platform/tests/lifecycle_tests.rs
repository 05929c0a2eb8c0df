//! Lifecycle Integration Tests
//!
//! Tests for the job and application state machines, rating aggregation,
//! and the API response shaping — everything that holds without a live
//! database.

use jf_platform::domain::{
    Application, ApplicationStatus, Company, ExperienceLevel, Job, JobCloseOutcome, JobStatus,
    JobType, Notification, NotificationKind, Review, Salary, SalaryPeriod, User, UserRole,
};
use jf_platform::service::average_rating;
use jf_platform::BoardError;

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

mod job_lifecycle_tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_job_starts_published_by_default() {
        let job = sample_job();
        assert_eq!(job.status, JobStatus::Published);
        assert!(job.published_at.is_some());
        assert!(job.closed_at.is_none());
        assert!(job.accepts_applications());
    }

    #[test]
    fn test_draft_job_does_not_accept_applications() {
        let job = sample_job().as_draft();
        assert_eq!(job.status, JobStatus::Draft);
        assert!(job.published_at.is_none());
        assert!(!job.accepts_applications());
    }

    #[test]
    fn test_publish_draft() {
        let mut job = sample_job().as_draft();
        job.publish().unwrap();
        assert_eq!(job.status, JobStatus::Published);
        assert!(job.published_at.is_some());
    }

    #[test]
    fn test_publish_published_job_fails_without_side_effects() {
        let mut job = sample_job();
        let published_at = job.published_at;
        let err = job.publish().unwrap_err();
        assert!(matches!(err, BoardError::InvalidTransition { .. }));
        assert_eq!(job.status, JobStatus::Published);
        assert_eq!(job.published_at, published_at);
    }

    #[test]
    fn test_close_sets_closed_at() {
        let mut job = sample_job();
        let outcome = job.close().unwrap();
        assert_eq!(outcome, JobCloseOutcome::Closed { was_published: true });
        assert_eq!(job.status, JobStatus::Closed);
        assert!(job.closed_at.is_some());
        assert!(!job.accepts_applications());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut job = sample_job();
        job.close().unwrap();
        let closed_at = job.closed_at;

        let outcome = job.close().unwrap();
        assert_eq!(outcome, JobCloseOutcome::AlreadyClosed);
        assert_eq!(job.closed_at, closed_at);
    }

    #[test]
    fn test_close_draft_reports_not_published() {
        let mut job = sample_job().as_draft();
        let outcome = job.close().unwrap();
        assert_eq!(outcome, JobCloseOutcome::Closed { was_published: false });
    }

    #[test]
    fn test_no_path_out_of_closed() {
        let mut job = sample_job();
        job.close().unwrap();
        assert!(job.publish().is_err());
        assert!(job.unpublish().is_err());
        assert!(job.expire().is_err());
    }

    #[test]
    fn test_expire_requires_published() {
        let mut job = sample_job();
        job.expire().unwrap();
        assert_eq!(job.status, JobStatus::Expired);

        let mut draft = sample_job().as_draft();
        assert!(draft.expire().is_err());
    }

    #[test]
    fn test_deadline_passed() {
        let mut job = sample_job();
        assert!(!job.deadline_passed(Utc::now()));

        job.application_deadline = Some(Utc::now() - Duration::hours(1));
        assert!(job.deadline_passed(Utc::now()));

        job.application_deadline = Some(Utc::now() + Duration::hours(1));
        assert!(!job.deadline_passed(Utc::now()));
    }

    #[test]
    fn test_ownership_check() {
        let job = sample_job();
        assert!(job.is_posted_by("employer-1"));
        assert!(!job.is_posted_by("employer-2"));
    }

    #[test]
    fn test_blank_title_rejected() {
        let result = Job::new(
            "employer-1",
            "   ",
            "desc",
            "cat",
            JobType::Contract,
            ExperienceLevel::Senior,
        );
        assert!(matches!(result, Err(BoardError::Validation { .. })));
    }
}

mod application_lifecycle_tests {
    use super::*;

    #[test]
    fn test_new_application_is_pending_with_seeded_history() {
        let app = Application::new("job-1", "seeker-1");
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.status_history.len(), 1);
        assert_eq!(app.status_history[0].status, ApplicationStatus::Pending);
        assert!(!app.is_viewed);
    }

    #[test]
    fn test_full_hiring_path() {
        let mut app = Application::new("job-1", "seeker-1");
        app.transition_to(ApplicationStatus::Reviewed, "employer-1", None)
            .unwrap();
        app.transition_to(ApplicationStatus::Shortlisted, "employer-1", None)
            .unwrap();
        app.transition_to(ApplicationStatus::Accepted, "employer-1", None)
            .unwrap();

        assert_eq!(app.status, ApplicationStatus::Accepted);
        assert!(app.reviewed_at.is_some());
        assert!(app.decision_at.is_some());
        // PENDING + three transitions
        assert_eq!(app.status_history.len(), 4);
    }

    #[test]
    fn test_shortlist_can_return_to_reviewed() {
        let mut app = Application::new("job-1", "seeker-1");
        app.transition_to(ApplicationStatus::Shortlisted, "e", None)
            .unwrap();
        app.transition_to(ApplicationStatus::Reviewed, "e", None)
            .unwrap();
        assert_eq!(app.status, ApplicationStatus::Reviewed);
    }

    #[test]
    fn test_rejection_records_reason() {
        let mut app = Application::new("job-1", "seeker-1");
        app.transition_to(
            ApplicationStatus::Rejected,
            "employer-1",
            Some("Role filled internally".to_string()),
        )
        .unwrap();

        assert_eq!(
            app.rejection_reason.as_deref(),
            Some("Role filled internally")
        );
        assert!(app.decision_at.is_some());
        let last = app.status_history.last().unwrap();
        assert_eq!(last.reason.as_deref(), Some("Role filled internally"));
    }

    #[test]
    fn test_terminal_states_reject_all_transitions() {
        for terminal in [
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Withdrawn,
        ] {
            let mut app = Application::new("job-1", "seeker-1");
            app.transition_to(terminal, "e", None).unwrap();

            for target in [
                ApplicationStatus::Pending,
                ApplicationStatus::Reviewed,
                ApplicationStatus::Shortlisted,
                ApplicationStatus::Rejected,
                ApplicationStatus::Accepted,
                ApplicationStatus::Withdrawn,
            ] {
                let err = app.transition_to(target, "e", None).unwrap_err();
                assert!(matches!(err, BoardError::InvalidTransition { .. }));
            }
        }
    }

    #[test]
    fn test_withdraw_from_pending() {
        let mut app = Application::new("job-1", "seeker-1");
        app.withdraw("seeker-1").unwrap();
        assert_eq!(app.status, ApplicationStatus::Withdrawn);
        let last = app.status_history.last().unwrap();
        assert_eq!(last.changed_by, "seeker-1");
    }

    #[test]
    fn test_withdraw_after_acceptance_fails() {
        let mut app = Application::new("job-1", "seeker-1");
        app.transition_to(ApplicationStatus::Accepted, "e", None)
            .unwrap();
        assert!(app.withdraw("seeker-1").is_err());
    }

    #[test]
    fn test_mark_viewed_is_first_read_only() {
        let mut app = Application::new("job-1", "seeker-1");
        app.mark_viewed();
        let first = app.viewed_at;
        assert!(app.is_viewed);
        assert!(first.is_some());

        app.mark_viewed();
        assert_eq!(app.viewed_at, first);
    }

    #[test]
    fn test_invalid_transition_error_names_states() {
        let mut app = Application::new("job-1", "seeker-1");
        app.transition_to(ApplicationStatus::Rejected, "e", None)
            .unwrap();
        let err = app
            .transition_to(ApplicationStatus::Accepted, "e", None)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("REJECTED"));
        assert!(message.contains("ACCEPTED"));
    }
}

mod rating_tests {
    use super::*;

    #[test]
    fn test_average_of_two_ratings() {
        assert_eq!(average_rating(&[3, 5]), 4.0);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        assert_eq!(average_rating(&[4, 4, 3]), 3.7);
        assert_eq!(average_rating(&[3, 3, 4]), 3.3);
        assert_eq!(average_rating(&[1, 2]), 1.5);
    }

    #[test]
    fn test_empty_ratings_average_to_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn test_rating_bounds_enforced() {
        assert!(Review::new("company-1", "user-1", 0).is_err());
        assert!(Review::new("company-1", "user-1", 6).is_err());
        assert!(Review::new("company-1", "user-1", 1).is_ok());
        assert!(Review::new("company-1", "user-1", 5).is_ok());
    }

    #[test]
    fn test_company_starts_unrated() {
        let company = Company::new("employer-1", "Acme");
        assert_eq!(company.average_rating, 0.0);
        assert_eq!(company.review_count, 0);
    }
}

mod serialization_tests {
    use super::*;

    #[test]
    fn test_job_serializes_camel_case_with_screaming_status() {
        let job = sample_job().with_salary(Salary {
            min: Some(100_000),
            max: None,
            currency: "USD".to_string(),
            period: SalaryPeriod::Yearly,
            visible: true,
        });

        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("\"_id\""));
        assert!(json.contains("\"postedBy\""));
        assert!(json.contains("\"PUBLISHED\""));
        assert!(json.contains("\"FULL_TIME\""));
        assert!(json.contains("\"YEARLY\""));
    }

    #[test]
    fn test_application_status_round_trips_through_json() {
        let mut app = Application::new("job-1", "seeker-1");
        app.transition_to(ApplicationStatus::Shortlisted, "e", None)
            .unwrap();

        let json = serde_json::to_string(&app).unwrap();
        assert!(json.contains("\"SHORTLISTED\""));

        let parsed: Application = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, ApplicationStatus::Shortlisted);
        assert_eq!(parsed.status_history.len(), 2);
    }

    #[test]
    fn test_user_email_is_lowercased() {
        let user = User::new(
            "Someone@Example.COM",
            "hash".to_string(),
            "Someone",
            UserRole::JobSeeker,
        );
        assert_eq!(user.email, "someone@example.com");
    }

    #[test]
    fn test_notification_kind_serialization() {
        let notification = Notification::new(
            "user-1",
            NotificationKind::JobClosed,
            "The role has been filled",
        );
        let json = serde_json::to_string(&notification).unwrap();
        assert!(json.contains("JOB_CLOSED"));
    }
}
