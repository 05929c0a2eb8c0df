//! Application API Endpoints
//!
//! Submission, the employer review verbs, applicant withdrawal, and the
//! per-job listing for the posting employer.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::common::{PaginatedResponse, PaginationParams, SuccessResponse};
use crate::api::middleware::Authenticated;
use crate::domain::{Application, ApplicationStatus, StatusChange};
use crate::error::BoardError;
use crate::repository::{ApplicationRepository, JobRepository};
use crate::service::{ApplicationLifecycleService, NewApplication};

/// Submit application request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub job_id: String,

    #[serde(default)]
    pub cover_letter: Option<String>,

    #[serde(default)]
    pub resume_url: Option<String>,
}

/// Employer status update request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,

    /// Required context for rejections, optional elsewhere
    #[serde(default)]
    pub reason: Option<String>,
}

/// Rejection request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// One status history entry
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub status: ApplicationStatus,
    pub changed_at: String,
    pub changed_by: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<StatusChange> for StatusChangeResponse {
    fn from(change: StatusChange) -> Self {
        Self {
            status: change.status,
            changed_at: change.changed_at.to_rfc3339(),
            changed_by: change.changed_by,
            reason: change.reason,
        }
    }
}

/// Application response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: String,
    pub job_id: String,
    pub user_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,

    pub status: ApplicationStatus,
    pub status_history: Vec<StatusChangeResponse>,
    pub is_viewed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewed_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    pub created_at: String,
    pub updated_at: String,
}

impl From<Application> for ApplicationResponse {
    fn from(application: Application) -> Self {
        Self {
            id: application.id,
            job_id: application.job_id,
            user_id: application.user_id,
            company_id: application.company_id,
            cover_letter: application.cover_letter,
            resume_url: application.resume_url,
            status: application.status,
            status_history: application
                .status_history
                .into_iter()
                .map(StatusChangeResponse::from)
                .collect(),
            is_viewed: application.is_viewed,
            viewed_at: application.viewed_at.map(|d| d.to_rfc3339()),
            reviewed_at: application.reviewed_at.map(|d| d.to_rfc3339()),
            decision_at: application.decision_at.map(|d| d.to_rfc3339()),
            rejection_reason: application.rejection_reason,
            created_at: application.created_at.to_rfc3339(),
            updated_at: application.updated_at.to_rfc3339(),
        }
    }
}

/// Applications service state
#[derive(Clone)]
pub struct ApplicationsState {
    pub application_lifecycle: Arc<ApplicationLifecycleService>,
    pub application_repo: Arc<ApplicationRepository>,
    pub job_repo: Arc<JobRepository>,
}

/// Apply to a job
#[utoipa::path(
    post,
    path = "",
    tag = "applications",
    request_body = SubmitApplicationRequest,
    responses(
        (status = 200, description = "Application submitted", body = ApplicationResponse),
        (status = 400, description = "Job is not open for applications"),
        (status = 409, description = "Already applied to this job")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_application(
    State(state): State<ApplicationsState>,
    auth: Authenticated,
    Json(req): Json<SubmitApplicationRequest>,
) -> Result<Json<ApplicationResponse>, BoardError> {
    let input = NewApplication {
        job_id: req.job_id,
        cover_letter: req.cover_letter,
        resume_url: req.resume_url,
    };
    let application = state
        .application_lifecycle
        .submit_application(&auth.0, input)
        .await?;
    Ok(Json(application.into()))
}

/// List the caller's own applications
#[utoipa::path(
    get,
    path = "/my",
    tag = "applications",
    params(PaginationParams),
    responses(
        (status = 200, description = "Caller's applications", body = PaginatedResponse<ApplicationResponse>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_applications(
    State(state): State<ApplicationsState>,
    auth: Authenticated,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<ApplicationResponse>>, BoardError> {
    let total = state.application_repo.count_by_user(&auth.0.user_id).await?;
    let applications = state
        .application_repo
        .find_by_user(&auth.0.user_id, pagination.offset(), pagination.limit_i64())
        .await?;

    let data = applications.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page,
        pagination.limit,
        total,
    )))
}

/// List applications for a job (posting employer only)
#[utoipa::path(
    get,
    path = "/job/{job_id}",
    tag = "applications",
    params(
        ("job_id" = String, Path, description = "Job ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Applications for the job", body = PaginatedResponse<ApplicationResponse>),
        (status = 403, description = "Not the posting employer"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_job_applications(
    State(state): State<ApplicationsState>,
    auth: Authenticated,
    Path(job_id): Path<String>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<ApplicationResponse>>, BoardError> {
    let job = state
        .job_repo
        .find_by_id(&job_id)
        .await?
        .ok_or_else(|| BoardError::not_found("Job", &job_id))?;

    if !job.is_posted_by(&auth.0.user_id) {
        return Err(BoardError::forbidden(
            "Only the job's posting employer may list its applications",
        ));
    }

    let total = state.application_repo.count_by_job(&job_id).await?;
    let applications = state
        .application_repo
        .find_by_job(&job_id, pagination.offset(), pagination.limit_i64())
        .await?;

    let data = applications.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page,
        pagination.limit,
        total,
    )))
}

/// Get an application (applicant or posting employer)
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "applications",
    params(("id" = String, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application details", body = ApplicationResponse),
        (status = 403, description = "Not a party to this application"),
        (status = 404, description = "Application not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_application(
    State(state): State<ApplicationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApplicationResponse>, BoardError> {
    let application = state
        .application_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| BoardError::not_found("Application", &id))?;

    if application.user_id != auth.0.user_id {
        let job = state
            .job_repo
            .find_by_id(&application.job_id)
            .await?
            .ok_or_else(|| BoardError::not_found("Job", &application.job_id))?;
        if !job.is_posted_by(&auth.0.user_id) {
            return Err(BoardError::forbidden(
                "Only the applicant or the posting employer may view this application",
            ));
        }
    }

    Ok(Json(application.into()))
}

/// Update an application's status (posting employer only)
#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = "applications",
    params(("id" = String, Path, description = "Application ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApplicationResponse),
        (status = 409, description = "Transition not allowed from the current status")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_status(
    State(state): State<ApplicationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApplicationResponse>, BoardError> {
    let application = state
        .application_lifecycle
        .update_status(&id, req.status, &auth.0.user_id, req.reason)
        .await?;
    Ok(Json(application.into()))
}

/// Mark an application reviewed
#[utoipa::path(
    post,
    path = "/{id}/review",
    tag = "applications",
    params(("id" = String, Path, description = "Application ID")),
    responses((status = 200, description = "Application reviewed", body = ApplicationResponse)),
    security(("bearer_auth" = []))
)]
pub async fn review_application(
    State(state): State<ApplicationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApplicationResponse>, BoardError> {
    let application = state
        .application_lifecycle
        .review_application(&id, &auth.0.user_id)
        .await?;
    Ok(Json(application.into()))
}

/// Shortlist an application
#[utoipa::path(
    post,
    path = "/{id}/shortlist",
    tag = "applications",
    params(("id" = String, Path, description = "Application ID")),
    responses((status = 200, description = "Application shortlisted", body = ApplicationResponse)),
    security(("bearer_auth" = []))
)]
pub async fn shortlist_application(
    State(state): State<ApplicationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApplicationResponse>, BoardError> {
    let application = state
        .application_lifecycle
        .shortlist_application(&id, &auth.0.user_id)
        .await?;
    Ok(Json(application.into()))
}

/// Reject an application
#[utoipa::path(
    post,
    path = "/{id}/reject",
    tag = "applications",
    params(("id" = String, Path, description = "Application ID")),
    request_body = RejectRequest,
    responses((status = 200, description = "Application rejected", body = ApplicationResponse)),
    security(("bearer_auth" = []))
)]
pub async fn reject_application(
    State(state): State<ApplicationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<ApplicationResponse>, BoardError> {
    let application = state
        .application_lifecycle
        .reject_application(&id, &auth.0.user_id, req.reason)
        .await?;
    Ok(Json(application.into()))
}

/// Accept an application. The job is closed as part of acceptance.
#[utoipa::path(
    post,
    path = "/{id}/accept",
    tag = "applications",
    params(("id" = String, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application accepted", body = ApplicationResponse),
        (status = 409, description = "Transition not allowed from the current status")
    ),
    security(("bearer_auth" = []))
)]
pub async fn accept_application(
    State(state): State<ApplicationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApplicationResponse>, BoardError> {
    let application = state
        .application_lifecycle
        .accept_application(&id, &auth.0.user_id)
        .await?;
    Ok(Json(application.into()))
}

/// Withdraw the caller's application
#[utoipa::path(
    post,
    path = "/{id}/withdraw",
    tag = "applications",
    params(("id" = String, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application withdrawn", body = ApplicationResponse),
        (status = 403, description = "Not the applicant"),
        (status = 409, description = "Application already decided")
    ),
    security(("bearer_auth" = []))
)]
pub async fn withdraw_application(
    State(state): State<ApplicationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApplicationResponse>, BoardError> {
    let application = state
        .application_lifecycle
        .withdraw_application(&id, &auth.0.user_id)
        .await?;
    Ok(Json(application.into()))
}

/// Mark an application viewed (posting employer only)
#[utoipa::path(
    post,
    path = "/{id}/view",
    tag = "applications",
    params(("id" = String, Path, description = "Application ID")),
    responses((status = 200, description = "Marked viewed", body = SuccessResponse)),
    security(("bearer_auth" = []))
)]
pub async fn mark_viewed(
    State(state): State<ApplicationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, BoardError> {
    state
        .application_lifecycle
        .mark_viewed(&id, &auth.0.user_id)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Create the applications router
pub fn applications_router(state: ApplicationsState) -> Router {
    Router::new()
        .route("/", post(submit_application))
        .route("/my", get(list_my_applications))
        .route("/job/:job_id", get(list_job_applications))
        .route("/:id", get(get_application))
        .route("/:id/status", axum::routing::put(update_status))
        .route("/:id/review", post(review_application))
        .route("/:id/shortlist", post(shortlist_application))
        .route("/:id/reject", post(reject_application))
        .route("/:id/accept", post(accept_application))
        .route("/:id/withdraw", post(withdraw_application))
        .route("/:id/view", post(mark_viewed))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_deserialization() {
        let json = r#"{"jobId":"job-1","coverLetter":"Hi"}"#;
        let req: SubmitApplicationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.job_id, "job-1");
        assert_eq!(req.cover_letter.as_deref(), Some("Hi"));
        assert!(req.resume_url.is_none());
    }

    #[test]
    fn test_status_update_deserialization() {
        let json = r#"{"status":"SHORTLISTED"}"#;
        let req: UpdateStatusRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.status, ApplicationStatus::Shortlisted);
        assert!(req.reason.is_none());
    }

    #[test]
    fn test_response_includes_history() {
        let application = Application::new("job-1", "user-1");
        let response = ApplicationResponse::from(application);
        assert_eq!(response.status, ApplicationStatus::Pending);
        assert_eq!(response.status_history.len(), 1);
        assert_eq!(response.status_history[0].status, ApplicationStatus::Pending);
    }
}
