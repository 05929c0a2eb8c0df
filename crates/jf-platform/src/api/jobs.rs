//! Job API Endpoints
//!
//! Posting CRUD plus the lifecycle verbs (publish / unpublish / close) and
//! the deadline-expiry sweep. Listing and fetching published jobs is public;
//! everything else requires the posting employer.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::api::common::{PaginatedResponse, PaginationParams, SuccessResponse};
use crate::api::middleware::{Authenticated, OptionalAuth};
use crate::domain::{ExperienceLevel, Job, JobCounters, JobStatus, JobType, Salary};
use crate::error::BoardError;
use crate::repository::{JobFilter, JobRepository};
use crate::service::{JobLifecycleService, JobPatch, NewJob};

/// Create job request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,

    #[serde(default)]
    pub company_id: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub remote: bool,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub salary: Option<Salary>,

    #[serde(default)]
    pub application_deadline: Option<DateTime<Utc>>,

    /// Create as DRAFT instead of publishing immediately
    #[serde(default)]
    pub draft: bool,
}

/// Update job request. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub remote: Option<bool>,
    pub skills: Option<Vec<String>>,
    pub salary: Option<Salary>,
    pub application_deadline: Option<DateTime<Utc>>,
}

/// Job response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: String,
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

    pub remote: bool,
    pub skills: Vec<String>,

    /// Omitted when the employer marked the range as hidden
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<String>,

    pub status: JobStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,

    pub counters: JobCounters,
    pub created_at: String,
    pub updated_at: String,
}

impl JobResponse {
    /// Build a response. Hidden salary ranges are stripped unless the
    /// requester owns the posting.
    pub fn from_job(job: Job, owner_view: bool) -> Self {
        let salary = match job.salary {
            Some(ref s) if !s.visible && !owner_view => None,
            other => other.clone(),
        };
        Self {
            id: job.id,
            posted_by: job.posted_by,
            company_id: job.company_id,
            title: job.title,
            description: job.description,
            category: job.category,
            job_type: job.job_type,
            experience_level: job.experience_level,
            location: job.location,
            remote: job.remote,
            skills: job.skills,
            salary,
            application_deadline: job.application_deadline.map(|d| d.to_rfc3339()),
            status: job.status,
            published_at: job.published_at.map(|d| d.to_rfc3339()),
            closed_at: job.closed_at.map(|d| d.to_rfc3339()),
            counters: job.counters,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

/// Query parameters for the public job listing
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct JobsQuery {
    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_limit")]
    pub limit: u32,

    pub category: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub company_id: Option<String>,
    pub remote: Option<bool>,

    /// Full-text search over title, description and skills
    pub q: Option<String>,
}

/// Query parameters for the owner listing. Unlike the public listing,
/// a status filter is allowed here (drafts included).
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MyJobsQuery {
    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_limit")]
    pub limit: u32,

    pub status: Option<JobStatus>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// Result of the expiry sweep
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpireSweepResponse {
    /// Number of postings moved to EXPIRED
    pub expired: u64,
}

/// Jobs service state
#[derive(Clone)]
pub struct JobsState {
    pub job_lifecycle: Arc<JobLifecycleService>,
    pub job_repo: Arc<JobRepository>,
}

/// Create a job posting
#[utoipa::path(
    post,
    path = "",
    tag = "jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 200, description = "Job created", body = JobResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not an employer")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_job(
    State(state): State<JobsState>,
    auth: Authenticated,
    Json(req): Json<CreateJobRequest>,
) -> Result<Json<JobResponse>, BoardError> {
    let input = NewJob {
        title: req.title,
        description: req.description,
        category: req.category,
        job_type: req.job_type,
        experience_level: req.experience_level,
        company_id: req.company_id,
        location: req.location,
        remote: req.remote,
        skills: req.skills,
        salary: req.salary,
        application_deadline: req.application_deadline,
        draft: req.draft,
    };
    let job = state.job_lifecycle.create_job(input, &auth.0).await?;
    Ok(Json(JobResponse::from_job(job, true)))
}

/// List published jobs
#[utoipa::path(
    get,
    path = "",
    tag = "jobs",
    params(JobsQuery),
    responses(
        (status = 200, description = "List of published jobs", body = PaginatedResponse<JobResponse>)
    )
)]
pub async fn list_jobs(
    State(state): State<JobsState>,
    Query(query): Query<JobsQuery>,
) -> Result<Json<PaginatedResponse<JobResponse>>, BoardError> {
    let pagination = PaginationParams {
        page: query.page,
        limit: query.limit,
    };

    // Public search only ever sees live postings.
    let filter = JobFilter {
        status: Some(JobStatus::Published),
        category: query.category,
        job_type: query.job_type,
        experience_level: query.experience_level,
        company_id: query.company_id,
        posted_by: None,
        remote: query.remote,
        text: query.q,
    };

    let total = state.job_repo.count_filtered(&filter).await?;
    let jobs = state
        .job_repo
        .find_filtered(&filter, pagination.offset(), pagination.limit_i64())
        .await?;

    let data = jobs
        .into_iter()
        .map(|j| JobResponse::from_job(j, false))
        .collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page,
        pagination.limit,
        total,
    )))
}

/// List the caller's own postings, drafts included
#[utoipa::path(
    get,
    path = "/my",
    tag = "jobs",
    params(MyJobsQuery),
    responses(
        (status = 200, description = "Caller's job postings", body = PaginatedResponse<JobResponse>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_jobs(
    State(state): State<JobsState>,
    auth: Authenticated,
    Query(query): Query<MyJobsQuery>,
) -> Result<Json<PaginatedResponse<JobResponse>>, BoardError> {
    let pagination = PaginationParams {
        page: query.page,
        limit: query.limit,
    };

    let filter = JobFilter {
        status: query.status,
        posted_by: Some(auth.0.user_id.clone()),
        ..Default::default()
    };

    let total = state.job_repo.count_filtered(&filter).await?;
    let jobs = state
        .job_repo
        .find_filtered(&filter, pagination.offset(), pagination.limit_i64())
        .await?;

    let data = jobs
        .into_iter()
        .map(|j| JobResponse::from_job(j, true))
        .collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page,
        pagination.limit,
        total,
    )))
}

/// Get a job by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "jobs",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job details", body = JobResponse),
        (status = 404, description = "Job not found")
    )
)]
pub async fn get_job(
    State(state): State<JobsState>,
    auth: OptionalAuth,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, BoardError> {
    let job = state
        .job_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| BoardError::not_found("Job", &id))?;

    let owner_view = auth
        .0
        .as_ref()
        .map(|ctx| ctx.user_id == job.posted_by)
        .unwrap_or(false);

    // Drafts are invisible to everyone but their owner.
    if job.status == JobStatus::Draft && !owner_view {
        return Err(BoardError::not_found("Job", &id));
    }

    if !owner_view && job.status == JobStatus::Published {
        state.job_lifecycle.record_view(&id).await;
    }

    Ok(Json(JobResponse::from_job(job, owner_view)))
}

/// Update a job posting
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "jobs",
    params(("id" = String, Path, description = "Job ID")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Job updated", body = JobResponse),
        (status = 403, description = "Not the posting employer"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_job(
    State(state): State<JobsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<JobResponse>, BoardError> {
    let patch = JobPatch {
        title: req.title,
        description: req.description,
        category: req.category,
        location: req.location,
        remote: req.remote,
        skills: req.skills,
        salary: req.salary,
        application_deadline: req.application_deadline,
    };
    let job = state
        .job_lifecycle
        .update_job(&id, &auth.0.user_id, patch)
        .await?;
    Ok(Json(JobResponse::from_job(job, true)))
}

/// Delete a job posting
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "jobs",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job deleted", body = SuccessResponse),
        (status = 403, description = "Not the posting employer"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_job(
    State(state): State<JobsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, BoardError> {
    state.job_lifecycle.delete_job(&id, &auth.0.user_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Publish a draft
#[utoipa::path(
    post,
    path = "/{id}/publish",
    tag = "jobs",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job published", body = JobResponse),
        (status = 409, description = "Job is not a draft")
    ),
    security(("bearer_auth" = []))
)]
pub async fn publish_job(
    State(state): State<JobsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, BoardError> {
    let job = state
        .job_lifecycle
        .publish_job(&id, &auth.0.user_id)
        .await?;
    Ok(Json(JobResponse::from_job(job, true)))
}

/// Move a published job back to draft
#[utoipa::path(
    post,
    path = "/{id}/unpublish",
    tag = "jobs",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job unpublished", body = JobResponse),
        (status = 409, description = "Job is not published")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unpublish_job(
    State(state): State<JobsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, BoardError> {
    let job = state
        .job_lifecycle
        .unpublish_job(&id, &auth.0.user_id)
        .await?;
    Ok(Json(JobResponse::from_job(job, true)))
}

/// Close a job. Closing an already-closed job is a no-op.
#[utoipa::path(
    post,
    path = "/{id}/close",
    tag = "jobs",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job closed", body = JobResponse),
        (status = 403, description = "Not the posting employer"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn close_job(
    State(state): State<JobsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, BoardError> {
    let job = state.job_lifecycle.close_job(&id, &auth.0.user_id).await?;
    Ok(Json(JobResponse::from_job(job, true)))
}

/// Expire published jobs whose application deadline has passed
#[utoipa::path(
    post,
    path = "/maintenance/expire",
    tag = "jobs",
    responses(
        (status = 200, description = "Sweep completed", body = ExpireSweepResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn expire_overdue(
    State(state): State<JobsState>,
    _auth: Authenticated,
) -> Result<Json<ExpireSweepResponse>, BoardError> {
    let expired = state.job_lifecycle.expire_overdue_jobs(Utc::now()).await?;
    Ok(Json(ExpireSweepResponse { expired }))
}

/// Create the jobs router
pub fn jobs_router(state: JobsState) -> Router {
    Router::new()
        .route("/", post(create_job).get(list_jobs))
        .route("/my", get(list_my_jobs))
        .route("/maintenance/expire", post(expire_overdue))
        .route("/:id", get(get_job).put(update_job).delete(delete_job))
        .route("/:id/publish", post(publish_job))
        .route("/:id/unpublish", post(unpublish_job))
        .route("/:id/close", post(close_job))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SalaryPeriod;

    fn sample_job() -> Job {
        let mut job = Job::new(
            "user-1",
            "Backend Engineer",
            "Build services",
            "engineering",
            JobType::FullTime,
            ExperienceLevel::Mid,
        )
        .unwrap();
        job.salary = Some(Salary {
            min: Some(90_000),
            max: Some(120_000),
            currency: "USD".to_string(),
            period: SalaryPeriod::Yearly,
            visible: false,
        });
        job
    }

    #[test]
    fn test_hidden_salary_stripped_from_public_view() {
        let response = JobResponse::from_job(sample_job(), false);
        assert!(response.salary.is_none());
    }

    #[test]
    fn test_hidden_salary_kept_for_owner() {
        let response = JobResponse::from_job(sample_job(), true);
        assert!(response.salary.is_some());
    }

    #[test]
    fn test_create_request_defaults() {
        let json = r#"{
            "title": "T",
            "description": "D",
            "category": "eng",
            "jobType": "FULL_TIME",
            "experienceLevel": "MID"
        }"#;
        let req: CreateJobRequest = serde_json::from_str(json).unwrap();
        assert!(!req.draft);
        assert!(!req.remote);
        assert!(req.skills.is_empty());
    }
}
