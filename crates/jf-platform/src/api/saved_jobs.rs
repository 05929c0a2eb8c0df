//! Saved Jobs API Endpoints
//!
//! Per-user bookmarks. Saving bumps the job's save counter; the unique
//! user+job index keeps double-saves at one.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

use crate::api::common::{PaginatedResponse, PaginationParams, SuccessResponse};
use crate::api::middleware::Authenticated;
use crate::domain::SavedJob;
use crate::error::BoardError;
use crate::repository::{JobStore, SavedJobStore};

/// Saved job response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedJobResponse {
    pub id: String,
    pub job_id: String,
    pub created_at: String,
}

impl From<SavedJob> for SavedJobResponse {
    fn from(saved: SavedJob) -> Self {
        Self {
            id: saved.id,
            job_id: saved.job_id,
            created_at: saved.created_at.to_rfc3339(),
        }
    }
}

/// Saved jobs service state
#[derive(Clone)]
pub struct SavedJobsState {
    pub saved_job_repo: Arc<dyn SavedJobStore>,
    pub job_repo: Arc<dyn JobStore>,
}

/// Save a job
#[utoipa::path(
    post,
    path = "/{job_id}",
    tag = "saved-jobs",
    params(("job_id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job saved", body = SavedJobResponse),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Already saved")
    ),
    security(("bearer_auth" = []))
)]
pub async fn save_job(
    State(state): State<SavedJobsState>,
    auth: Authenticated,
    Path(job_id): Path<String>,
) -> Result<Json<SavedJobResponse>, BoardError> {
    state
        .job_repo
        .find_by_id(&job_id)
        .await?
        .ok_or_else(|| BoardError::not_found("Job", &job_id))?;

    let saved = SavedJob::new(&auth.0.user_id, &job_id);
    state.saved_job_repo.insert(&saved).await?;
    if let Err(e) = state.job_repo.adjust_saves(&job_id, 1).await {
        warn!(job_id = %job_id, error = %e, "save counter update failed");
    }
    Ok(Json(saved.into()))
}

/// Remove a saved job
#[utoipa::path(
    delete,
    path = "/{job_id}",
    tag = "saved-jobs",
    params(("job_id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Saved job removed", body = SuccessResponse),
        (status = 404, description = "Job was not saved")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unsave_job(
    State(state): State<SavedJobsState>,
    auth: Authenticated,
    Path(job_id): Path<String>,
) -> Result<Json<SuccessResponse>, BoardError> {
    let removed = state
        .saved_job_repo
        .delete_by_user_and_job(&auth.0.user_id, &job_id)
        .await?;
    if !removed {
        return Err(BoardError::not_found("SavedJob", &job_id));
    }
    if let Err(e) = state.job_repo.adjust_saves(&job_id, -1).await {
        warn!(job_id = %job_id, error = %e, "save counter update failed");
    }
    Ok(Json(SuccessResponse::ok()))
}

/// List the caller's saved jobs
#[utoipa::path(
    get,
    path = "",
    tag = "saved-jobs",
    params(PaginationParams),
    responses(
        (status = 200, description = "Saved jobs", body = PaginatedResponse<SavedJobResponse>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_saved_jobs(
    State(state): State<SavedJobsState>,
    auth: Authenticated,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<SavedJobResponse>>, BoardError> {
    let total = state.saved_job_repo.count_by_user(&auth.0.user_id).await?;
    let saved = state
        .saved_job_repo
        .find_by_user(&auth.0.user_id, pagination.offset(), pagination.limit_i64())
        .await?;

    let data = saved.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page,
        pagination.limit,
        total,
    )))
}

/// Create the saved jobs router
pub fn saved_jobs_router(state: SavedJobsState) -> Router {
    Router::new()
        .route("/", get(list_saved_jobs))
        .route("/:job_id", post(save_job).delete(unsave_job))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExperienceLevel, Job, JobType, UserRole};
    use crate::error::Result;
    use crate::service::AuthContext;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MemorySavedJobs {
        saved: Mutex<Vec<SavedJob>>,
    }

    #[async_trait]
    impl SavedJobStore for MemorySavedJobs {
        async fn insert(&self, saved: &SavedJob) -> Result<()> {
            self.saved.lock().unwrap().push(saved.clone());
            Ok(())
        }

        async fn find_by_user(&self, user_id: &str, _skip: u64, _limit: i64) -> Result<Vec<SavedJob>> {
            Ok(self
                .saved
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn count_by_user(&self, user_id: &str) -> Result<u64> {
            Ok(self
                .saved
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.user_id == user_id)
                .count() as u64)
        }

        async fn delete_by_user_and_job(&self, user_id: &str, job_id: &str) -> Result<bool> {
            let mut saved = self.saved.lock().unwrap();
            let before = saved.len();
            saved.retain(|s| !(s.user_id == user_id && s.job_id == job_id));
            Ok(saved.len() < before)
        }
    }

    /// A job store whose counter updates always fail.
    struct BrokenCounterJobs {
        job: Job,
    }

    #[async_trait]
    impl JobStore for BrokenCounterJobs {
        async fn insert(&self, _job: &Job) -> Result<()> {
            Ok(())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Job>> {
            Ok((self.job.id == id).then(|| self.job.clone()))
        }

        async fn find_published_with_deadline(&self) -> Result<Vec<Job>> {
            Ok(vec![])
        }

        async fn update(&self, _job: &Job) -> Result<()> {
            Ok(())
        }

        async fn delete(&self, _id: &str) -> Result<bool> {
            Ok(false)
        }

        async fn increment_views(&self, _id: &str) -> Result<()> {
            Ok(())
        }

        async fn increment_applications(&self, _id: &str) -> Result<()> {
            Ok(())
        }

        async fn adjust_saves(&self, _id: &str, _delta: i64) -> Result<()> {
            Err(BoardError::internal("counter store offline"))
        }
    }

    fn seeker(user_id: &str) -> Authenticated {
        Authenticated(AuthContext {
            user_id: user_id.to_string(),
            email: format!("{user_id}@example.com"),
            name: "Test User".to_string(),
            role: UserRole::JobSeeker,
        })
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

    #[test]
    fn test_saved_job_response_conversion() {
        let saved = SavedJob::new("user-1", "job-1");
        let response = SavedJobResponse::from(saved);
        assert_eq!(response.job_id, "job-1");
    }

    #[tokio::test]
    async fn test_save_and_unsave_survive_counter_failure() {
        let job = sample_job();
        let job_id = job.id.clone();
        let state = SavedJobsState {
            saved_job_repo: Arc::new(MemorySavedJobs {
                saved: Mutex::new(vec![]),
            }),
            job_repo: Arc::new(BrokenCounterJobs { job }),
        };

        let saved = save_job(State(state.clone()), seeker("user-1"), Path(job_id.clone()))
            .await
            .unwrap();
        assert_eq!(saved.0.job_id, job_id);

        let removed = unsave_job(State(state), seeker("user-1"), Path(job_id))
            .await
            .unwrap();
        assert!(removed.0.success);
    }
}
