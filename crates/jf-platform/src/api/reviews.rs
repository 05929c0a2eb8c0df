//! Review API Endpoints
//!
//! Company reviews and the rating recompute they trigger. Reading reviews
//! is public; writing requires an account, and citing a job requires an
//! accepted application for it.

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
use crate::domain::Review;
use crate::error::BoardError;
use crate::repository::ReviewRepository;
use crate::service::{NewReview, RatingService, ReviewPatch};

/// Create review request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub company_id: String,

    /// 1 to 5 inclusive
    pub rating: i32,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    /// Job the reviewer was hired for, when cited
    #[serde(default)]
    pub job_id: Option<String>,
}

/// Update review request. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub comment: Option<String>,
}

/// Review response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub company_id: String,
    pub user_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    pub rating: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    pub created_at: String,
    pub updated_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            company_id: review.company_id,
            user_id: review.user_id,
            job_id: review.job_id,
            rating: review.rating,
            title: review.title,
            comment: review.comment,
            created_at: review.created_at.to_rfc3339(),
            updated_at: review.updated_at.to_rfc3339(),
        }
    }
}

/// Reviews service state
#[derive(Clone)]
pub struct ReviewsState {
    pub rating_service: Arc<RatingService>,
    pub review_repo: Arc<ReviewRepository>,
}

/// Submit a company review
#[utoipa::path(
    post,
    path = "",
    tag = "reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Rating out of range"),
        (status = 403, description = "Cited job has no accepted application"),
        (status = 409, description = "Already reviewed this company")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_review(
    State(state): State<ReviewsState>,
    auth: Authenticated,
    Json(req): Json<CreateReviewRequest>,
) -> Result<Json<ReviewResponse>, BoardError> {
    let input = NewReview {
        company_id: req.company_id,
        rating: req.rating,
        title: req.title,
        comment: req.comment,
        job_id: req.job_id,
    };
    let review = state.rating_service.create_review(&auth.0, input).await?;
    Ok(Json(review.into()))
}

/// List reviews for a company
#[utoipa::path(
    get,
    path = "/company/{company_id}",
    tag = "reviews",
    params(
        ("company_id" = String, Path, description = "Company ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Reviews for the company", body = PaginatedResponse<ReviewResponse>)
    )
)]
pub async fn list_company_reviews(
    State(state): State<ReviewsState>,
    Path(company_id): Path<String>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<ReviewResponse>>, BoardError> {
    let total = state.review_repo.count_by_company(&company_id).await?;
    let reviews = state
        .review_repo
        .find_by_company(&company_id, pagination.offset(), pagination.limit_i64())
        .await?;

    let data = reviews.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page,
        pagination.limit,
        total,
    )))
}

/// Get a review by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "reviews",
    params(("id" = String, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review details", body = ReviewResponse),
        (status = 404, description = "Review not found")
    )
)]
pub async fn get_review(
    State(state): State<ReviewsState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewResponse>, BoardError> {
    let review = state
        .review_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| BoardError::not_found("Review", &id))?;
    Ok(Json(review.into()))
}

/// Update the caller's review
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "reviews",
    params(("id" = String, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 403, description = "Not the reviewer"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_review(
    State(state): State<ReviewsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, BoardError> {
    let patch = ReviewPatch {
        rating: req.rating,
        title: req.title,
        comment: req.comment,
    };
    let review = state
        .rating_service
        .update_review(&id, &auth.0.user_id, patch)
        .await?;
    Ok(Json(review.into()))
}

/// Delete the caller's review
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "reviews",
    params(("id" = String, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review deleted", body = SuccessResponse),
        (status = 403, description = "Not the reviewer"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_review(
    State(state): State<ReviewsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, BoardError> {
    state
        .rating_service
        .delete_review(&id, &auth.0.user_id)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Create the reviews router
pub fn reviews_router(state: ReviewsState) -> Router {
    Router::new()
        .route("/", post(create_review))
        .route("/company/:company_id", get(list_company_reviews))
        .route(
            "/:id",
            get(get_review).put(update_review).delete(delete_review),
        )
        .with_state(state)
}
