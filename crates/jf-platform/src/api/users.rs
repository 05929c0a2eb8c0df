//! User API Endpoints
//!
//! Public profile lookup and the self-service profile update.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::common::SuccessResponse;
use crate::api::middleware::Authenticated;
use crate::domain::{User, UserRole};
use crate::error::BoardError;
use crate::repository::UserRepository;

/// Update profile request. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// Public user profile
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: String,
    pub name: String,
    pub role: UserRole,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    pub skills: Vec<String>,
    pub created_at: String,
}

impl From<User> for UserProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            role: user.role,
            headline: user.headline,
            bio: user.bio,
            location: user.location,
            skills: user.skills,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Users service state
#[derive(Clone)]
pub struct UsersState {
    pub user_repo: Arc<UserRepository>,
}

/// Get a public user profile
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserProfileResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<UsersState>,
    Path(id): Path<String>,
) -> Result<Json<UserProfileResponse>, BoardError> {
    let user = state
        .user_repo
        .find_by_id(&id)
        .await?
        .filter(|u| u.active)
        .ok_or_else(|| BoardError::not_found("User", &id))?;
    Ok(Json(user.into()))
}

/// Update the caller's profile
#[utoipa::path(
    put,
    path = "/me",
    tag = "users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserProfileResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<UsersState>,
    auth: Authenticated,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfileResponse>, BoardError> {
    let mut user = state
        .user_repo
        .find_by_id(&auth.0.user_id)
        .await?
        .ok_or_else(|| BoardError::not_found("User", &auth.0.user_id))?;

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(BoardError::validation("name cannot be blank"));
        }
        user.name = name.trim().to_string();
    }
    if let Some(headline) = req.headline {
        user.headline = Some(headline);
    }
    if let Some(bio) = req.bio {
        user.bio = Some(bio);
    }
    if let Some(location) = req.location {
        user.location = Some(location);
    }
    if let Some(skills) = req.skills {
        user.skills = skills;
    }
    user.updated_at = Utc::now();

    state.user_repo.update(&user).await?;
    Ok(Json(user.into()))
}

/// Deactivate the caller's account
#[utoipa::path(
    delete,
    path = "/me",
    tag = "users",
    responses(
        (status = 200, description = "Account deactivated", body = SuccessResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_account(
    State(state): State<UsersState>,
    auth: Authenticated,
) -> Result<Json<SuccessResponse>, BoardError> {
    let mut user = state
        .user_repo
        .find_by_id(&auth.0.user_id)
        .await?
        .ok_or_else(|| BoardError::not_found("User", &auth.0.user_id))?;

    user.deactivate();
    state.user_repo.update(&user).await?;
    Ok(Json(SuccessResponse::with_message("Account deactivated")))
}

/// Create the users router
pub fn users_router(state: UsersState) -> Router {
    Router::new()
        .route("/me", put(update_profile).delete(deactivate_account))
        .route("/:id", get(get_user))
        .with_state(state)
}
