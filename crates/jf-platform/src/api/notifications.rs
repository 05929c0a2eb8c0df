//! Notification API Endpoints
//!
//! Read-side of the in-app notification feed. Writes happen inside the
//! lifecycle services; this surface only lists and marks read.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::api::common::{PaginatedResponse, PaginationParams, SuccessResponse};
use crate::api::middleware::Authenticated;
use crate::domain::{Notification, NotificationKind};
use crate::error::BoardError;
use crate::repository::NotificationRepository;

/// Query parameters for the notification feed
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsQuery {
    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Only return unread notifications
    #[serde(default)]
    pub unread_only: bool,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// Notification response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    pub read: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,

    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            kind: notification.kind,
            message: notification.message,
            job_id: notification.job_id,
            application_id: notification.application_id,
            company_id: notification.company_id,
            read: notification.read,
            read_at: notification.read_at.map(|d| d.to_rfc3339()),
            created_at: notification.created_at.to_rfc3339(),
        }
    }
}

/// Unread count response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread: u64,
}

/// Notifications service state
#[derive(Clone)]
pub struct NotificationsState {
    pub notification_repo: Arc<NotificationRepository>,
}

/// List the caller's notifications
#[utoipa::path(
    get,
    path = "",
    tag = "notifications",
    params(NotificationsQuery),
    responses(
        (status = 200, description = "Notification feed", body = PaginatedResponse<NotificationResponse>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    State(state): State<NotificationsState>,
    auth: Authenticated,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<PaginatedResponse<NotificationResponse>>, BoardError> {
    let pagination = PaginationParams {
        page: query.page,
        limit: query.limit,
    };

    let notifications = state
        .notification_repo
        .find_by_user(
            &auth.0.user_id,
            query.unread_only,
            pagination.offset(),
            pagination.limit_i64(),
        )
        .await?;
    let total = if query.unread_only {
        state.notification_repo.count_unread(&auth.0.user_id).await?
    } else {
        state.notification_repo.count_by_user(&auth.0.user_id).await?
    };

    let data = notifications.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page,
        pagination.limit,
        total,
    )))
}

/// Count the caller's unread notifications
#[utoipa::path(
    get,
    path = "/unread-count",
    tag = "notifications",
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unread_count(
    State(state): State<NotificationsState>,
    auth: Authenticated,
) -> Result<Json<UnreadCountResponse>, BoardError> {
    let unread = state.notification_repo.count_unread(&auth.0.user_id).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// Mark one notification read
#[utoipa::path(
    post,
    path = "/{id}/read",
    tag = "notifications",
    params(("id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = NotificationResponse),
        (status = 403, description = "Not the recipient"),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_read(
    State(state): State<NotificationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<NotificationResponse>, BoardError> {
    let mut notification = state
        .notification_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| BoardError::not_found("Notification", &id))?;

    if notification.user_id != auth.0.user_id {
        return Err(BoardError::forbidden(
            "Only the recipient may mark a notification read",
        ));
    }

    if !notification.read {
        notification.mark_read();
        state.notification_repo.update(&notification).await?;
    }
    Ok(Json(notification.into()))
}

/// Mark all of the caller's notifications read
#[utoipa::path(
    post,
    path = "/read-all",
    tag = "notifications",
    responses(
        (status = 200, description = "All notifications marked read", body = SuccessResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_all_read(
    State(state): State<NotificationsState>,
    auth: Authenticated,
) -> Result<Json<SuccessResponse>, BoardError> {
    let updated = state.notification_repo.mark_all_read(&auth.0.user_id).await?;
    Ok(Json(SuccessResponse::with_message(format!(
        "{updated} notifications marked read"
    ))))
}

/// Create the notifications router
pub fn notifications_router(state: NotificationsState) -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/:id/read", post(mark_read))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_response_conversion() {
        let mut notification = Notification::new(
            "user-1",
            NotificationKind::ApplicationReceived,
            "New application for Backend Engineer",
        )
        .with_job("job-1");
        notification.mark_read();

        let response = NotificationResponse::from(notification);
        assert_eq!(response.kind, NotificationKind::ApplicationReceived);
        assert_eq!(response.job_id.as_deref(), Some("job-1"));
        assert!(response.read);
        assert!(response.read_at.is_some());
    }
}
