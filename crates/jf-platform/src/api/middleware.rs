//! API Middleware
//!
//! Authentication extractors for Axum. The server installs `AppState` as a
//! request extension; the extractors validate the bearer token against it.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::common::ApiError;
use crate::service::{extract_bearer_token, AuthContext, AuthService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
}

fn unauthorized(message: &str) -> Response {
    let error = ApiError {
        error: "UNAUTHORIZED".to_string(),
        message: message.to_string(),
        details: None,
    };
    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for authenticated requests.
/// Validates the bearer token and yields the acting identity.
pub struct Authenticated(pub AuthContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = extract_bearer_token(auth_header)
            .ok_or_else(|| unauthorized("Invalid Authorization header format"))?;

        let app_state = parts.extensions.get::<AppState>().ok_or_else(|| {
            let error = ApiError {
                error: "INTERNAL_ERROR".to_string(),
                message: "AppState not found".to_string(),
                details: None,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
        })?;

        let claims = app_state
            .auth_service
            .validate_token(token)
            .map_err(|e| e.into_response())?;

        Ok(Authenticated(claims.into()))
    }
}

/// Extractor for optionally authenticated requests (public listings that
/// behave slightly differently for signed-in users).
pub struct OptionalAuth(pub Option<AuthContext>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = match parts.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            Some(h) => h,
            None => return Ok(OptionalAuth(None)),
        };

        let token = match extract_bearer_token(auth_header) {
            Some(t) => t,
            None => return Ok(OptionalAuth(None)),
        };

        let app_state = match parts.extensions.get::<AppState>() {
            Some(s) => s,
            None => return Ok(OptionalAuth(None)),
        };

        match app_state.auth_service.validate_token(token) {
            Ok(claims) => Ok(OptionalAuth(Some(claims.into()))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
