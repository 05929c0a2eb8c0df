//! Auth API Endpoints
//!
//! - POST /register - Create an account and issue a token
//! - POST /login    - Password login
//! - GET  /me       - Current user info

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use utoipa::ToSchema;

use crate::api::middleware::Authenticated;
use crate::domain::{User, UserRole};
use crate::error::BoardError;
use crate::repository::UserRepository;
use crate::service::{AuthService, PasswordService};

fn email_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

/// Register request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,

    /// Always "Bearer"
    pub token_type: String,

    /// Expiration time in seconds
    pub expires_in: i64,
}

/// Current user info response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

/// Auth service state
#[derive(Clone)]
pub struct AuthApiState {
    pub auth_service: Arc<AuthService>,
    pub user_repo: Arc<UserRepository>,
    pub password_service: Arc<PasswordService>,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AuthApiState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, BoardError> {
    if !email_regex().is_match(&req.email) {
        return Err(BoardError::validation("email is not valid"));
    }
    if req.name.trim().is_empty() {
        return Err(BoardError::validation("name is required"));
    }

    if state.user_repo.exists_by_email(&req.email).await? {
        return Err(BoardError::duplicate("User", "email", &req.email));
    }

    let password_hash = state.password_service.hash_password(&req.password)?;
    let user = User::new(&req.email, password_hash, &req.name, req.role);

    // Unique email index is the backstop under concurrent registrations.
    state.user_repo.insert(&user).await?;

    let access_token = state.auth_service.generate_access_token(&user)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth_service.token_expiry_secs(),
    }))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthApiState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, BoardError> {
    let user = state
        .user_repo
        .find_by_email(&req.email)
        .await?
        .ok_or(BoardError::InvalidCredentials)?;

    if !state
        .password_service
        .verify_password(&req.password, &user.password_hash)?
    {
        return Err(BoardError::InvalidCredentials);
    }

    if !user.active {
        return Err(BoardError::unauthorized("Account is not active"));
    }

    let access_token = state.auth_service.generate_access_token(&user)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth_service.token_expiry_secs(),
    }))
}

/// Get current user info
#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user info", body = CurrentUserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_current_user(auth: Authenticated) -> Json<CurrentUserResponse> {
    let ctx = auth.0;
    Json(CurrentUserResponse {
        id: ctx.user_id,
        email: ctx.email,
        name: ctx.name,
        role: ctx.role,
    })
}

/// Create the auth router
pub fn auth_router(state: AuthApiState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(get_current_user))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_deserialization() {
        let json = r#"{"email":"a@b.com","password":"secret123","name":"A","role":"EMPLOYER"}"#;
        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.email, "a@b.com");
        assert_eq!(req.role, UserRole::Employer);
    }

    #[test]
    fn test_token_response_serialization() {
        let response = TokenResponse {
            access_token: "token123".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("accessToken"));
        assert!(json.contains("expiresIn"));
    }

    #[test]
    fn test_email_regex() {
        assert!(email_regex().is_match("user@example.com"));
        assert!(!email_regex().is_match("not-an-email"));
        assert!(!email_regex().is_match("a b@c.com"));
    }
}
