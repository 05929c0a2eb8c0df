//! Platform Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Duplicate entity: {entity_type} with {field}={value}")]
    Duplicate { entity_type: String, field: String, value: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authorization error: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Invalid {entity_type} transition: {from} -> {to}")]
    InvalidTransition { entity_type: String, from: String, to: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BoardError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(entity_type: impl Into<String>, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn invalid_transition(
        entity_type: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            entity_type: entity_type.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Maps a mongodb duplicate-key write error (code 11000) onto the
    /// Duplicate variant so unique-index violations surface as 409s.
    pub fn from_insert(err: mongodb::error::Error, entity_type: &str, field: &str, value: &str) -> Self {
        if is_duplicate_key(&err) {
            Self::duplicate(entity_type, field, value)
        } else {
            Self::Database(err)
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Duplicate { .. } => "CONFLICT",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Unauthorized { .. }
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::InvalidToken { .. } => "UNAUTHORIZED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            _ => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Duplicate { .. } => StatusCode::CONFLICT,
            Self::Validation { .. } | Self::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. }
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000
    )
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let body = serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(BoardError::not_found("Job", "j1").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            BoardError::duplicate("Application", "jobId", "j1").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            BoardError::invalid_transition("Job", "CLOSED", "PUBLISHED").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(BoardError::forbidden("no").status(), StatusCode::FORBIDDEN);
        assert_eq!(BoardError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_transition_message() {
        let err = BoardError::invalid_transition("Application", "ACCEPTED", "WITHDRAWN");
        assert_eq!(
            err.to_string(),
            "Invalid Application transition: ACCEPTED -> WITHDRAWN"
        );
    }
}
