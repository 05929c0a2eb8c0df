//! Auth Service
//!
//! HS256 bearer token issuance and validation.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{User, UserRole};
use crate::error::{BoardError, Result};

/// Auth configuration, read from the environment by the server binary.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_expiry_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            issuer: "jobforge".to_string(),
            audience: "jobforge".to_string(),
            access_token_expiry_secs: 3600,
        }
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// User id
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity resolved from a validated token, passed to lifecycle
/// operations as the acting principal.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl AuthContext {
    pub fn is_employer(&self) -> bool {
        self.role == UserRole::Employer
    }
}

impl From<AccessTokenClaims> for AuthContext {
    fn from(claims: AccessTokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        }
    }
}

pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn token_expiry_secs(&self) -> i64 {
        self.config.access_token_expiry_secs
    }

    pub fn generate_access_token(&self, user: &User) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now,
            exp: now + self.config.access_token_expiry_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| BoardError::internal(format!("token encoding failed: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<AccessTokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => BoardError::TokenExpired,
                _ => BoardError::InvalidToken {
                    message: e.to_string(),
                },
            })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AuthConfig {
            secret_key: "test-secret".to_string(),
            ..AuthConfig::default()
        })
    }

    #[test]
    fn test_token_round_trip() {
        let svc = service();
        let user = User::new("a@b.com", "hash", "A", UserRole::Employer);
        let token = svc.generate_access_token(&user).unwrap();
        let claims = svc.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, UserRole::Employer);
        assert_eq!(claims.email, "a@b.com");
    }

    #[test]
    fn test_garbage_token_rejected() {
        let svc = service();
        assert!(matches!(
            svc.validate_token("not-a-token").unwrap_err(),
            BoardError::InvalidToken { .. }
        ));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }
}
