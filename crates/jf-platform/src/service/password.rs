//! Password Service
//!
//! Argon2id hashing and verification.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::{BoardError, Result};

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Default)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn hash_password(&self, password: &str) -> Result<String> {
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(BoardError::validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| BoardError::internal(format!("password hashing failed: {}", e)))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| BoardError::internal(format!("stored hash is malformed: {}", e)))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let svc = PasswordService::default();
        let hash = svc.hash_password("correct horse battery").unwrap();
        assert!(svc.verify_password("correct horse battery", &hash).unwrap());
        assert!(!svc.verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_short_password_rejected() {
        let svc = PasswordService::default();
        assert!(matches!(
            svc.hash_password("short").unwrap_err(),
            BoardError::Validation { .. }
        ));
    }
}
