//! Argon2id credentials. Both operations run on the blocking pool.

use argon2::{
    password_hash::{self, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rand::rngs::OsRng;

use crate::errors::AppError;

pub async fn hash_password(plain: &str) -> Result<String, AppError> {
    let plain = plain.to_owned();
    on_blocking_pool(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
    })
    .await
}

/// `Ok(false)` only for a wrong password; an unreadable stored hash is an error.
pub async fn verify_password(plain: &str, stored: &str) -> Result<bool, AppError> {
    let (plain, stored) = (plain.to_owned(), stored.to_owned());
    on_blocking_pool(move || {
        let parsed = PasswordHash::new(&stored)
            .map_err(|e| AppError::Internal(format!("stored password hash is unreadable: {e}")))?;
        match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::Internal(format!("failed to verify password: {e}"))),
        }
    })
    .await
}

async fn on_blocking_pool<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("password task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_verifies_only_the_hashed_password() {
        let hash = hash_password("secret1").await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret1", &hash).await.unwrap());
        assert!(!verify_password("secret2", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn same_password_gets_a_fresh_salt() {
        let first = hash_password("secret1").await.unwrap();
        let second = hash_password("secret1").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn unreadable_stored_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("secret1", "not-a-phc-string").await,
            Err(AppError::Internal(_))
        ));
    }
}
