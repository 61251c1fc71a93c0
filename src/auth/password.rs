use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Stored password hash is malformed")]
    MalformedHash,

    #[error("Hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hash with Argon2id and a fresh random salt, returning the PHC string
pub fn hash(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

pub fn verify(password: &str, encoded: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(encoded).map_err(|_| PasswordError::MalformedHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// [`hash`] on the blocking pool
pub async fn hash_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash(&password)).await?
}

/// [`verify`] on the blocking pool
pub async fn verify_blocking(password: String, encoded: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify(&password, &encoded)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_and_are_salted() {
        let first = hash("hunter22").unwrap();
        let second = hash("hunter22").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(verify("hunter22", &first).unwrap());
        assert!(!verify("hunter23", &first).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(verify("x", "not-a-hash"), Err(PasswordError::MalformedHash)));
    }

    #[tokio::test]
    async fn blocking_wrappers_round_trip() {
        let encoded = hash_blocking("steeped".to_string()).await.unwrap();
        assert!(verify_blocking("steeped".to_string(), encoded).await.unwrap());
    }
}
