//! Argon2 password hashing (PHC string format).
//!
//! Hashing is CPU-bound; async callers go through [`hash_off_thread`] and
//! [`verify_off_thread`], which run it on tokio's blocking pool.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use super::IdentityError;

pub fn hash_password(plain: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| IdentityError::Hashing(e.to_string()))
}

pub async fn hash_off_thread(plain: String) -> Result<String, IdentityError> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| IdentityError::Hashing(format!("hashing task failed: {e}")))?
}

pub async fn verify_off_thread(plain: String, phc: String) -> Result<bool, IdentityError> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &phc))
        .await
        .map_err(|e| IdentityError::Hashing(format!("verification task failed: {e}")))
}

/// `false` for a wrong password or an unparsable stored hash.
pub fn verify_password(plain: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let phc = hash_password("secret1").unwrap();
        assert!(phc.starts_with("$argon2"));
        assert!(verify_password("secret1", &phc));
        assert!(!verify_password("secret2", &phc));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[tokio::test]
    async fn off_thread_helpers_match_sync_ones() {
        let phc = hash_off_thread("secret1".to_string()).await.unwrap();
        assert!(verify_off_thread("secret1".to_string(), phc.clone()).await.unwrap());
        assert!(!verify_off_thread("secret2".to_string(), phc).await.unwrap());
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("x", "not-a-phc-string"));
    }
}
