//! bcrypt password hashing.
//!
//! Hashes carry their own random salt and cost factor. Verification never errors
//! into the caller: a stored hash that cannot be parsed is treated as a mismatch.

use tracing::warn;

use super::error::AuthError;

/// bcrypt only looks at the first 72 bytes of input
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Hash of a throwaway password, verified against when there is no real hash
    /// so that unknown accounts cost the same as known ones
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        let dummy_hash = bcrypt::hash("authgate-timing-equalizer", cost)
            .map_err(|e| AuthError::Internal(format!("bcrypt setup failed: {}", e)))?;
        Ok(Self { cost, dummy_hash })
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        bcrypt::hash(plaintext, self.cost)
            .map_err(|e| AuthError::Internal(format!("password hashing failed: {}", e)))
    }

    pub fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        match bcrypt::verify(plaintext, hashed) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "Stored password hash could not be verified");
                false
            }
        }
    }

    /// Burns one verification's worth of CPU; always returns false
    pub fn verify_dummy(&self, plaintext: &str) -> bool {
        let _ = bcrypt::verify(plaintext, &self.dummy_hash);
        false
    }

    /// Hashes on the blocking pool so the async runtime keeps serving requests
    pub async fn hash_async(&self, plaintext: String) -> Result<String, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {}", e)))?
    }

    /// `None` for `hashed` runs the dummy comparison and fails
    pub async fn verify_async(&self, plaintext: String, hashed: Option<String>) -> bool {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || match hashed {
            Some(hashed) => hasher.verify(&plaintext, &hashed),
            None => hasher.verify_dummy(&plaintext),
        })
        .await
        .unwrap_or(false)
    }
}
