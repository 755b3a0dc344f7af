//! Password hashing (Argon2id, PHC strings).

use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::Arc;
use tracing::{debug, error};

// 19 MiB, 2 passes, 1 lane: roughly the latency of bcrypt at cost 10.
const M_COST_KIB: u32 = 19 * 1024;
const T_COST: u32 = 2;
const P_COST: u32 = 1;

/// One-way transform of plaintext passwords into storable digests.
pub trait CredentialHasher: Send + Sync {
    /// Salted digest of `plaintext`. Failure is fatal to the caller.
    fn hash(&self, plaintext: &str) -> AppResult<String>;

    /// `false` on mismatch and on a digest that cannot be parsed.
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    fn argon2(&self) -> Result<Argon2<'static>, argon2::Error> {
        let params = Params::new(M_COST_KIB, T_COST, P_COST, None)?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = self.argon2().map_err(|e| {
            error!(error = %e, "argon2 parameters rejected");
            AppError::Hashing(e.to_string())
        })?;
        let digest = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "password hashing failed");
                AppError::Hashing(e.to_string())
            })?
            .to_string();
        Ok(digest)
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "stored digest is not a PHC string");
                return false;
            }
        };
        // The digest carries its own parameters; the verifier reads them from there.
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Run [`CredentialHasher::hash`] on the blocking pool so Argon2 never stalls a runtime worker.
pub async fn hash_blocking(
    hasher: Arc<dyn CredentialHasher>,
    plaintext: String,
) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
        .await
        .map_err(|e| {
            error!(error = %e, "password hashing task failed");
            AppError::Hashing(e.to_string())
        })?
}

/// Run [`CredentialHasher::verify`] on the blocking pool. A failed task counts as a mismatch.
pub async fn verify_blocking(
    hasher: Arc<dyn CredentialHasher>,
    plaintext: String,
    digest: String,
) -> bool {
    match tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &digest)).await {
        Ok(matched) => matched,
        Err(e) => {
            error!(error = %e, "password verification task failed");
            false
        }
    }
}
