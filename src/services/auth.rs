//! Sign-in: check an email/password pair against the stored digest.

use crate::auth::{hash_blocking, verify_blocking, CredentialHasher};
use crate::db::UserRepository;
use crate::error::{AppError, AppResult};
use crate::models::AccountView;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

const DUMMY_PASSWORD: &str = "accountd-unknown-email";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
    // Verified against on unknown emails so both failures cost one Argon2 run.
    dummy_digest: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            users,
            hasher,
            dummy_digest: Arc::new(OnceCell::new()),
        }
    }

    /// Unknown email and wrong password both yield [`AppError::InvalidCredentials`].
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<AccountView> {
        let Some(user) = self.users.find_by_email(email).await? else {
            self.verify_against_dummy(password).await;
            warn!(email = %email, "sign-in failed: unknown email");
            return Err(AppError::InvalidCredentials);
        };

        let matched = verify_blocking(
            self.hasher.clone(),
            password.to_string(),
            user.password_digest.clone(),
        )
        .await;
        if !matched {
            warn!(user_id = %user.id, "sign-in failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user signed in");
        Ok(user.into())
    }

    async fn verify_against_dummy(&self, password: &str) {
        let digest = self
            .dummy_digest
            .get_or_try_init(|| hash_blocking(self.hasher.clone(), DUMMY_PASSWORD.to_string()))
            .await;
        if let Ok(digest) = digest {
            verify_blocking(self.hasher.clone(), password.to_string(), digest.clone()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Argon2Hasher;
    use crate::db::InMemoryUserRepository;
    use crate::models::{NewUser, Role};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts `verify` calls and delegates to Argon2.
    #[derive(Default)]
    struct CountingHasher {
        verifies: AtomicUsize,
    }

    impl CredentialHasher for CountingHasher {
        fn hash(&self, plaintext: &str) -> AppResult<String> {
            Argon2Hasher.hash(plaintext)
        }

        fn verify(&self, plaintext: &str, digest: &str) -> bool {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            Argon2Hasher.verify(plaintext, digest)
        }
    }

    async fn seeded(hasher: Arc<dyn CredentialHasher>) -> AuthService {
        let repo = InMemoryUserRepository::new();
        let digest = Argon2Hasher.hash("mypassword").unwrap();
        repo.insert(NewUser {
            name: "A",
            email: "a@x.com",
            password_digest: &digest,
            role: Role::Admin,
        })
        .await
        .unwrap();
        AuthService::new(Arc::new(repo), hasher)
    }

    #[tokio::test]
    async fn correct_password_signs_in() {
        let view = seeded(Arc::new(Argon2Hasher))
            .await
            .authenticate("a@x.com", "mypassword")
            .await
            .unwrap();
        assert_eq!(view.email, "a@x.com");
        assert_eq!(view.role, Role::Admin);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let service = seeded(Arc::new(Argon2Hasher)).await;
        assert!(matches!(
            service.authenticate("a@x.com", "wrong").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            service.authenticate("b@x.com", "mypassword").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn unknown_email_still_runs_one_verification() {
        let hasher = Arc::new(CountingHasher::default());
        let service = seeded(hasher.clone()).await;

        assert!(service.authenticate("a@x.com", "wrong").await.is_err());
        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 1);

        assert!(service.authenticate("b@x.com", "mypassword").await.is_err());
        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 2);

        assert!(service.authenticate("c@x.com", "mypassword").await.is_err());
        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 3);
    }
}
