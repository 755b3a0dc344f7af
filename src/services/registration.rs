//! Account registration: uniqueness check, hashing, insert.

use crate::auth::{hash_blocking, CredentialHasher};
use crate::db::UserRepository;
use crate::error::{AppError, AppResult};
use crate::models::{AccountView, NewUser, Role};
use std::sync::Arc;
use tracing::{info, warn};

/// Already-validated registration input.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// The only writer of account records.
#[derive(Clone)]
pub struct RegistrationService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl RegistrationService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }

    /// Create an account. The email pre-check runs before hashing so rejected
    /// registrations cost nothing; the insert-time uniqueness violation is
    /// reported as the same [`AppError::DuplicateAccount`].
    pub async fn create_user(&self, input: NewRegistration) -> AppResult<AccountView> {
        let NewRegistration {
            name,
            email,
            password,
            role,
        } = input;

        if self.users.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "registration rejected: email already exists");
            return Err(AppError::DuplicateAccount);
        }

        let password_digest = hash_blocking(self.hasher.clone(), password).await?;

        let user = match self
            .users
            .insert(NewUser {
                name: &name,
                email: &email,
                password_digest: &password_digest,
                role,
            })
            .await
        {
            Ok(user) => user,
            Err(AppError::DuplicateAccount) => {
                warn!(email = %email, "registration rejected: email taken concurrently");
                return Err(AppError::DuplicateAccount);
            }
            Err(e) => return Err(e),
        };

        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user.into())
    }
}
