//! Repositories: users.

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, Role, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::error;
use uuid::Uuid;

use super::DbPool;

/// Account storage. `insert` is the authority on email uniqueness and reports
/// a violation as [`AppError::DuplicateAccount`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>>;
    async fn insert(&self, user: NewUser<'_>) -> AppResult<UserRecord>;
}

// ---- Postgres ----

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_digest: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> AppResult<Self> {
        let role: Role = row.role.parse().map_err(|e| {
            error!(user_id = %row.id, error = %e, "stored role is not recognised");
            AppError::Internal(anyhow::anyhow!("user {}: {}", row.id, e))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_digest: row.password_digest,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, password_digest, role, created_at, updated_at";

fn db_error(op: &'static str, e: sqlx::Error) -> AppError {
    error!(op, error = %e, "database error");
    AppError::Db(e)
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("user_find_by_email", e))?;
        row.map(UserRecord::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("user_find_by_id", e))?;
        row.map(UserRecord::try_from).transpose()
    }

    async fn insert(&self, user: NewUser<'_>) -> AppResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_digest, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_digest)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // Reported to the caller, which logs the rejected registration.
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::DuplicateAccount
            }
            e => db_error("user_create", e),
        })?;
        UserRecord::try_from(row)
    }
}
