//! Auth HTTP handlers: register, login, logout, me.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::warn;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::{CookieOverrides, SessionPayload, SESSION_COOKIE};
use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::middleware::auth::AuthUser;
use crate::models::{AccountView, Role};
use crate::services::NewRegistration;

// Missing fields deserialize as empty strings so the validator reports them.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl RegisterRequest {
    /// Validate every field, collecting all failures.
    pub fn into_registration(self) -> Result<NewRegistration, ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let role = match self.role.as_deref() {
            None => Some(Role::default()),
            Some(raw) => raw.parse::<Role>().ok(),
        };
        if role.is_none() {
            let mut error = ValidationError::new("role");
            error.message = Some("must be one of: user, admin".into());
            errors.add("role", error);
        }

        match role {
            Some(role) if errors.errors().is_empty() => Ok(NewRegistration {
                name: self.name,
                email: self.email,
                password: self.password,
                role,
            }),
            _ => {
                let mut fields: Vec<String> =
                    errors.field_errors().keys().map(|f| f.to_string()).collect();
                fields.sort();
                warn!(fields = ?fields, "registration rejected: invalid input");
                Err(errors)
            }
        }
    }
}

/// A body that is not a JSON object of the expected shape, reported under `body`.
fn unreadable_body(rejection: JsonRejection) -> AppError {
    let reason = rejection.body_text();
    warn!(reason = %reason, "registration rejected: unreadable body");
    let mut error = ValidationError::new("body");
    error.message = Some(reason.into());
    let mut errors = ValidationErrors::new();
    errors.add("body", error);
    AppError::Validation(errors)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn issue_session(
    state: &AppState,
    jar: CookieJar,
    account: &AccountView,
) -> Result<CookieJar, AppError> {
    let token = state.tokens().sign(&SessionPayload {
        id: account.id,
        role: account.role,
    })?;
    Ok(state
        .cookies()
        .attach(jar, SESSION_COOKIE, token, CookieOverrides::default()))
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<AccountView>), AppError> {
    let Json(body) = body.map_err(unreadable_body)?;
    let input = body.into_registration()?;
    let account = state.registration().create_user(input).await?;
    let jar = issue_session(&state, jar, &account)?;
    Ok((StatusCode::CREATED, jar, Json(account)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AccountView>), AppError> {
    let account = state
        .auth_service()
        .authenticate(&body.email, &body.password)
        .await?;
    let jar = issue_session(&state, jar, &account)?;
    Ok((jar, Json(account)))
}

/// POST /auth/logout. Drops the client's copy; the token itself stays valid until it expires.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (StatusCode, CookieJar) {
    let jar = state
        .cookies()
        .clear(jar, SESSION_COOKIE, CookieOverrides::default());
    (StatusCode::NO_CONTENT, jar)
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> Result<Json<AccountView>, AppError> {
    let user = state
        .users()
        .find_by_id(session.id)
        .await?
        .ok_or(AppError::InvalidToken)?;
    Ok(Json(user.into()))
}
