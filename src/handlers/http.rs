//! Shared application state and the health endpoint.

use axum::{http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

use crate::auth::{CookiePolicy, CredentialHasher, TokenIssuer};
use crate::db::UserRepository;
use crate::services::{AuthService, RegistrationService};

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub registration: RegistrationService,
    pub auth_service: AuthService,
    pub tokens: TokenIssuer,
    pub cookies: CookiePolicy,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: TokenIssuer,
        cookies: CookiePolicy,
    ) -> Self {
        Self {
            registration: RegistrationService::new(users.clone(), hasher.clone()),
            auth_service: AuthService::new(users.clone(), hasher),
            users,
            tokens,
            cookies,
        }
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }
    pub fn registration(&self) -> &RegistrationService {
        &self.registration
    }
    pub fn auth_service(&self) -> &AuthService {
        &self.auth_service
    }
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }
    pub fn cookies(&self) -> &CookiePolicy {
        &self.cookies
    }
}

/// GET /health: liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "accountd" })),
    )
}
