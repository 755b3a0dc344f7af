//! Account registration and session management built with Rust.
//!
//! Registers users with Argon2 password digests, issues one-day HS256 session
//! tokens and carries them in an HTTP-only, same-site strict cookie.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::http::AppState;
pub use services::{AuthService, RegistrationService};

use axum::routing::{get, post};
use handlers::http;

/// Build the API router (health, auth). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let auth_routes = axum::Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me));

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/auth", auth_routes)
        .with_state(state)
}
