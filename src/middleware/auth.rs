//! Auth extractor: session token from the cookie, or a Bearer header.

use axum::http::header::AUTHORIZATION;
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::auth::{SessionPayload, SESSION_COOKIE};
use crate::error::AppError;
use crate::handlers::http::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extractor: verified session payload of the caller.
#[derive(Clone, Copy, Debug)]
pub struct AuthUser(pub SessionPayload);

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = state.cookies().read(&jar, SESSION_COOKIE).or_else(|| {
            parts
                .headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix(BEARER_PREFIX))
                .map(str::to_string)
        });
        let Some(token) = token else {
            debug!("request carries no session token");
            return Err(AppError::InvalidToken);
        };
        let session = state.tokens().verify::<SessionPayload>(&token)?;
        Ok(AuthUser(session))
    }
}
