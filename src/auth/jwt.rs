//! Session token issue and verification (HS256 JWT).

use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::models::Role;

/// Lifetime of every issued token: one day.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Claim names the issuer writes itself; a payload may not use them.
const RESERVED_CLAIMS: [&str; 2] = ["iat", "exp"];

/// Payload the service puts in session tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub id: Uuid,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims<P> {
    #[serde(flatten)]
    pub payload: P,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies tokens with the process-wide secret it was built with.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn sign<P: Serialize>(&self, payload: &P) -> AppResult<String> {
        self.sign_at(payload, Utc::now())
    }

    /// Sign as if issued at `issued_at`; expiry is one day later.
    pub fn sign_at<P: Serialize>(&self, payload: &P, issued_at: DateTime<Utc>) -> AppResult<String> {
        if self.secret.is_empty() {
            error!("token signing secret is not configured");
            return Err(AppError::Signing("signing secret is not configured".to_string()));
        }
        let payload = serde_json::to_value(payload).map_err(|e| {
            error!(error = %e, "token payload is not serializable");
            AppError::Signing(e.to_string())
        })?;
        if let Some(claim) = payload
            .as_object()
            .and_then(|fields| RESERVED_CLAIMS.iter().find(|c| fields.contains_key(**c)))
        {
            error!(claim = %claim, "token payload uses a reserved claim name");
            return Err(AppError::Signing(format!("payload uses reserved claim `{claim}`")));
        }
        let claims = Claims {
            payload,
            iat: issued_at.timestamp(),
            exp: issued_at.timestamp() + TOKEN_TTL_SECS,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            error!(error = %e, "token signing failed");
            AppError::Signing(e.to_string())
        })
    }

    /// Returns the payload of a well-formed, correctly signed, unexpired token.
    pub fn verify<P: DeserializeOwned>(&self, token: &str) -> AppResult<P> {
        if self.secret.is_empty() {
            return Err(AppError::InvalidToken);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims<P>>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            debug!(reason = ?e.kind(), "token rejected");
            AppError::InvalidToken
        })?;
        Ok(data.claims.payload)
    }
}
