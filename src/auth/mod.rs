//! Authentication: password hashing, session tokens, cookie policy, handlers.

mod cookie;
mod handlers;
mod jwt;
mod password;

pub use cookie::{CookieAttributes, CookieOverrides, CookiePolicy, SESSION_COOKIE};
pub use handlers::{login, logout, me, register, LoginRequest, RegisterRequest};
pub use jwt::{Claims, SessionPayload, TokenIssuer, TOKEN_TTL_SECS};
pub use password::{hash_blocking, verify_blocking, Argon2Hasher, CredentialHasher};
