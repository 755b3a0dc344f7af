//! Business logic: registration and sign-in.

pub mod auth;
pub mod registration;

pub use auth::AuthService;
pub use registration::{NewRegistration, RegistrationService};
