//! Data models for accounts.

pub mod user;

pub use user::*;
