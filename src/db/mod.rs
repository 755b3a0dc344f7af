//! Database layer: pool and user repositories.

mod memory;
mod pool;
mod repositories;

pub use memory::InMemoryUserRepository;
pub use pool::{create_pool, DbPool};
pub use repositories::{PgUserRepository, UserRepository};
