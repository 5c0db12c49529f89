//! Database connection management and SeaORM-backed repositories.

mod connections;

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod post_repo;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
mod postgres_repo;

pub use connections::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use connections::Database;
#[cfg(feature = "postgres")]
pub use post_repo::PostgresPostRepository;
#[cfg(feature = "postgres")]
pub use postgres_repo::{PostgresCategoryRepository, PostgresUserRepository};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
