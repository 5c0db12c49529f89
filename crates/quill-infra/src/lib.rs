//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! This crate contains the database, in-memory store, auth and rate limiting integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory store only
//! - `postgres` - PostgreSQL store via SeaORM
//! - `rate-limit` - Rate limiting via governor

pub mod auth;
pub mod database;
pub mod memory;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports
pub use auth::{Argon2PasswordService, DEFAULT_JWT_SECRET, JwtConfig, JwtTokenService};
pub use database::DatabaseConfig;
pub use memory::{InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
pub use database::{
    PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository,
};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
