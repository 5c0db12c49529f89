//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Each repository keeps its records in a `HashMap` behind an async `RwLock`.
//! Checks that must be atomic with a write (uniqueness, comment append) run
//! under a single write guard. Data is lost on process restart.

mod categories;
mod posts;
mod users;

pub use categories::InMemoryCategoryRepository;
pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;
