//! SeaORM entities for the PostgreSQL schema.

pub mod category;
pub mod comment;
pub mod post;
pub mod post_category;
pub mod user;
