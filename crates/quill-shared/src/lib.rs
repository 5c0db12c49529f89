//! # Quill Shared
//!
//! Shared types between frontend and backend.
//! In a full-stack Rust setup, this crate is compiled for both server and WASM:
//! the wire DTOs, the error body and the article search used by list views.

pub mod dto;
pub mod response;
pub mod search;

pub use response::{ErrorResponse, FieldErrorBody, MessageResponse};
pub use search::{Searchable, filter_by_term};
