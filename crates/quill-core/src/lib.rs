//! # Quill Core
//!
//! The domain layer of the Quill blog platform.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, ports, validation rules, the authorization policy and the services
//! that tie them together.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::DomainError;
