//! # Quill Core
//!
//! The domain layer of the Quill blog backend.
//! Entities, ports, input validation and the content lifecycle services live here,
//! with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::{DomainError, RepoError};
