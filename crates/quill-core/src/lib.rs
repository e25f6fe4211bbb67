//! # Quill Core
//!
//! The domain layer of the Quill blog API.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! the post/tag/category entities, their field limits, the error taxonomy and
//! the ports that storage adapters implement.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};
