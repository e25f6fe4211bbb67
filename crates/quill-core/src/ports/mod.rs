//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod repository;

pub use repository::{CategoryRepository, PostRepository, PostSearch, TagResolver};
