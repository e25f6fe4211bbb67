//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`, backed by
//! SeaORM: tag resolution, category validation, post persistence and search.

pub mod database;

pub use database::{
    DatabaseConfig, DatabaseConnections, SeaOrmCategoryRepository, SeaOrmPostRepository,
    SeaOrmPostSearch, SeaOrmTagResolver,
};
