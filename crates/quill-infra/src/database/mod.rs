//! Database access: connection bootstrap, entities and the SeaORM
//! implementations of the `quill-core` ports.

mod categories;
mod connections;
mod posts;
mod search;
mod tags;

pub mod entity;

pub use categories::{SeaOrmCategoryRepository, validate_category};
pub use connections::{DatabaseConfig, DatabaseConnections};
pub use posts::SeaOrmPostRepository;
pub use search::{SeaOrmPostSearch, search_posts};
pub use tags::{SeaOrmTagResolver, resolve_tags};

use quill_core::{DomainError, RepoError};
use sea_orm::{DbErr, SqlErr};

/// Classify a SeaORM error as a storage failure.
pub(crate) fn storage_error(err: DbErr) -> DomainError {
    let repo_error = match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => RepoError::Constraint(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => RepoError::Constraint(msg),
        _ => match &err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                RepoError::Connection(err.to_string())
            }
            DbErr::RecordNotInserted => RepoError::NoRowsAffected("insert"),
            DbErr::RecordNotUpdated => RepoError::NoRowsAffected("update"),
            _ => RepoError::Query(err.to_string()),
        },
    };
    DomainError::Storage(repo_error)
}
