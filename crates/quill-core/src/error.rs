//! Domain-level error types.

use thiserror::Error;

/// Domain errors - the three failure kinds every component reports.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed, oversized or dangling input (e.g. an unknown category).
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found: {entity_type} {key}")]
    NotFound { entity_type: &'static str, key: String },

    /// The backing store failed.
    #[error("Storage failure: {0}")]
    Storage(#[from] RepoError),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            key: key.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A mutation that must touch a row reported zero affected rows.
    #[error("No rows affected while writing {0}")]
    NoRowsAffected(&'static str),
}
