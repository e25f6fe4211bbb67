//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use quill_core::ports::{PostRepository, PostSearch};
use quill_infra::{SeaOrmPostRepository, SeaOrmPostSearch};
use sea_orm::DbConn;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub posts: Arc<dyn PostRepository>,
    pub search: Arc<dyn PostSearch>,
    /// Upper bound on every storage call a handler makes.
    pub request_timeout: Duration,
}

impl AppState {
    /// Build the application state on top of an open connection pool.
    pub fn new(db: DbConn, request_timeout: Duration) -> Self {
        let posts: Arc<dyn PostRepository> = Arc::new(SeaOrmPostRepository::new(db.clone()));
        let search: Arc<dyn PostSearch> = Arc::new(SeaOrmPostSearch::new(db.clone()));

        tracing::info!("Application state initialized");

        Self {
            db,
            posts,
            search,
            request_timeout,
        }
    }
}
