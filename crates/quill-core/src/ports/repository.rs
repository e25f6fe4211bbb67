use async_trait::async_trait;

use crate::domain::{Category, NewPost, Post, PostChanges, PostId, Tag};
use crate::error::DomainError;

/// Turns tag names into persisted tags, creating the missing ones.
#[async_trait]
pub trait TagResolver: Send + Sync {
    /// Resolve `names` into tags without duplicates, in first-seen order.
    async fn resolve(&self, names: &[String]) -> Result<Vec<Tag>, DomainError>;
}

/// Category lookups. Categories are never created by post operations.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Confirm a category with exactly this name exists.
    async fn validate(&self, name: &str) -> Result<Category, DomainError>;

    /// Register a new category.
    async fn create(&self, name: &str) -> Result<Category, DomainError>;

    /// Remove a category, clearing the reference on every post that used it.
    async fn remove(&self, name: &str) -> Result<(), DomainError>;
}

/// Post persistence, including tag associations.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError>;

    async fn find_by_id(&self, id: PostId) -> Result<Post, DomainError>;

    /// All posts in primary-key order.
    async fn find_all(&self) -> Result<Vec<Post>, DomainError>;

    /// Apply a partial update; supplied tags are merged into the existing set.
    async fn update(&self, id: PostId, changes: PostChanges) -> Result<Post, DomainError>;

    /// Delete a post and its tag associations. Tags themselves are kept.
    async fn delete(&self, id: PostId) -> Result<(), DomainError>;
}

/// Case-insensitive substring search over posts and their relations.
#[async_trait]
pub trait PostSearch: Send + Sync {
    /// Posts whose title, content, category name or any tag name contains
    /// `term`. An empty result is reported as [`DomainError::NotFound`].
    async fn search(&self, term: &str) -> Result<Vec<Post>, DomainError>;
}
