//! Domain entities - the core business objects.

mod category;
mod post;
mod tag;

pub use category::{CATEGORY_NAME_MAX_CHARS, Category, CategoryId};
pub use post::{
    CONTENT_MAX_CHARS, NewPost, Post, PostChanges, PostId, TITLE_MAX_CHARS, next_timestamp,
    now_timestamp,
};
pub use tag::{TAG_NAME_MAX_CHARS, Tag, TagId, normalize_tag_names};

use crate::error::DomainError;

/// Rejects empty values and values longer than `max` characters.
pub(crate) fn check_length(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty.")));
    }
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} exceeds {max} characters."
        )));
    }
    Ok(())
}
