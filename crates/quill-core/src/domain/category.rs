use super::check_length;
use crate::error::DomainError;

pub type CategoryId = i32;

pub const CATEGORY_NAME_MAX_CHARS: usize = 50;

/// Category entity - a pre-existing classification referenced by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn validate_name(name: &str) -> Result<(), DomainError> {
        check_length("category", name, CATEGORY_NAME_MAX_CHARS)
    }
}
