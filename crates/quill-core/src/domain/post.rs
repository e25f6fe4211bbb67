use chrono::{DateTime, Duration, SubsecRound, Utc};

use super::{Category, Tag, check_length, normalize_tag_names};
use crate::error::DomainError;

pub type PostId = i32;

pub const TITLE_MAX_CHARS: usize = 150;
pub const CONTENT_MAX_CHARS: usize = 2000;

/// Post entity - a blog post hydrated with its tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    /// Name of the referenced category; `None` when unset or cleared.
    pub category: Option<String>,
    /// Attached tags, ordered by name.
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.name.clone()).collect()
    }
}

/// Data required to create a new [`Post`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// The category to validate, if the client supplied a non-empty one.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    /// Check field limits and return the de-duplicated tag names.
    pub fn validate(&self) -> Result<Vec<String>, DomainError> {
        check_length("title", &self.title, TITLE_MAX_CHARS)?;
        check_length("content", &self.content, CONTENT_MAX_CHARS)?;
        if let Some(category) = self.category() {
            Category::validate_name(category)?;
        }
        normalize_tag_names(&self.tags)
    }
}

/// Partial update of a [`Post`].
///
/// Absent and empty fields leave the stored value untouched. Tags are merged
/// into the existing set, never replacing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl PostChanges {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.title().is_none()
            && self.content().is_none()
            && self.category().is_none()
            && self.tags().is_empty()
    }

    /// Check the limits of every supplied field and return the
    /// de-duplicated tag names to merge.
    pub fn validate(&self) -> Result<Vec<String>, DomainError> {
        if let Some(title) = self.title() {
            check_length("title", title, TITLE_MAX_CHARS)?;
        }
        if let Some(content) = self.content() {
            check_length("content", content, CONTENT_MAX_CHARS)?;
        }
        if let Some(category) = self.category() {
            Category::validate_name(category)?;
        }
        normalize_tag_names(self.tags())
    }
}

/// Current time at the precision every supported engine can store.
pub fn now_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// The `updated_at` value for a write following one stamped `previous`.
///
/// Always strictly later than `previous`, even when the clock has not moved
/// past it at storage precision.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_timestamp();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_post_within_limits_is_valid() {
        let post = NewPost::new("Hello", "World")
            .with_category("Tech")
            .with_tags(["go", "web", "go"]);

        let tags = post.validate().unwrap();
        assert_eq!(tags, vec!["go".to_string(), "web".to_string()]);
    }

    #[test]
    fn title_and_content_are_required() {
        assert!(matches!(
            NewPost::new("", "body").validate(),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            NewPost::new("title", "").validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        let title = "é".repeat(TITLE_MAX_CHARS);
        assert!(NewPost::new(title, "body").validate().is_ok());

        let title = "a".repeat(TITLE_MAX_CHARS + 1);
        let err = NewPost::new(title, "body").validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: title exceeds 150 characters."
        );

        let content = "a".repeat(CONTENT_MAX_CHARS + 1);
        assert!(NewPost::new("t", content).validate().is_err());
    }

    #[test]
    fn empty_category_counts_as_absent() {
        let post = NewPost::new("t", "c").with_category("");
        assert_eq!(post.category(), None);
        assert!(post.validate().is_ok());
    }

    #[test]
    fn changes_ignore_empty_fields() {
        let changes = PostChanges {
            title: Some(String::new()),
            content: Some("new text".into()),
            category: Some(String::new()),
            tags: Some(vec![]),
        };

        assert_eq!(changes.title(), None);
        assert_eq!(changes.content(), Some("new text"));
        assert_eq!(changes.category(), None);
        assert!(changes.tags().is_empty());
        assert!(!changes.is_empty());
        assert!(PostChanges::default().is_empty());
    }

    #[test]
    fn changes_validate_only_supplied_fields() {
        let changes = PostChanges {
            title: Some("x".repeat(TITLE_MAX_CHARS + 1)),
            ..Default::default()
        };
        assert!(changes.validate().is_err());

        let changes = PostChanges {
            tags: Some(vec!["go".into(), "go".into()]),
            ..Default::default()
        };
        assert_eq!(changes.validate().unwrap(), vec!["go".to_string()]);
    }

    #[test]
    fn next_timestamp_is_strictly_later() {
        let future = now_timestamp() + Duration::seconds(60);
        assert_eq!(next_timestamp(future), future + Duration::microseconds(1));

        let past = now_timestamp() - Duration::seconds(60);
        assert!(next_timestamp(past) > past);
    }
}
