//! Data Transfer Objects - request/response types for the API.
//!
//! Request bodies are decoded strictly: unknown fields are rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Body of `PUT /posts/{id}`. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Query string of `GET /posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListPostsQuery {
    pub term: Option<String>,
}

/// External representation of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    /// Empty when the post has no category.
    pub category: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_rejects_unknown_fields() {
        let body = r#"{"title":"t","content":"c","author":"me"}"#;
        assert!(serde_json::from_str::<CreatePostRequest>(body).is_err());
    }

    #[test]
    fn create_request_optional_fields_default() {
        let req: CreatePostRequest =
            serde_json::from_str(r#"{"title":"Hello","content":"World"}"#).unwrap();
        assert_eq!(req.category, None);
        assert_eq!(req.tags, None);
    }

    #[test]
    fn update_request_accepts_any_subset() {
        let req: UpdatePostRequest = serde_json::from_str(r#"{"tags":["go"]}"#).unwrap();
        assert_eq!(req.tags, Some(vec!["go".to_string()]));
        assert_eq!(req.title, None);

        assert!(serde_json::from_str::<UpdatePostRequest>(r#"{"id":3}"#).is_err());
    }

    #[test]
    fn post_response_uses_camel_case_timestamps() {
        let now = Utc::now();
        let response = PostResponse {
            id: 1,
            title: "Hello".into(),
            content: "World".into(),
            category: "Tech".into(),
            tags: vec!["go".into(), "web".into()],
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["tags"], serde_json::json!(["go", "web"]));
    }
}
