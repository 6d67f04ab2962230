//! API types for post resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    db::models::posts::{PostDBResponse, PostStatus},
    errors::Error,
    types::{PostId, UserId},
};

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 20;
const CONTENT_MIN: usize = 5;
const CONTENT_MAX: usize = 250;

fn validate_title(title: &str) -> Result<(), Error> {
    let length = title.chars().count();
    if length < TITLE_MIN || length > TITLE_MAX {
        return Err(Error::Validation {
            message: format!("title must be between {TITLE_MIN} and {TITLE_MAX} characters"),
        });
    }

    Ok(())
}

fn validate_content(content: &str) -> Result<(), Error> {
    let length = content.chars().count();
    if length < CONTENT_MIN || length > CONTENT_MAX {
        return Err(Error::Validation {
            message: format!("content must be between {CONTENT_MIN} and {CONTENT_MAX} characters"),
        });
    }

    Ok(())
}

/// Request body for creating a post. Status defaults to draft.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PostCreate {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub status: Option<PostStatus>,
}

impl PostCreate {
    pub fn validate(&self) -> Result<(), Error> {
        validate_title(&self.title)?;
        validate_content(&self.content)?;

        Ok(())
    }
}

/// Partial update of a post. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
}

impl PostUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(content) = &self.content {
            validate_content(content)?;
        }

        Ok(())
    }
}

/// Public view of a post.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostDBResponse> for PostResponse {
    fn from(post: PostDBResponse) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            status: post.status,
            author_id: post.author_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_validation_bounds() {
        let valid = PostCreate {
            title: "hello".to_string(),
            content: "some body text".to_string(),
            status: None,
        };
        assert!(valid.validate().is_ok());

        let short_title = PostCreate {
            title: "hi".to_string(),
            ..valid.clone()
        };
        assert!(matches!(short_title.validate().unwrap_err(), Error::Validation { .. }));

        let long_title = PostCreate {
            title: "t".repeat(21),
            ..valid.clone()
        };
        assert!(matches!(long_title.validate().unwrap_err(), Error::Validation { .. }));

        let short_content = PostCreate {
            content: "tiny".to_string(),
            ..valid.clone()
        };
        assert!(matches!(short_content.validate().unwrap_err(), Error::Validation { .. }));

        let long_content = PostCreate {
            content: "c".repeat(251),
            ..valid
        };
        assert!(matches!(long_content.validate().unwrap_err(), Error::Validation { .. }));
    }

    #[test]
    fn test_update_validates_only_provided_fields() {
        let empty = PostUpdate::default();
        assert!(empty.validate().is_ok());

        let bad_title = PostUpdate {
            title: Some("no".to_string()),
            ..Default::default()
        };
        assert!(matches!(bad_title.validate().unwrap_err(), Error::Validation { .. }));

        let publish_only = PostUpdate {
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        assert!(publish_only.validate().is_ok());
    }
}
