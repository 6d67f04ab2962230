//! API types for comment resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    db::models::comments::CommentDBResponse,
    errors::Error,
    types::{CommentId, PostId, UserId},
};

const COMMENT_MAX: usize = 500;

fn validate_comment_content(content: &str) -> Result<(), Error> {
    if content.trim().is_empty() {
        return Err(Error::Validation {
            message: "comment content must not be blank".to_string(),
        });
    }

    if content.chars().count() > COMMENT_MAX {
        return Err(Error::Validation {
            message: format!("comment content must be at most {COMMENT_MAX} characters"),
        });
    }

    Ok(())
}

/// Request body for creating a comment.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CommentCreate {
    pub content: String,
}

impl CommentCreate {
    pub fn validate(&self) -> Result<(), Error> {
        validate_comment_content(&self.content)
    }
}

/// Request body for editing a comment.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CommentUpdate {
    pub content: String,
}

impl CommentUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        validate_comment_content(&self.content)
    }
}

/// Public view of a comment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: CommentId,
    pub content: String,
    pub post_id: PostId,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CommentDBResponse> for CommentResponse {
    fn from(comment: CommentDBResponse) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            author_id: comment.author_id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

/// Acknowledgement body for comment deletion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentDeletedResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_content_rejected() {
        for content in ["", "   ", "\n\t"] {
            let req = CommentCreate {
                content: content.to_string(),
            };
            assert!(matches!(req.validate().unwrap_err(), Error::Validation { .. }));
        }
    }

    #[test]
    fn test_content_length_limit() {
        let at_limit = CommentUpdate {
            content: "c".repeat(500),
        };
        assert!(at_limit.validate().is_ok());

        let over_limit = CommentUpdate {
            content: "c".repeat(501),
        };
        assert!(matches!(over_limit.validate().unwrap_err(), Error::Validation { .. }));
    }
}
