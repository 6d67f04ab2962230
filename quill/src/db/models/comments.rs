//! Database-layer models for comments.

use crate::types::{CommentId, PostId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct CommentCreateDBRequest {
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct CommentUpdateDBRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentDBResponse {
    pub id: CommentId,
    pub content: String,
    pub post_id: PostId,
    pub author_id: UserId,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
