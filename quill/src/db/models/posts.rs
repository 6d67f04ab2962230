//! Database-layer models for posts.

use crate::types::{PostId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Post lifecycle state. Only `PUBLISHED` posts are publicly visible;
/// the transition is one-way (a published post never returns to draft).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "post_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PostStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone)]
pub struct PostCreateDBRequest {
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PostUpdateDBRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostDBResponse {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
