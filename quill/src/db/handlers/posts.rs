//! Database repository for posts.

use crate::types::PostId;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::posts::{PostCreateDBRequest, PostDBResponse, PostStatus, PostUpdateDBRequest},
};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for the public post listing
#[derive(Debug, Clone)]
pub struct PostFilter {
    pub skip: i64,
    pub limit: i64,
}

impl PostFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

pub struct Posts<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Posts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Total number of published posts (for pagination metadata).
    #[instrument(skip(self), err)]
    pub async fn count_published(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE status = 'PUBLISHED'")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Posts<'c> {
    type CreateRequest = PostCreateDBRequest;
    type UpdateRequest = PostUpdateDBRequest;
    type Response = PostDBResponse;
    type Id = PostId;
    type Filter = PostFilter;

    #[instrument(skip(self, request), fields(author_id = request.author_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let post = sqlx::query_as::<_, PostDBResponse>(
            r#"
            INSERT INTO posts (title, content, status, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.status)
        .bind(request.author_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(post)
    }

    /// Fetch by id regardless of status; draft visibility is enforced at the API layer.
    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let post = sqlx::query_as::<_, PostDBResponse>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(post)
    }

    /// Published posts only, newest first. Drafts never appear here, not even
    /// for their author.
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let posts = sqlx::query_as::<_, PostDBResponse>(
            "SELECT * FROM posts WHERE status = 'PUBLISHED' ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(posts)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let post = sqlx::query_as::<_, PostDBResponse>(
            r#"
            UPDATE posts SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.status)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(post)
    }
}
