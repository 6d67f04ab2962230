//! Database repository for comments.
//!
//! Comments are soft-deleted: every lookup filters on `is_deleted = FALSE`,
//! so a deleted comment is indistinguishable from one that never existed.

use crate::types::{CommentId, PostId};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::comments::{CommentCreateDBRequest, CommentDBResponse, CommentUpdateDBRequest},
};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing the active comments of a post
#[derive(Debug, Clone)]
pub struct CommentFilter {
    pub post_id: PostId,
    pub skip: i64,
    pub limit: i64,
}

impl CommentFilter {
    pub fn new(post_id: PostId, skip: i64, limit: i64) -> Self {
        Self { post_id, skip, limit }
    }
}

pub struct Comments<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Comments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Number of active comments on a post (for pagination metadata).
    #[instrument(skip(self), err)]
    pub async fn count_active_for_post(&mut self, post_id: PostId) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = $1 AND is_deleted = FALSE")
            .bind(post_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Comments<'c> {
    type CreateRequest = CommentCreateDBRequest;
    type UpdateRequest = CommentUpdateDBRequest;
    type Response = CommentDBResponse;
    type Id = CommentId;
    type Filter = CommentFilter;

    #[instrument(skip(self, request), fields(post_id = request.post_id, author_id = request.author_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let comment = sqlx::query_as::<_, CommentDBResponse>(
            r#"
            INSERT INTO comments (content, post_id, author_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&request.content)
        .bind(request.post_id)
        .bind(request.author_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(comment)
    }

    /// Active comments only; soft-deleted rows read as absent.
    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let comment = sqlx::query_as::<_, CommentDBResponse>("SELECT * FROM comments WHERE id = $1 AND is_deleted = FALSE")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(comment)
    }

    /// Active comments of a post, newest first.
    #[instrument(skip(self, filter), fields(post_id = filter.post_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let comments = sqlx::query_as::<_, CommentDBResponse>(
            r#"
            SELECT * FROM comments
            WHERE post_id = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.post_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(comments)
    }

    /// Soft delete. Returns false when the comment is missing or already deleted.
    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("UPDATE comments SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let comment = sqlx::query_as::<_, CommentDBResponse>(
            r#"
            UPDATE comments SET
                content = $2,
                updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.content)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::{Posts, Users};
    use crate::db::models::posts::{PostCreateDBRequest, PostStatus};
    use crate::db::models::users::UserCreateDBRequest;
    use crate::types::{PostId, UserId};
    use sqlx::PgPool;

    async fn seed_post(pool: &PgPool) -> (UserId, PostId) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        let author = users
            .create(&UserCreateDBRequest {
                username: "commenter".to_string(),
                email: "comments@example.com".to_string(),
                password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
                bio: None,
            })
            .await
            .unwrap();

        let mut posts = Posts::new(&mut conn);
        let post = posts
            .create(&PostCreateDBRequest {
                author_id: author.id,
                title: "a post".to_string(),
                content: "with comments".to_string(),
                status: PostStatus::Published,
            })
            .await
            .unwrap();

        (author.id, post.id)
    }

    #[sqlx::test]
    async fn test_create_and_list_comments(pool: PgPool) {
        let (author_id, post_id) = seed_post(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut comments = Comments::new(&mut conn);

        let first = comments
            .create(&CommentCreateDBRequest {
                post_id,
                author_id,
                content: "first!".to_string(),
            })
            .await
            .unwrap();
        let second = comments
            .create(&CommentCreateDBRequest {
                post_id,
                author_id,
                content: "second".to_string(),
            })
            .await
            .unwrap();

        let listed = comments.list(&CommentFilter::new(post_id, 0, 20)).await.unwrap();
        assert_eq!(listed.len(), 2);
        // Newest first
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
        assert_eq!(comments.count_active_for_post(post_id).await.unwrap(), 2);
    }

    #[sqlx::test]
    async fn test_soft_delete_hides_comment_everywhere(pool: PgPool) {
        let (author_id, post_id) = seed_post(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut comments = Comments::new(&mut conn);

        let comment = comments
            .create(&CommentCreateDBRequest {
                post_id,
                author_id,
                content: "soon gone".to_string(),
            })
            .await
            .unwrap();

        assert!(comments.delete(comment.id).await.unwrap());

        // Reads, listings, counts and further mutations all treat it as absent
        assert!(comments.get_by_id(comment.id).await.unwrap().is_none());
        assert!(comments.list(&CommentFilter::new(post_id, 0, 20)).await.unwrap().is_empty());
        assert_eq!(comments.count_active_for_post(post_id).await.unwrap(), 0);
        assert!(!comments.delete(comment.id).await.unwrap());

        let err = comments
            .update(
                comment.id,
                &CommentUpdateDBRequest {
                    content: "rewrite".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));

        // The row itself still exists, flagged as deleted
        let raw: bool = sqlx::query_scalar("SELECT is_deleted FROM comments WHERE id = $1")
            .bind(comment.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(raw);
    }

    #[sqlx::test]
    async fn test_update_active_comment(pool: PgPool) {
        let (author_id, post_id) = seed_post(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut comments = Comments::new(&mut conn);

        let comment = comments
            .create(&CommentCreateDBRequest {
                post_id,
                author_id,
                content: "draft thought".to_string(),
            })
            .await
            .unwrap();

        let updated = comments
            .update(
                comment.id,
                &CommentUpdateDBRequest {
                    content: "polished thought".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.content, "polished thought");
    }
}
