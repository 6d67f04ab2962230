//! Comment handlers.
//!
//! Comments hang off posts for creation and listing, and are addressed
//! directly for edits and deletion. Deletion is soft: the row stays but the
//! comment reads as absent from every endpoint afterwards.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        comments::{CommentCreate, CommentDeletedResponse, CommentResponse, CommentUpdate},
        pagination::{PaginatedResponse, Pagination},
    },
    auth::{Identity, ensure_comment_owner},
    db::{
        handlers::{CommentFilter, Comments, Posts, Repository},
        models::comments::{CommentCreateDBRequest, CommentUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{CommentId, PostId},
};

fn post_not_found(id: PostId) -> Error {
    Error::NotFound {
        resource: "Post".to_string(),
        id: id.to_string(),
    }
}

fn comment_not_found(id: CommentId) -> Error {
    Error::NotFound {
        resource: "Comment".to_string(),
        id: id.to_string(),
    }
}

/// Comment on a post.
#[utoipa::path(
    post,
    path = "/api/posts/{post_id}/comments",
    params(("post_id" = i64, Path, description = "Post ID")),
    request_body = CommentCreate,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer" = [])),
    tag = "comments"
)]
#[tracing::instrument(skip_all, fields(post_id = post_id, author_id = identity.user_id))]
pub async fn create_comment(
    State(state): State<AppState>,
    identity: Identity,
    Path(post_id): Path<PostId>,
    Json(request): Json<CommentCreate>,
) -> Result<(StatusCode, Json<CommentResponse>)> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let mut posts = Posts::new(&mut conn);
    if posts.get_by_id(post_id).await?.is_none() {
        return Err(post_not_found(post_id));
    }

    let mut comments = Comments::new(&mut conn);
    let comment = comments
        .create(&CommentCreateDBRequest {
            post_id,
            author_id: identity.user_id,
            content: request.content,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// List the active comments of a post, newest first.
#[utoipa::path(
    get,
    path = "/api/posts/{post_id}/comments",
    params(("post_id" = i64, Path, description = "Post ID"), Pagination),
    responses(
        (status = 200, description = "Active comments", body = PaginatedResponse<CommentResponse>),
        (status = 404, description = "Post not found")
    ),
    tag = "comments"
)]
#[tracing::instrument(skip_all, fields(post_id = post_id))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<CommentResponse>>> {
    let (skip, limit) = pagination.params();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let mut posts = Posts::new(&mut conn);
    if posts.get_by_id(post_id).await?.is_none() {
        return Err(post_not_found(post_id));
    }

    let mut comments = Comments::new(&mut conn);
    let listed = comments.list(&CommentFilter::new(post_id, skip, limit)).await?;
    let total_count = comments.count_active_for_post(post_id).await?;

    let data = listed.into_iter().map(CommentResponse::from).collect();
    Ok(Json(PaginatedResponse::new(data, total_count, skip, limit)))
}

/// Edit a comment. Only the author may edit, and only while it is active.
#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    params(("id" = i64, Path, description = "Comment ID")),
    request_body = CommentUpdate,
    responses(
        (status = 200, description = "Updated comment", body = CommentResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found or deleted")
    ),
    security(("bearer" = [])),
    tag = "comments"
)]
#[tracing::instrument(skip_all, fields(comment_id = id, user_id = identity.user_id))]
pub async fn update_comment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<CommentId>,
    Json(request): Json<CommentUpdate>,
) -> Result<Json<CommentResponse>> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut comments = Comments::new(&mut conn);

    // Deleted comments read as absent, so the owner check never runs on them
    let comment = comments.get_by_id(id).await?.ok_or_else(|| comment_not_found(id))?;
    ensure_comment_owner(&identity, &comment)?;

    let updated = comments.update(id, &CommentUpdateDBRequest { content: request.content }).await?;

    Ok(Json(updated.into()))
}

/// Soft-delete a comment. Only the author may delete.
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = CommentDeletedResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found or already deleted")
    ),
    security(("bearer" = [])),
    tag = "comments"
)]
#[tracing::instrument(skip_all, fields(comment_id = id, user_id = identity.user_id))]
pub async fn delete_comment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<CommentId>,
) -> Result<Json<CommentDeletedResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut comments = Comments::new(&mut conn);

    let comment = comments.get_by_id(id).await?.ok_or_else(|| comment_not_found(id))?;
    ensure_comment_owner(&identity, &comment)?;

    comments.delete(id).await?;

    Ok(Json(CommentDeletedResponse {
        message: "Comment deleted".to_string(),
    }))
}
