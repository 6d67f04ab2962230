//! Post CRUD handlers.
//!
//! The public listing and single-post fetch behave differently for drafts:
//! a draft never appears in the listing, but its author can still fetch it
//! by id. Non-authors get 403 on a draft they can name, and mutations by
//! non-owners are rejected with 403 rather than hidden behind a 404.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        pagination::{PaginatedResponse, Pagination},
        posts::{PostCreate, PostResponse, PostUpdate},
    },
    auth::{Identity, MaybeIdentity, ensure_post_owner, ensure_post_visible},
    db::{
        handlers::{PostFilter, Posts, Repository},
        models::posts::{PostCreateDBRequest, PostStatus, PostUpdateDBRequest},
    },
    errors::{Error, Result},
    types::PostId,
};

fn post_not_found(id: PostId) -> Error {
    Error::NotFound {
        resource: "Post".to_string(),
        id: id.to_string(),
    }
}

/// Create a post. New posts default to draft.
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = PostCreate,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[tracing::instrument(skip_all, fields(author_id = identity.user_id))]
pub async fn create_post(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<PostCreate>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut posts = Posts::new(&mut conn);

    let post = posts
        .create(&PostCreateDBRequest {
            author_id: identity.user_id,
            title: request.title,
            content: request.content,
            status: request.status.unwrap_or(PostStatus::Draft),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(post.into())))
}

/// List published posts, newest first.
#[utoipa::path(
    get,
    path = "/api/posts",
    params(Pagination),
    responses(
        (status = 200, description = "Published posts", body = PaginatedResponse<PostResponse>)
    ),
    tag = "posts"
)]
#[tracing::instrument(skip_all)]
pub async fn list_posts(State(state): State<AppState>, Query(pagination): Query<Pagination>) -> Result<Json<PaginatedResponse<PostResponse>>> {
    let (skip, limit) = pagination.params();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut posts = Posts::new(&mut conn);

    let listed = posts.list(&PostFilter::new(skip, limit)).await?;
    let total_count = posts.count_published().await?;

    let data = listed.into_iter().map(PostResponse::from).collect();
    Ok(Json(PaginatedResponse::new(data, total_count, skip, limit)))
}

/// Fetch a single post. Drafts are visible only to their author.
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "The post", body = PostResponse),
        (status = 403, description = "Draft belongs to someone else"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
#[tracing::instrument(skip_all, fields(post_id = id))]
pub async fn get_post(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(id): Path<PostId>,
) -> Result<Json<PostResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut posts = Posts::new(&mut conn);

    let post = posts.get_by_id(id).await?.ok_or_else(|| post_not_found(id))?;
    ensure_post_visible(identity.as_ref(), &post)?;

    Ok(Json(post.into()))
}

/// Update a post. Only the author may update, and publishing is one-way.
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = PostUpdate,
    responses(
        (status = 200, description = "Updated post", body = PostResponse),
        (status = 400, description = "Validation failed or illegal status change"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[tracing::instrument(skip_all, fields(post_id = id, user_id = identity.user_id))]
pub async fn update_post(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<PostId>,
    Json(request): Json<PostUpdate>,
) -> Result<Json<PostResponse>> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut posts = Posts::new(&mut conn);

    let post = posts.get_by_id(id).await?.ok_or_else(|| post_not_found(id))?;
    ensure_post_owner(&identity, &post)?;

    // Publishing is one-way; a published post cannot return to draft
    if post.status == PostStatus::Published && request.status == Some(PostStatus::Draft) {
        return Err(Error::BadRequest {
            message: "a published post cannot be moved back to draft".to_string(),
        });
    }

    let updated = posts
        .update(
            id,
            &PostUpdateDBRequest {
                title: request.title,
                content: request.content,
                status: request.status,
            },
        )
        .await?;

    Ok(Json(updated.into()))
}

/// Delete a post. Only the author may delete; comments cascade away with it.
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[tracing::instrument(skip_all, fields(post_id = id, user_id = identity.user_id))]
pub async fn delete_post(State(state): State<AppState>, identity: Identity, Path(id): Path<PostId>) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut posts = Posts::new(&mut conn);

    let post = posts.get_by_id(id).await?.ok_or_else(|| post_not_found(id))?;
    ensure_post_owner(&identity, &post)?;

    posts.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
