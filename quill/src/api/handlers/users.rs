//! Public user profile handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    api::models::users::UserResponse,
    db::handlers::{Repository, Users},
    errors::{Error, Result},
    types::UserId,
};

/// Fetch a user's public profile.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
#[tracing::instrument(skip_all, fields(user_id = id))]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(user.into()))
}
