//! Signup, login and session introspection handlers.

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::models::{
        auth::{LoginRequest, LoginResponse, SignupRequest},
        users::UserResponse,
    },
    auth::{Identity, hash_password, verify_password},
    db::{
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    errors::{Error, Result},
};

/// Create a new account.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all, fields(email = %request.email))]
pub async fn signup(State(state): State<AppState>, Json(request): Json<SignupRequest>) -> Result<(StatusCode, Json<UserResponse>)> {
    request.validate(&state.config.auth.password)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    if users.get_user_by_email(&request.email).await?.is_some() {
        return Err(Error::DuplicateEmail);
    }

    // Argon2 is deliberately slow; keep it off the async workers
    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("join password hashing task: {e}"),
        })??;

    // A concurrent signup can still hit the unique index; the constraint
    // violation maps to the same 409 as the lookup above.
    let user = users
        .create(&UserCreateDBRequest {
            username: request.username,
            email: request.email,
            password_hash,
            bio: request.bio,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Exchange credentials for an access token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<LoginResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    // Unknown email and wrong password take the same path to the same error
    let user = users.get_user_by_email(&request.email).await?.ok_or(Error::InvalidCredentials)?;

    let password = request.password;
    let digest = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &digest))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("join password verification task: {e}"),
        })?;

    if !verified {
        return Err(Error::InvalidCredentials);
    }

    let access_token = state.token_codec.issue(user.id, &user.email)?;

    Ok(Json(LoginResponse {
        user: user.into(),
        access_token,
    }))
}

/// Return the authenticated caller's profile.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Account no longer exists")
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[tracing::instrument(skip_all, fields(user_id = identity.user_id))]
pub async fn me(State(state): State<AppState>, identity: Identity) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_by_id(identity.user_id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: identity.user_id.to_string(),
    })?;

    Ok(Json(user.into()))
}
