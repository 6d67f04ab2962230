//! OpenAPI documentation for the blog API.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Bearer token security scheme shared by all authenticated endpoints.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearer".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "JWT access token obtained from `POST /api/auth/login`. \
                            Include it in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        api::handlers::auth::signup,
        api::handlers::auth::login,
        api::handlers::auth::me,
        api::handlers::users::get_user,
        api::handlers::posts::create_post,
        api::handlers::posts::list_posts,
        api::handlers::posts::get_post,
        api::handlers::posts::update_post,
        api::handlers::posts::delete_post,
        api::handlers::comments::create_comment,
        api::handlers::comments::list_comments,
        api::handlers::comments::update_comment,
        api::handlers::comments::delete_comment,
    ),
    components(
        schemas(
            api::models::auth::SignupRequest,
            api::models::auth::LoginRequest,
            api::models::auth::LoginResponse,
            api::models::users::UserResponse,
            api::models::posts::PostCreate,
            api::models::posts::PostUpdate,
            api::models::posts::PostResponse,
            api::models::comments::CommentCreate,
            api::models::comments::CommentUpdate,
            api::models::comments::CommentResponse,
            api::models::comments::CommentDeletedResponse,
            crate::db::models::posts::PostStatus,
        )
    ),
    tags(
        (name = "auth", description = "Account creation, login and session introspection."),
        (name = "users", description = "Public user profiles."),
        (name = "posts", description = "Posts with a draft/published lifecycle. Drafts are private to their author."),
        (name = "comments", description = "Comments on published posts. Deletion is soft: deleted comments disappear from the API but the rows remain."),
    ),
    info(
        title = "Quill API",
        version = "0.3.0",
        description = "A blog platform API with JWT authentication, draft/published post visibility, and soft-deleted comments.",
    ),
)]
pub struct ApiDoc;
