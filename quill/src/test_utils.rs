//! Shared helpers for endpoint tests.

use axum::ServiceExt;
use axum_test::TestServer;
use serde_json::json;
use sqlx::PgPool;
use tower::Layer;

use crate::{AppState, Config, api::models::users::UserResponse, auth::TokenCodec, build_router};

pub const TEST_PASSWORD: &str = "a perfectly fine password";

pub fn create_test_config() -> Config {
    let mut config = Config {
        secret_key: Some("integration-test-secret-key-0123456789".to_string()),
        ..Default::default()
    };
    // tower-http rejects the default wildcard "*" in AllowOrigin::list, which
    // panics build_router; the endpoint tests don't exercise CORS.
    config.cors.allowed_origins = vec!["http://localhost:3000".to_string()];
    config
}

/// Build a test server over a migrated pool, with the identity middleware
/// applied the same way `Application::serve` applies it.
pub async fn create_test_app(pool: PgPool) -> TestServer {
    let config = create_test_config();
    let token_codec = TokenCodec::from_config(&config).expect("test config has a secret");

    let state = AppState {
        db: pool,
        config,
        token_codec,
    };

    let router = build_router(state.clone()).expect("failed to build router");
    let middleware = axum::middleware::from_fn_with_state(state, crate::auth::authenticate);
    let service = middleware.layer(router);

    TestServer::new(service.into_make_service()).expect("failed to create test server")
}

pub async fn signup(server: &TestServer, username: &str, email: &str) -> UserResponse {
    let response = server
        .post("/api/auth/signup")
        .json(&json!({
            "username": username,
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .await;
    assert_eq!(response.status_code().as_u16(), 201, "signup failed: {}", response.text());

    response.json()
}

pub async fn signup_and_login(server: &TestServer, username: &str, email: &str) -> (UserResponse, String) {
    let user = signup(server, username, email).await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({"email": email, "password": TEST_PASSWORD}))
        .await;
    assert_eq!(response.status_code().as_u16(), 200, "login failed: {}", response.text());

    let body: serde_json::Value = response.json();
    let token = body["access_token"].as_str().expect("login response carries a token").to_string();

    (user, token)
}
