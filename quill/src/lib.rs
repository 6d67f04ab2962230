//! # quill: a blog platform backend
//!
//! `quill` is the HTTP backend for a multi-user blog. It exposes a JSON API
//! for accounts, posts and comments, with stateless JWT authentication and
//! ownership-based authorization.
//!
//! ## Overview
//!
//! Users sign up with an email and password and log in to receive a signed
//! access token. The token travels as a `Authorization: Bearer` header and is
//! verified by middleware on every request; handlers that require a caller
//! use the [`auth::Identity`] extractor, and handlers that serve both
//! anonymous and authenticated traffic use [`auth::MaybeIdentity`].
//!
//! Posts have a draft/published lifecycle. A draft is private to its author:
//! it never appears in the public listing and a fetch by id returns 403 for
//! anyone else. Publishing is one-way. Comments belong to published posts and
//! are soft-deleted, so a deleted comment reads as absent from every endpoint
//! while its row is retained.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) with
//! PostgreSQL for persistence. The **API layer** ([`api`]) holds the axum
//! handlers and their request/response models. The **auth layer** ([`auth`])
//! covers password hashing, token issuance and verification, the identity
//! middleware, and the ownership/visibility guards. The **database layer**
//! ([`db`]) uses the repository pattern: each entity has a repository over a
//! `&mut PgConnection` that owns its queries.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use quill::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = quill::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     quill::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{auth::TokenCodec, openapi::ApiDoc};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post, put},
};
pub use config::Config;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{CommentId, PostId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub token_codec: TokenCodec,
}

/// Get the quill database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials))
}

/// Build the application router with all endpoints and middleware.
///
/// The identity middleware is applied separately, before path matching, by
/// [`Application::serve`] and the test harness.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        .route("/auth/signup", post(api::handlers::auth::signup))
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/me", get(api::handlers::auth::me))
        .route("/users/{id}", get(api::handlers::users::get_user))
        .route(
            "/posts",
            get(api::handlers::posts::list_posts).post(api::handlers::posts::create_post),
        )
        .route(
            "/posts/{id}",
            get(api::handlers::posts::get_post)
                .put(api::handlers::posts::update_post)
                .delete(api::handlers::posts::delete_post),
        )
        .route(
            "/posts/{post_id}/comments",
            get(api::handlers::comments::list_comments).post(api::handlers::comments::create_comment),
        )
        .route(
            "/comments/{id}",
            put(api::handlers::comments::update_comment).delete(api::handlers::comments::delete_comment),
        );

    let cors_layer = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    app_state: AppState,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting quill with configuration: {:#?}", config);

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;
        migrator().run(&pool).await?;

        let token_codec = TokenCodec::from_config(&config)?;

        let app_state = AppState {
            db: pool.clone(),
            config: config.clone(),
            token_codec,
        };

        let router = build_router(app_state.clone())?;

        Ok(Self {
            router,
            app_state,
            config,
            pool,
        })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        use axum::ServiceExt;
        use tower::Layer;

        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("quill listening on http://{bind_addr}");

        // Apply identity middleware before path matching
        let middleware = axum::middleware::from_fn_with_state(self.app_state, auth::authenticate);
        let service = middleware.layer(self.router);

        axum::serve(listener, service.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
