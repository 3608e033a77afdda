pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod engagement;
pub mod error;
pub mod posts;
pub mod session;
pub mod users;

use std::time::Duration;

use axum::{
    extract::FromRef,
    http::{header::CONTENT_TYPE, Method},
    Router,
};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use error::{AppError, AppResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
}

/// Assembles the full application router, including the session layer that
/// backs the identity extractor. Tests drive this router directly.
pub fn app(db_pool: SqlitePool, session_minutes: i64) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(session_minutes)));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .with_state(AppState { db_pool })
        .layer(session_layer)
        .layer(cors)
}
