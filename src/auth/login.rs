use axum::{
    debug_handler,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{session::USER_ID, users, AppError, AppResult};

#[derive(Deserialize)]
pub(crate) struct LoginBody {
    email: String,
}

/// Re-establishes a session for an existing active account. The identity
/// provider has already vouched for the caller by the time this runs.
#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(LoginBody { email }): Json<LoginBody>,
) -> AppResult<Response> {
    let Some((id,)): Option<(String,)> =
        sqlx::query_as("SELECT id FROM users WHERE email=? AND active=1")
            .bind(&email)
            .fetch_optional(&db_pool)
            .await?
    else {
        return Err(AppError::not_found("no account with that email"));
    };

    session.insert(USER_ID, id.clone()).await?;

    let user = users::fetch_user(&db_pool, Uuid::parse_str(&id).map_err(anyhow::Error::from)?)
        .await?
        .ok_or_else(|| AppError::not_found("no user found with that ID"))?;

    Ok(Json(json!({ "status": "success", "data": { "user": user } })).into_response())
}
