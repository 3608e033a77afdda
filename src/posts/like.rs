use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{engagement, session::Identity, AppError, AppResult};

use super::load_post;

#[debug_handler]
pub(crate) async fn toggle(
    State(db_pool): State<SqlitePool>,
    Identity(actor): Identity,
    Path(post_id): Path<Uuid>,
) -> AppResult<Response> {
    engagement::toggle_like(&db_pool, post_id, actor).await?;

    let post = load_post(&db_pool, post_id)
        .await?
        .ok_or_else(|| AppError::not_found("no post found with that ID"))?;

    Ok(Json(json!({ "status": "success", "data": { "post": post } })).into_response())
}
