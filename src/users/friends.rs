use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{engagement, session::Identity, AppError, AppResult};

#[debug_handler]
pub(crate) async fn friend_list(
    State(db_pool): State<SqlitePool>,
    Identity(_): Identity,
    Path(user_id): Path<Uuid>,
) -> AppResult<Response> {
    if sqlx::query("SELECT 1 FROM users WHERE id=? AND active=1")
        .bind(user_id.to_string())
        .fetch_optional(&db_pool)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("no user found with that ID"));
    }

    let friends = projected_friends(&db_pool, user_id).await?;

    Ok(Json(json!({ "status": "success", "data": { "friends": friends } })).into_response())
}

#[debug_handler]
pub(crate) async fn toggle(
    State(db_pool): State<SqlitePool>,
    Identity(actor): Identity,
    Path((user_id, friend_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Response> {
    if actor != user_id {
        return Err(AppError::invalid("you can only manage your own friendships"));
    }

    engagement::toggle_friend(&db_pool, user_id, friend_id).await?;

    let friends = projected_friends(&db_pool, user_id).await?;

    Ok(Json(json!({ "status": "success", "data": { "friends": friends } })).into_response())
}

/// Friend list reduced to its public-safe fields.
async fn projected_friends(db: &SqlitePool, user_id: Uuid) -> AppResult<Vec<Value>> {
    type FriendRow = (
        String,
        String,
        String,
        Option<String>,
        Option<String>,
        Option<String>,
    );

    let rows: Vec<FriendRow> = sqlx::query_as(
        "SELECT u.id,u.first_name,u.last_name,u.occupation,u.location,u.photo
         FROM friendships f JOIN users u ON u.id=f.friend_id
         WHERE f.user_id=? AND u.active=1",
    )
    .bind(user_id.to_string())
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, first_name, last_name, occupation, location, photo)| {
            json!({
                "id": id,
                "first_name": first_name,
                "last_name": last_name,
                "occupation": occupation,
                "location": location,
                "photo": photo,
            })
        })
        .collect())
}
