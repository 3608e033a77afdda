mod crud;
mod like;

use axum::{
    routing::{get, post},
    Router,
};
use serde_json::{json, Map, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{engagement, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::feed).post(crud::create))
        .route(
            "/{post_id}",
            get(crud::get_post).patch(crud::update).delete(crud::delete),
        )
        .route("/like/{post_id}", post(like::toggle))
}

/// Loads a post as its API shape. Likes come back as a map of user id to
/// true so membership checks stay cheap for callers; the view count is
/// derived from the viewer set.
pub(crate) async fn load_post(db: &SqlitePool, post_id: Uuid) -> AppResult<Option<Value>> {
    let Some((id, user_id, description, location, created_at)): Option<(
        String,
        String,
        String,
        Option<String>,
        String,
    )> = sqlx::query_as(
        "SELECT id,user_id,description,location,created_at FROM posts WHERE id=?",
    )
    .bind(post_id.to_string())
    .fetch_optional(db)
    .await?
    else {
        return Ok(None);
    };

    let images: Vec<(String,)> =
        sqlx::query_as("SELECT filename FROM post_images WHERE post_id=? ORDER BY position")
            .bind(post_id.to_string())
            .fetch_all(db)
            .await?;
    let images: Vec<String> = images.into_iter().map(|(f,)| f).collect();

    let mut likes = Map::new();
    for liker in engagement::likers(db, post_id).await? {
        likes.insert(liker, Value::Bool(true));
    }

    let viewed_by = engagement::viewers(db, post_id).await?;
    let views = viewed_by.len();

    Ok(Some(json!({
        "id": id,
        "user": user_id,
        "description": description,
        "images": images,
        "location": location,
        "created_at": created_at,
        "likes": likes,
        "viewed_by": viewed_by,
        "views": views,
    })))
}
