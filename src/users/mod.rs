mod friends;
mod profile;

use axum::{
    routing::{delete, get, patch},
    Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(profile::me))
        .route("/updateProfile", patch(profile::update_profile))
        .route("/deleteMe", delete(profile::delete_me))
        .route("/{user_id}", get(profile::get_user))
        .route("/page/{user_id}", get(profile::user_page))
        .route("/friends/{user_id}", get(friends::friend_list))
        .route("/{user_id}/{friend_id}", patch(friends::toggle))
}

/// Loads a user as its API shape. Soft-deleted accounts are invisible, so
/// this returns None for them as well as for unknown ids.
pub(crate) async fn fetch_user(db: &SqlitePool, id: Uuid) -> AppResult<Option<Value>> {
    type UserRow = (
        String,
        String,
        String,
        String,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        String,
    );

    let row: Option<UserRow> = sqlx::query_as(
        "SELECT id,first_name,last_name,email,phone,bio,location,occupation,photo,created_at
         FROM users WHERE id=? AND active=1",
    )
    .bind(id.to_string())
    .fetch_optional(db)
    .await?;

    Ok(row.map(
        |(id, first_name, last_name, email, phone, bio, location, occupation, photo, created_at)| {
            json!({
                "id": id,
                "first_name": first_name,
                "last_name": last_name,
                "email": email,
                "phone": phone,
                "bio": bio,
                "location": location,
                "occupation": occupation,
                "photo": photo,
                "created_at": created_at,
            })
        },
    ))
}
