use axum::{
    debug_handler,
    extract::State,
    http::StatusCode,
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
pub(crate) struct SignupBody {
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    occupation: Option<String>,
    photo: Option<String>,
}

#[debug_handler]
pub(crate) async fn signup(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(body): Json<SignupBody>,
) -> AppResult<Response> {
    if body.first_name.trim().is_empty() || body.email.trim().is_empty() {
        return Err(AppError::invalid("a user needs a first name and an email"));
    }

    if sqlx::query("SELECT 1 FROM users WHERE email=?")
        .bind(&body.email)
        .fetch_optional(&db_pool)
        .await?
        .is_some()
    {
        return Err(AppError::invalid("that email is already registered"));
    }

    let id = Uuid::now_v7();
    sqlx::query(
        "INSERT INTO users (id,first_name,last_name,email,phone,bio,location,occupation,photo)
         VALUES (?,?,?,?,?,?,?,?,?)",
    )
    .bind(id.to_string())
    .bind(&body.first_name)
    .bind(&body.last_name)
    .bind(&body.email)
    .bind(&body.phone)
    .bind(&body.bio)
    .bind(&body.location)
    .bind(&body.occupation)
    .bind(&body.photo)
    .execute(&db_pool)
    .await?;

    session.insert(USER_ID, id.to_string()).await?;

    let user = users::fetch_user(&db_pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("no user found with that ID"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": { "user": user } })),
    )
        .into_response())
}
