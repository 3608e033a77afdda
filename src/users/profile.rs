use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{posts, session::Identity, AppError, AppResult};

use super::fetch_user;

#[debug_handler]
pub(crate) async fn me(
    State(db_pool): State<SqlitePool>,
    Identity(user_id): Identity,
) -> AppResult<Response> {
    let user = fetch_user(&db_pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("no user found with that ID"))?;

    Ok(Json(json!({ "status": "success", "data": { "user": user } })).into_response())
}

#[debug_handler]
pub(crate) async fn get_user(
    State(db_pool): State<SqlitePool>,
    Identity(_): Identity,
    Path(user_id): Path<Uuid>,
) -> AppResult<Response> {
    let user = fetch_user(&db_pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("no user found with that ID"))?;

    Ok(Json(json!({ "status": "success", "data": { "user": user } })).into_response())
}

#[derive(Deserialize)]
pub(crate) struct UpdateProfileBody {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    occupation: Option<String>,
    photo: Option<String>,

    // rejected outright, wrong endpoint for credentials
    password: Option<String>,
    confirm_password: Option<String>,
}

#[debug_handler]
pub(crate) async fn update_profile(
    State(db_pool): State<SqlitePool>,
    Identity(user_id): Identity,
    Json(body): Json<UpdateProfileBody>,
) -> AppResult<Response> {
    if body.password.is_some() || body.confirm_password.is_some() {
        return Err(AppError::invalid("this route is not for password updates"));
    }

    if let Some(email) = &body.email {
        if sqlx::query("SELECT 1 FROM users WHERE email=? AND id!=?")
            .bind(email)
            .bind(user_id.to_string())
            .fetch_optional(&db_pool)
            .await?
            .is_some()
        {
            return Err(AppError::invalid("that email is already registered"));
        }
    }

    sqlx::query(
        "UPDATE users SET
            first_name=COALESCE(?,first_name),
            last_name=COALESCE(?,last_name),
            email=COALESCE(?,email),
            phone=COALESCE(?,phone),
            bio=COALESCE(?,bio),
            location=COALESCE(?,location),
            occupation=COALESCE(?,occupation),
            photo=COALESCE(?,photo)
         WHERE id=? AND active=1",
    )
    .bind(&body.first_name)
    .bind(&body.last_name)
    .bind(&body.email)
    .bind(&body.phone)
    .bind(&body.bio)
    .bind(&body.location)
    .bind(&body.occupation)
    .bind(&body.photo)
    .bind(user_id.to_string())
    .execute(&db_pool)
    .await?;

    let user = fetch_user(&db_pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("no user found with that ID"))?;

    Ok(Json(json!({ "status": "success", "data": { "user": user } })).into_response())
}

#[debug_handler]
pub(crate) async fn delete_me(
    State(db_pool): State<SqlitePool>,
    Identity(user_id): Identity,
    session: Session,
) -> AppResult<Response> {
    sqlx::query("UPDATE users SET active=0 WHERE id=?")
        .bind(user_id.to_string())
        .execute(&db_pool)
        .await?;

    session.clear().await;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[debug_handler]
pub(crate) async fn user_page(
    State(db_pool): State<SqlitePool>,
    Identity(_): Identity,
    Path(user_id): Path<Uuid>,
) -> AppResult<Response> {
    let user = fetch_user(&db_pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("no user found with that ID"))?;

    let post_ids: Vec<(String,)> =
        sqlx::query_as("SELECT id FROM posts WHERE user_id=? ORDER BY created_at DESC")
            .bind(user_id.to_string())
            .fetch_all(&db_pool)
            .await?;

    let mut user_posts = Vec::with_capacity(post_ids.len());
    for (id,) in post_ids {
        let post_id = Uuid::parse_str(&id).map_err(anyhow::Error::from)?;
        if let Some(post) = posts::load_post(&db_pool, post_id).await? {
            user_posts.push(post);
        }
    }

    Ok(Json(json!({
        "status": "success",
        "data": { "user_data": user, "user_posts": user_posts },
    }))
    .into_response())
}
