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
use uuid::Uuid;

use crate::{comments, engagement, session::Identity, AppError, AppResult};

use super::load_post;

#[debug_handler]
pub(crate) async fn feed(
    State(db_pool): State<SqlitePool>,
    Identity(_): Identity,
) -> AppResult<Response> {
    let ids: Vec<(String,)> = sqlx::query_as("SELECT id FROM posts ORDER BY created_at DESC")
        .fetch_all(&db_pool)
        .await?;

    let mut posts = Vec::with_capacity(ids.len());
    for (id,) in ids {
        let post_id = Uuid::parse_str(&id).map_err(anyhow::Error::from)?;
        if let Some(post) = load_post(&db_pool, post_id).await? {
            posts.push(post);
        }
    }

    Ok(Json(json!({ "status": "success", "data": { "posts": posts } })).into_response())
}

#[derive(Deserialize)]
pub(crate) struct CreatePostBody {
    description: String,
    images: Option<Vec<String>>,
    location: Option<String>,
}

#[debug_handler]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    Identity(user_id): Identity,
    Json(body): Json<CreatePostBody>,
) -> AppResult<Response> {
    if body.description.trim().is_empty() {
        return Err(AppError::invalid("a post must have a description"));
    }

    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO posts (id,user_id,description,location) VALUES (?,?,?,?)")
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(body.description.trim())
        .bind(&body.location)
        .execute(&db_pool)
        .await?;

    for (position, filename) in body.images.unwrap_or_default().into_iter().enumerate() {
        sqlx::query("INSERT INTO post_images (post_id,position,filename) VALUES (?,?,?)")
            .bind(id.to_string())
            .bind(position as i64)
            .bind(&filename)
            .execute(&db_pool)
            .await?;
    }

    let post = load_post(&db_pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("no post found with that ID"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": { "post": post } })),
    )
        .into_response())
}

/// Fetching a post also records the caller in its unique-viewer set, so
/// the returned view count includes this visit.
#[debug_handler]
pub(crate) async fn get_post(
    State(db_pool): State<SqlitePool>,
    Identity(viewer): Identity,
    Path(post_id): Path<Uuid>,
) -> AppResult<Response> {
    if sqlx::query("SELECT 1 FROM posts WHERE id=?")
        .bind(post_id.to_string())
        .fetch_optional(&db_pool)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("no post found with that ID"));
    }

    engagement::record_view(&db_pool, post_id, viewer).await?;

    let post = load_post(&db_pool, post_id)
        .await?
        .ok_or_else(|| AppError::not_found("no post found with that ID"))?;
    let post_comments = comments::comments_for_post(&db_pool, post_id).await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "post": post, "comments": post_comments },
    }))
    .into_response())
}

#[derive(Deserialize)]
pub(crate) struct UpdatePostBody {
    description: Option<String>,
    images: Option<Vec<String>>,
    location: Option<String>,
}

#[debug_handler]
pub(crate) async fn update(
    State(db_pool): State<SqlitePool>,
    Identity(actor): Identity,
    Path(post_id): Path<Uuid>,
    Json(body): Json<UpdatePostBody>,
) -> AppResult<Response> {
    owned_post(&db_pool, post_id, actor).await?;

    sqlx::query(
        "UPDATE posts SET description=COALESCE(?,description), location=COALESCE(?,location)
         WHERE id=?",
    )
    .bind(&body.description)
    .bind(&body.location)
    .bind(post_id.to_string())
    .execute(&db_pool)
    .await?;

    if let Some(images) = body.images {
        sqlx::query("DELETE FROM post_images WHERE post_id=?")
            .bind(post_id.to_string())
            .execute(&db_pool)
            .await?;
        for (position, filename) in images.into_iter().enumerate() {
            sqlx::query("INSERT INTO post_images (post_id,position,filename) VALUES (?,?,?)")
                .bind(post_id.to_string())
                .bind(position as i64)
                .bind(&filename)
                .execute(&db_pool)
                .await?;
        }
    }

    let post = load_post(&db_pool, post_id)
        .await?
        .ok_or_else(|| AppError::not_found("no post found with that ID"))?;

    Ok(Json(json!({ "status": "success", "data": { "post": post } })).into_response())
}

#[debug_handler]
pub(crate) async fn delete(
    State(db_pool): State<SqlitePool>,
    Identity(actor): Identity,
    Path(post_id): Path<Uuid>,
) -> AppResult<Response> {
    owned_post(&db_pool, post_id, actor).await?;

    let mut tx = db_pool.begin().await?;
    for table in ["post_images", "comments", "post_likes", "post_views"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE post_id=?"))
            .bind(post_id.to_string())
            .execute(&mut *tx)
            .await?;
    }
    sqlx::query("DELETE FROM posts WHERE id=?")
        .bind(post_id.to_string())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn owned_post(db: &SqlitePool, post_id: Uuid, actor: Uuid) -> AppResult<()> {
    let Some((owner,)): Option<(String,)> = sqlx::query_as("SELECT user_id FROM posts WHERE id=?")
        .bind(post_id.to_string())
        .fetch_optional(db)
        .await?
    else {
        return Err(AppError::not_found(
            "no post found with that ID, maybe it has already been deleted",
        ));
    };

    if owner != actor.to_string() {
        return Err(AppError::invalid("you can only modify your own posts"));
    }

    Ok(())
}
