use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{session::Identity, AppError, AppResult, AppState};

pub fn router() -> Router<AppState> {
    // POST takes a post id, DELETE a comment id
    Router::new().route("/{id}", post(create).delete(delete_comment))
}

#[derive(Deserialize)]
pub(crate) struct CreateCommentBody {
    comment: String,
    name: Option<String>,
}

#[debug_handler]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    Identity(user_id): Identity,
    Path(post_id): Path<Uuid>,
    Json(body): Json<CreateCommentBody>,
) -> AppResult<Response> {
    if body.comment.trim().is_empty() {
        return Err(AppError::invalid("a comment cannot be empty"));
    }

    if sqlx::query("SELECT 1 FROM posts WHERE id=?")
        .bind(post_id.to_string())
        .fetch_optional(&db_pool)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("no post found with that ID"));
    }

    // commenter name falls back to the caller's first name
    let name = match body.name {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            let (first_name,): (String,) =
                sqlx::query_as("SELECT first_name FROM users WHERE id=?")
                    .bind(user_id.to_string())
                    .fetch_one(&db_pool)
                    .await?;
            first_name
        }
    };

    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO comments (id,post_id,user_id,name,comment) VALUES (?,?,?,?,?)")
        .bind(id.to_string())
        .bind(post_id.to_string())
        .bind(user_id.to_string())
        .bind(&name)
        .bind(body.comment.trim())
        .execute(&db_pool)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": { "comment": {
                "id": id,
                "post": post_id,
                "user": user_id,
                "name": name,
                "comment": body.comment.trim(),
            } },
        })),
    )
        .into_response())
}

#[debug_handler]
pub(crate) async fn delete_comment(
    State(db_pool): State<SqlitePool>,
    Identity(_): Identity,
    Path(comment_id): Path<Uuid>,
) -> AppResult<Response> {
    let deleted = sqlx::query("DELETE FROM comments WHERE id=?")
        .bind(comment_id.to_string())
        .execute(&db_pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::not_found("no comment found with that ID"));
    }

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Comments for a post, each carrying the commenter's public card.
pub(crate) async fn comments_for_post(db: &SqlitePool, post_id: Uuid) -> AppResult<Vec<Value>> {
    type CommentRow = (String, String, String, String, String, Option<String>);

    let rows: Vec<CommentRow> = sqlx::query_as(
        "SELECT c.id,c.user_id,c.name,c.comment,c.created_at,u.photo
         FROM comments c LEFT JOIN users u ON u.id=c.user_id
         WHERE c.post_id=? ORDER BY c.created_at",
    )
    .bind(post_id.to_string())
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, user_id, name, comment, created_at, photo)| {
            json!({
                "id": id,
                "post": post_id,
                "user": { "id": user_id, "first_name": name.clone(), "photo": photo },
                "name": name,
                "comment": comment,
                "created_at": created_at,
            })
        })
        .collect())
}
