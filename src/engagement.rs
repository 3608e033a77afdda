//! Like, friendship and view state over the edge tables.
//!
//! Likes and friendships are toggles; both run inside a single transaction
//! so concurrent requests can never observe (or commit) a half-applied
//! state. Views use `INSERT OR IGNORE`, the storage layer's
//! set-add-if-absent, so repeat views are no-ops.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult};

/// Flips whether `actor` likes `post_id`. Returns the new state: true if
/// the post is now liked. Unlike deletes the edge row outright, so a like
/// count is always `COUNT(*)` with no stale entries.
pub async fn toggle_like(db: &SqlitePool, post_id: Uuid, actor: Uuid) -> AppResult<bool> {
    let mut tx = db.begin().await?;

    if sqlx::query("SELECT 1 FROM posts WHERE id=?")
        .bind(post_id.to_string())
        .fetch_optional(&mut *tx)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("no post found with that ID"));
    }

    let removed = sqlx::query("DELETE FROM post_likes WHERE post_id=? AND user_id=?")
        .bind(post_id.to_string())
        .bind(actor.to_string())
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let liked = removed == 0;
    if liked {
        sqlx::query("INSERT INTO post_likes (post_id,user_id) VALUES (?,?)")
            .bind(post_id.to_string())
            .bind(actor.to_string())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(liked)
}

/// Flips the friendship edge between two users. Both directions of the edge
/// are written (or removed) in one transaction, so the relation stays
/// symmetric even if the process dies mid-request. Returns true if the two
/// are now friends.
pub async fn toggle_friend(db: &SqlitePool, user_id: Uuid, friend_id: Uuid) -> AppResult<bool> {
    if user_id == friend_id {
        return Err(AppError::invalid("you cannot friend yourself"));
    }

    let mut tx = db.begin().await?;

    for id in [user_id, friend_id] {
        if sqlx::query("SELECT 1 FROM users WHERE id=? AND active=1")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("no user found with that ID"));
        }
    }

    let removed = sqlx::query(
        "DELETE FROM friendships WHERE (user_id=? AND friend_id=?) OR (user_id=? AND friend_id=?)",
    )
    .bind(user_id.to_string())
    .bind(friend_id.to_string())
    .bind(friend_id.to_string())
    .bind(user_id.to_string())
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let befriended = removed == 0;
    if befriended {
        for (a, b) in [(user_id, friend_id), (friend_id, user_id)] {
            sqlx::query("INSERT INTO friendships (user_id,friend_id) VALUES (?,?)")
                .bind(a.to_string())
                .bind(b.to_string())
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(befriended)
}

/// Records that `viewer` has seen `post_id`. Idempotent; the caller has
/// already resolved the post.
pub async fn record_view(db: &SqlitePool, post_id: Uuid, viewer: Uuid) -> AppResult<()> {
    sqlx::query("INSERT OR IGNORE INTO post_views (post_id,user_id) VALUES (?,?)")
        .bind(post_id.to_string())
        .bind(viewer.to_string())
        .execute(db)
        .await?;

    Ok(())
}

pub async fn likers(db: &SqlitePool, post_id: Uuid) -> AppResult<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT user_id FROM post_likes WHERE post_id=?")
        .bind(post_id.to_string())
        .fetch_all(db)
        .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn viewers(db: &SqlitePool, post_id: Uuid) -> AppResult<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT user_id FROM post_views WHERE post_id=?")
        .bind(post_id.to_string())
        .fetch_all(db)
        .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// View count is derived from the edge table, never stored.
pub async fn view_count(db: &SqlitePool, post_id: Uuid) -> AppResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM post_views WHERE post_id=?")
        .bind(post_id.to_string())
        .fetch_one(db)
        .await?;

    Ok(count)
}

pub async fn friend_ids(db: &SqlitePool, user_id: Uuid) -> AppResult<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT friend_id FROM friendships WHERE user_id=?")
        .bind(user_id.to_string())
        .fetch_all(db)
        .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}
