use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mingle::{app, db};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

async fn test_app() -> Router {
    // one connection: each sqlite :memory: connection is its own database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init_schema(&pool).await.unwrap();
    app(pool, 30)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, set_cookie, body)
}

async fn signup(app: &Router, first_name: &str, email: &str) -> (String, String) {
    let (status, cookie, body) = send(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "first_name": first_name, "last_name": "Test", "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let user_id = body["data"]["user"]["id"].as_str().unwrap().to_string();
    (user_id, cookie.unwrap())
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = test_app().await;

    let (status, _, _) = send(&app, "GET", "/posts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn like_view_and_friend_flow() {
    let app = test_app().await;
    let (ada, ada_cookie) = signup(&app, "Ada", "ada@example.com").await;
    let (grace, grace_cookie) = signup(&app, "Grace", "grace@example.com").await;

    // Ada posts
    let (status, _, body) = send(
        &app,
        "POST",
        "/posts",
        Some(&ada_cookie),
        Some(json!({ "description": "first post", "images": ["a.jpeg"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let post_id = body["data"]["post"]["id"].as_str().unwrap().to_string();

    // Grace likes, then unlikes; the map holds no leftover entry
    let (status, _, body) = send(
        &app,
        "POST",
        &format!("/posts/like/{post_id}"),
        Some(&grace_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["post"]["likes"][&grace], json!(true));

    let (_, _, body) = send(
        &app,
        "POST",
        &format!("/posts/like/{post_id}"),
        Some(&grace_cookie),
        None,
    )
    .await;
    assert_eq!(body["data"]["post"]["likes"], json!({}));

    // three reads, one view
    for _ in 0..3 {
        send(
            &app,
            "GET",
            &format!("/posts/{post_id}"),
            Some(&grace_cookie),
            None,
        )
        .await;
    }
    let (status, _, body) = send(
        &app,
        "GET",
        &format!("/posts/{post_id}"),
        Some(&grace_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["post"]["views"], json!(1));
    assert_eq!(body["data"]["post"]["viewed_by"], json!([grace]));

    // friendship toggles symmetrically
    let (status, _, body) = send(
        &app,
        "PATCH",
        &format!("/users/{ada}/{grace}"),
        Some(&ada_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["friends"][0]["id"], json!(grace));

    let (_, _, body) = send(
        &app,
        "GET",
        &format!("/users/friends/{grace}"),
        Some(&grace_cookie),
        None,
    )
    .await;
    assert_eq!(body["data"]["friends"][0]["id"], json!(ada));

    let (_, _, body) = send(
        &app,
        "PATCH",
        &format!("/users/{ada}/{grace}"),
        Some(&ada_cookie),
        None,
    )
    .await;
    assert_eq!(body["data"]["friends"], json!([]));

    let (_, _, body) = send(
        &app,
        "GET",
        &format!("/users/friends/{grace}"),
        Some(&grace_cookie),
        None,
    )
    .await;
    assert_eq!(body["data"]["friends"], json!([]));
}

#[tokio::test]
async fn friendship_guards() {
    let app = test_app().await;
    let (ada, ada_cookie) = signup(&app, "Ada", "ada@example.com").await;
    let (grace, _) = signup(&app, "Grace", "grace@example.com").await;

    // no self-friending
    let (status, _, _) = send(
        &app,
        "PATCH",
        &format!("/users/{ada}/{ada}"),
        Some(&ada_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // only your own edge
    let (status, _, _) = send(
        &app,
        "PATCH",
        &format!("/users/{grace}/{ada}"),
        Some(&ada_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // unknown endpoint user
    let unknown = uuid::Uuid::now_v7();
    let (status, _, _) = send(
        &app,
        "PATCH",
        &format!("/users/{ada}/{unknown}"),
        Some(&ada_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comment_lifecycle() {
    let app = test_app().await;
    let (_, ada_cookie) = signup(&app, "Ada", "ada@example.com").await;
    let (_, grace_cookie) = signup(&app, "Grace", "grace@example.com").await;

    let (_, _, body) = send(
        &app,
        "POST",
        "/posts",
        Some(&ada_cookie),
        Some(json!({ "description": "first post" })),
    )
    .await;
    let post_id = body["data"]["post"]["id"].as_str().unwrap().to_string();

    // commenter name defaults to the caller's first name
    let (status, _, body) = send(
        &app,
        "POST",
        &format!("/comments/{post_id}"),
        Some(&grace_cookie),
        Some(json!({ "comment": "nice one" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["comment"]["name"], json!("Grace"));
    let comment_id = body["data"]["comment"]["id"].as_str().unwrap().to_string();

    let (_, _, body) = send(
        &app,
        "GET",
        &format!("/posts/{post_id}"),
        Some(&ada_cookie),
        None,
    )
    .await;
    assert_eq!(body["data"]["comments"][0]["comment"], json!("nice one"));

    let (status, _, _) = send(
        &app,
        "DELETE",
        &format!("/comments/{comment_id}"),
        Some(&grace_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // deleting again is NotFound, not a silent success
    let (status, _, _) = send(
        &app,
        "DELETE",
        &format!("/comments/{comment_id}"),
        Some(&grace_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_posts_are_not_found() {
    let app = test_app().await;
    let (_, cookie) = signup(&app, "Ada", "ada@example.com").await;
    let unknown = uuid::Uuid::now_v7();

    for (method, uri) in [
        ("GET", format!("/posts/{unknown}")),
        ("DELETE", format!("/posts/{unknown}")),
        ("POST", format!("/posts/like/{unknown}")),
    ] {
        let (status, _, _) = send(&app, method, &uri, Some(&cookie), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
    }
}

#[tokio::test]
async fn profile_updates_filter_fields() {
    let app = test_app().await;
    let (ada, cookie) = signup(&app, "Ada", "ada@example.com").await;

    let (status, _, _) = send(
        &app,
        "PATCH",
        "/users/updateProfile",
        Some(&cookie),
        Some(json!({ "password": "hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = send(
        &app,
        "PATCH",
        "/users/updateProfile",
        Some(&cookie),
        Some(json!({ "bio": "mathematician", "occupation": "analyst" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], json!(ada));
    assert_eq!(body["data"]["user"]["bio"], json!("mathematician"));
    assert_eq!(body["data"]["user"]["first_name"], json!("Ada"));
}

#[tokio::test]
async fn deactivated_accounts_disappear() {
    let app = test_app().await;
    let (ada, ada_cookie) = signup(&app, "Ada", "ada@example.com").await;
    let (_, grace_cookie) = signup(&app, "Grace", "grace@example.com").await;

    let (status, _, _) = send(&app, "DELETE", "/users/deleteMe", Some(&ada_cookie), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(
        &app,
        "GET",
        &format!("/users/{ada}"),
        Some(&grace_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
