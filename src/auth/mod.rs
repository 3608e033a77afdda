//! Account creation and session management.
//!
//! Credential verification (passwords, OTP, reset tokens) belongs to the
//! upstream identity provider; this module only creates accounts and
//! maintains the session the rest of the app authenticates against.

mod login;
mod logout;
mod signup;

use axum::{routing::post, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup::signup))
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
}
