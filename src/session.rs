use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

use crate::AppError;

pub const USER_ID: &str = "user_id";

/// The authenticated caller, resolved from the session cookie.
///
/// Every protected handler takes this extractor, so the acting identity is
/// an explicit argument rather than ambient request state.
pub struct Identity(pub Uuid);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(anyhow::Error::msg(msg)))?;

        let Some(user_id) = session.get::<String>(USER_ID).await? else {
            return Err(AppError::Unauthorized);
        };

        let user_id = Uuid::parse_str(&user_id).map_err(|_| AppError::Unauthorized)?;
        Ok(Identity(user_id))
    }
}
