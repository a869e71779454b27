use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;
use uuid::Uuid;

use super::cookie::read_cookie;
use crate::{error::AppError, state::AppState};

/// The logged-in user behind the request's session cookie.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub token: String,
}

/// Like [`SessionUser`] but a missing or stale session is not an error.
/// Store failures still reject the request.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<SessionUser>);

async fn lookup(parts: &Parts, state: &AppState) -> Result<Option<SessionUser>, AppError> {
    let Some(token) = read_cookie(&parts.headers, &state.config.session.cookie_name) else {
        return Ok(None);
    };
    match state.sessions.resolve_session(token).await? {
        Some(user_id) => Ok(Some(SessionUser {
            user_id,
            token: token.to_string(),
        })),
        None => {
            debug!("session cookie did not resolve");
            Ok(None)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        lookup(parts, state)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        Ok(MaybeSession(lookup(parts, state).await?))
    }
}
