use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, SignupRequest, UserResponse},
        password::verify_password,
        services::{load_user_response, prepare_signup, INVALID_CREDENTIALS},
    },
    error::{AppError, JsonBody, MessageResponse},
    sessions::{
        cookie::{expired_cookie, session_cookie},
        MaybeSession,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", delete(logout))
        .route("/check_session", get(check_session))
}

/// Opens a session for `user_id` and returns the `Set-Cookie` header for it.
async fn open_session(state: &AppState, user_id: Uuid) -> Result<HeaderMap, AppError> {
    let cfg = &state.config.session;
    let session = state
        .sessions
        .create_session(user_id, cfg.ttl())
        .await?;
    debug!(%user_id, expires_at = %session.expires_at, "session opened");
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, session_cookie(cfg, &session.token)?);
    Ok(headers)
}

#[instrument(skip(state, previous, payload))]
pub async fn signup(
    State(state): State<AppState>,
    MaybeSession(previous): MaybeSession,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> Result<(StatusCode, HeaderMap, Json<UserResponse>), AppError> {
    let new_user = prepare_signup(payload).await?;
    let user = state.users.create_user(new_user).await.map_err(|e| {
        let err = AppError::from(e);
        if matches!(err, AppError::Unprocessable(_)) {
            warn!("username already taken");
        }
        err
    })?;

    if let Some(old) = previous {
        state.sessions.revoke_session(&old.token).await?;
    }
    let headers = open_session(&state, user.id).await?;
    let body = load_user_response(&state, &user).await?;

    info!(user_id = %user.id, username = %user.username, "user signed up");
    Ok((StatusCode::CREATED, headers, Json(body)))
}

#[instrument(skip(state, previous, payload))]
pub async fn login(
    State(state): State<AppState>,
    MaybeSession(previous): MaybeSession,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<(HeaderMap, Json<UserResponse>), AppError> {
    let username = payload.username.as_deref().map(str::trim).unwrap_or_default();
    let password = payload.password.unwrap_or_default();
    if username.is_empty() || password.is_empty() {
        warn!("login with missing credentials");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let Some(user) = state.users.find_user_by_username(username).await? else {
        warn!(%username, "login unknown username");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    if let Some(old) = previous {
        state.sessions.revoke_session(&old.token).await?;
    }
    let headers = open_session(&state, user.id).await?;
    let body = load_user_response(&state, &user).await?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok((headers, Json(body)))
}

#[instrument(skip(state, session))]
pub async fn check_session(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> Result<Json<UserResponse>, AppError> {
    let Some(session) = session else {
        return Err(AppError::unauthorized("Not logged in"));
    };
    let Some(user) = state.users.find_user(session.user_id).await? else {
        warn!(user_id = %session.user_id, "session refers to a missing user");
        return Err(AppError::unauthorized("Not logged in"));
    };
    Ok(Json(load_user_response(&state, &user).await?))
}

#[instrument(skip(state, session))]
pub async fn logout(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> Result<(HeaderMap, Json<MessageResponse>), AppError> {
    if let Some(session) = session {
        state.sessions.revoke_session(&session.token).await?;
        info!(user_id = %session.user_id, "user logged out");
    }
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, expired_cookie(&state.config.session)?);
    Ok((
        headers,
        Json(MessageResponse {
            message: "Successfully logged out".into(),
        }),
    ))
}
