use lazy_static::lazy_static;
use regex::Regex;
use tracing::instrument;

use crate::{
    auth::{
        dto::{SignupRequest, UserResponse, UserSummary},
        password::hash_password,
        repo_types::{NewUser, User},
    },
    error::AppError,
    state::AppState,
};

pub(crate) const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.\-]{1,64}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

/// Checks a signup payload and hashes its password. All field problems are
/// reported together.
pub async fn prepare_signup(req: SignupRequest) -> Result<NewUser, AppError> {
    let mut errors = Vec::new();

    let username = req.username.as_deref().map(str::trim).unwrap_or_default();
    if username.is_empty() {
        errors.push("Username must be present.".to_string());
    } else if !is_valid_username(username) {
        errors.push(
            "Username may only contain letters, digits, '.', '_' and '-' (max 64).".to_string(),
        );
    }

    let password = req.password.unwrap_or_default();
    if password.is_empty() {
        errors.push("Password must be present.".to_string());
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let password_hash = hash_password(password).await?;
    Ok(NewUser {
        username: username.to_string(),
        password_hash,
        bio: req.bio.unwrap_or_default(),
        image_url: req.image_url.unwrap_or_default(),
    })
}

/// Serializable view of a user together with the recipes they own.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn load_user_response(state: &AppState, user: &User) -> anyhow::Result<UserResponse> {
    let recipes = state.recipes.list_recipes_by_user(user.id).await?;
    Ok(UserResponse {
        user: UserSummary::from(user),
        recipes: recipes.iter().map(Into::into).collect(),
    })
}
