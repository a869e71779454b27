use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::repo_types::User, recipes::dto::RecipeSummary};

/// Request body for signup. Fields are optional so that missing values
/// surface as validation messages instead of decode errors.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Public part of a user, as embedded in recipes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub bio: String,
    pub image_url: String,
}

impl From<&User> for UserSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            bio: u.bio.clone(),
            image_url: u.image_url.clone(),
        }
    }
}

/// User returned by signup, login and check_session.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: UserSummary,
    pub recipes: Vec<RecipeSummary>,
}
