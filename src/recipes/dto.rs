use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::dto::UserSummary,
    recipes::repo_types::{Recipe, RecipeWithAuthor},
};

#[derive(Debug, Default, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub minutes_to_complete: Option<i64>,
}

/// Recipe without its author, as listed under a user.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: Uuid,
}

impl From<&Recipe> for RecipeSummary {
    fn from(r: &Recipe) -> Self {
        Self {
            id: r.id,
            title: r.title.clone(),
            instructions: r.instructions.clone(),
            minutes_to_complete: r.minutes_to_complete,
            user_id: r.user_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    #[serde(flatten)]
    pub recipe: RecipeSummary,
    pub user: UserSummary,
}

impl From<RecipeWithAuthor> for RecipeResponse {
    fn from(r: RecipeWithAuthor) -> Self {
        Self {
            recipe: RecipeSummary::from(&r.recipe),
            user: r.author,
        }
    }
}
