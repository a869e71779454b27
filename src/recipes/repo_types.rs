use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: i32,
    pub user_id: Uuid,
}

/// Recipe joined with the columns of its author.
#[derive(Debug, FromRow)]
pub struct RecipeWithAuthorRow {
    pub id: Uuid,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub author_username: String,
    pub author_bio: String,
    pub author_image_url: String,
}

#[derive(Debug, Clone)]
pub struct RecipeWithAuthor {
    pub recipe: Recipe,
    pub author: UserSummary,
}

impl From<RecipeWithAuthorRow> for RecipeWithAuthor {
    fn from(r: RecipeWithAuthorRow) -> Self {
        Self {
            author: UserSummary {
                id: r.user_id,
                username: r.author_username,
                bio: r.author_bio,
                image_url: r.author_image_url,
            },
            recipe: Recipe {
                id: r.id,
                title: r.title,
                instructions: r.instructions,
                minutes_to_complete: r.minutes_to_complete,
                user_id: r.user_id,
                created_at: r.created_at,
            },
        }
    }
}
