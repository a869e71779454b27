use async_trait::async_trait;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    db::{classify, PgStore},
    recipes::repo_types::{NewRecipe, Recipe, RecipeWithAuthor, RecipeWithAuthorRow},
};

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Insert a recipe; an unknown owner fails with `StoreError::UnknownUser`.
    async fn create_recipe(&self, new: NewRecipe) -> anyhow::Result<Recipe>;
    /// Every recipe with its author, oldest first.
    async fn list_recipes(&self) -> anyhow::Result<Vec<RecipeWithAuthor>>;
    async fn list_recipes_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Recipe>>;
}

#[async_trait]
impl RecipeStore for PgStore {
    #[instrument(skip(self, new), fields(user_id = %new.user_id))]
    async fn create_recipe(&self, new: NewRecipe) -> anyhow::Result<Recipe> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (id, title, instructions, minutes_to_complete, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, instructions, minutes_to_complete, user_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.instructions)
        .bind(new.minutes_to_complete)
        .bind(new.user_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| classify(e, "insert recipe"))?;
        debug!(recipe_id = %recipe.id, "recipe row inserted");
        Ok(recipe)
    }

    async fn list_recipes(&self) -> anyhow::Result<Vec<RecipeWithAuthor>> {
        let rows = sqlx::query_as::<_, RecipeWithAuthorRow>(
            r#"
            SELECT r.id, r.title, r.instructions, r.minutes_to_complete, r.user_id, r.created_at,
                   u.username  AS author_username,
                   u.bio       AS author_bio,
                   u.image_url AS author_image_url
              FROM recipes r
              JOIN users u ON u.id = r.user_id
             ORDER BY r.created_at ASC, r.id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_recipes_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, title, instructions, minutes_to_complete, user_id, created_at
              FROM recipes
             WHERE user_id = $1
             ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
