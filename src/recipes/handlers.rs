use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::{
    error::{AppError, JsonBody},
    recipes::{
        dto::{CreateRecipeRequest, RecipeResponse},
        repo_types::RecipeWithAuthor,
        services::prepare_recipe,
    },
    sessions::SessionUser,
    state::AppState,
};

pub fn recipe_routes() -> Router<AppState> {
    Router::new().route("/recipes", get(list_recipes).post(create_recipe))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    let recipes = state.recipes.list_recipes().await?;
    Ok(Json(recipes.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, session, payload), fields(user_id = %session.user_id))]
pub async fn create_recipe(
    State(state): State<AppState>,
    session: SessionUser,
    JsonBody(payload): JsonBody<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), AppError> {
    let new_recipe = prepare_recipe(payload, session.user_id)?;

    let Some(author) = state.users.find_user(session.user_id).await? else {
        return Err(AppError::unauthorized("Unauthorized"));
    };
    let recipe = state.recipes.create_recipe(new_recipe).await?;

    info!(recipe_id = %recipe.id, title = %recipe.title, "recipe created");
    let body = RecipeWithAuthor {
        recipe,
        author: (&author).into(),
    };
    Ok((StatusCode::CREATED, Json(body.into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::NewUser;
    use uuid::Uuid;

    const INSTRUCTIONS: &str =
        "Simmer the tomatoes with garlic for twenty minutes, then blend until smooth.";

    async fn logged_in(state: &AppState, username: &str) -> SessionUser {
        let user = state
            .users
            .create_user(NewUser {
                username: username.into(),
                password_hash: "unused".into(),
                bio: "Soup person".into(),
                image_url: String::new(),
            })
            .await
            .unwrap();
        SessionUser {
            user_id: user.id,
            token: "unused".into(),
        }
    }

    fn body(title: &str, instructions: &str, minutes: i64) -> JsonBody<CreateRecipeRequest> {
        JsonBody(CreateRecipeRequest {
            title: Some(title.into()),
            instructions: Some(instructions.into()),
            minutes_to_complete: Some(minutes),
        })
    }

    #[tokio::test]
    async fn create_embeds_author_and_owner() {
        let state = AppState::in_memory();
        let session = logged_in(&state, "anna").await;

        let (status, Json(created)) = create_recipe(
            State(state.clone()),
            session.clone(),
            body("Tomato soup", INSTRUCTIONS, 30),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.recipe.user_id, session.user_id);
        assert_eq!(created.user.id, session.user_id);
        assert_eq!(created.user.username, "anna");
        assert_eq!(created.recipe.minutes_to_complete, Some(30));

        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(json["title"], "Tomato soup");
        assert_eq!(json["user"]["username"], "anna");
        assert!(json["user"].get("recipes").is_none());
    }

    #[tokio::test]
    async fn short_instructions_are_rejected_before_storage() {
        let state = AppState::in_memory();
        let session = logged_in(&state, "anna").await;

        let err = create_recipe(State(state.clone()), session, body("Soup", "Boil.", 5))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(state.recipes.list_recipes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn session_without_user_is_unauthorized() {
        let state = AppState::in_memory();
        let ghost = SessionUser {
            user_id: Uuid::new_v4(),
            token: "ghost".into(),
        };
        let err = create_recipe(State(state), ghost, body("Soup", INSTRUCTIONS, 5))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn list_is_public_and_includes_every_author() {
        let state = AppState::in_memory();
        let anna = logged_in(&state, "anna").await;
        let ben = logged_in(&state, "ben").await;
        create_recipe(State(state.clone()), anna, body("Soup", INSTRUCTIONS, 30))
            .await
            .unwrap();
        create_recipe(State(state.clone()), ben, body("Stew", INSTRUCTIONS, 90))
            .await
            .unwrap();

        let Json(all) = list_recipes(State(state)).await.unwrap();
        let pairs: Vec<_> = all
            .iter()
            .map(|r| (r.recipe.title.as_str(), r.user.username.as_str()))
            .collect();
        assert_eq!(pairs, [("Soup", "anna"), ("Stew", "ben")]);
    }

    #[tokio::test]
    async fn user_view_lists_own_recipes() {
        let state = AppState::in_memory();
        let anna = logged_in(&state, "anna").await;
        create_recipe(State(state.clone()), anna.clone(), body("Soup", INSTRUCTIONS, 30))
            .await
            .unwrap();

        let user = state.users.find_user(anna.user_id).await.unwrap().unwrap();
        let view = crate::auth::services::load_user_response(&state, &user)
            .await
            .unwrap();
        assert_eq!(view.recipes.len(), 1);
        assert_eq!(view.recipes[0].title, "Soup");
    }
}
