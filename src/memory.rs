use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};
use uuid::Uuid;

use crate::{
    auth::{
        dto::UserSummary,
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    db::StoreError,
    recipes::{
        repo::RecipeStore,
        repo_types::{NewRecipe, Recipe, RecipeWithAuthor},
    },
    sessions::store::{generate_token, hash_token, NewSession, SessionStore},
};

#[derive(Debug, Clone)]
struct SessionRow {
    user_id: Uuid,
    expires_at: OffsetDateTime,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    recipes: Vec<Recipe>,
    sessions: HashMap<String, SessionRow>,
}

/// Process-local store with the same constraints as the PostgreSQL schema.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    #[instrument(skip(self, new), fields(username = %new.username))]
    async fn create_user(&self, new: NewUser) -> anyhow::Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == new.username) {
            return Err(StoreError::UsernameTaken.into());
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            password_hash: new.password_hash,
            bio: new.bio,
            image_url: new.image_url,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.insert(user.id, user.clone());
        debug!(user_id = %user.id, "user saved to memory storage");
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    #[instrument(skip(self, new), fields(user_id = %new.user_id))]
    async fn create_recipe(&self, new: NewRecipe) -> anyhow::Result<Recipe> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&new.user_id) {
            return Err(StoreError::UnknownUser.into());
        }
        let recipe = Recipe {
            id: Uuid::new_v4(),
            title: new.title,
            instructions: new.instructions,
            minutes_to_complete: Some(new.minutes_to_complete),
            user_id: new.user_id,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.recipes.push(recipe.clone());
        debug!(recipe_id = %recipe.id, "recipe saved to memory storage");
        Ok(recipe)
    }

    async fn list_recipes(&self) -> anyhow::Result<Vec<RecipeWithAuthor>> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .iter()
            .filter_map(|r| {
                tables.users.get(&r.user_id).map(|u| RecipeWithAuthor {
                    recipe: r.clone(),
                    author: UserSummary::from(u),
                })
            })
            .collect())
    }

    async fn list_recipes_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Recipe>> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, user_id: Uuid, ttl: Duration) -> anyhow::Result<NewSession> {
        let expires_at = OffsetDateTime::now_utc()
            .checked_add(ttl)
            .context("session expiry out of range")?;
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::UnknownUser.into());
        }
        let token = generate_token();
        tables.sessions.insert(
            hash_token(&token),
            SessionRow {
                user_id,
                expires_at,
            },
        );
        trace!(%user_id, "session created in memory");
        Ok(NewSession { token, expires_at })
    }

    async fn resolve_session(&self, token: &str) -> anyhow::Result<Option<Uuid>> {
        let tables = self.tables.read().await;
        let now = OffsetDateTime::now_utc();
        Ok(tables
            .sessions
            .get(&hash_token(token))
            .filter(|s| s.expires_at > now)
            .map(|s| s.user_id))
    }

    async fn revoke_session(&self, token: &str) -> anyhow::Result<()> {
        self.tables.write().await.sessions.remove(&hash_token(token));
        Ok(())
    }

    async fn purge_expired_sessions(&self) -> anyhow::Result<u64> {
        let mut tables = self.tables.write().await;
        let now = OffsetDateTime::now_utc();
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.expires_at > now);
        Ok((before - tables.sessions.len()) as u64)
    }
}
