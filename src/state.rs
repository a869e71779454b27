use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    auth::repo::UserStore, config::AppConfig, db::PgStore, memory::MemoryStore,
    recipes::repo::RecipeStore, sessions::SessionStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub recipes: Arc<dyn RecipeStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        match config.database_url.clone() {
            Some(url) => {
                let store = PgStore::connect(&config, &url).await?;
                info!("using PostgreSQL store");
                Ok(Self::from_store(config, store))
            }
            None => {
                warn!("DATABASE_URL not set; data lives in memory and is lost on restart");
                Ok(Self::from_store(config, MemoryStore::new()))
            }
        }
    }

    pub fn from_store<S>(config: Arc<AppConfig>, store: S) -> Self
    where
        S: UserStore + RecipeStore + SessionStore + Clone + 'static,
    {
        Self {
            config,
            users: Arc::new(store.clone()),
            recipes: Arc::new(store.clone()),
            sessions: Arc::new(store),
        }
    }

    /// State over a fresh [`MemoryStore`] with short-lived test sessions.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(AppConfig::for_tests()), MemoryStore::new())
    }
}
