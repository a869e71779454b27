use async_trait::async_trait;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    auth::repo_types::{NewUser, User},
    db::{classify, PgStore},
};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; a duplicate username fails with `StoreError::UsernameTaken`.
    async fn create_user(&self, new: NewUser) -> anyhow::Result<User>;
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;
}

#[async_trait]
impl UserStore for PgStore {
    #[instrument(skip(self, new), fields(username = %new.username))]
    async fn create_user(&self, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, bio, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, password_hash, bio, image_url, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(&new.bio)
        .bind(&new.image_url)
        .fetch_one(&self.db)
        .await
        .map_err(|e| classify(e, "insert user"))?;
        debug!(user_id = %user.id, "user row inserted");
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, bio, image_url, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, bio, image_url, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}
