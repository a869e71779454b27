use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::config::AppConfig;

/// Domain conflicts raised by the stores, carried inside `anyhow::Error`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("username already taken")]
    UsernameTaken,
    #[error("referenced user does not exist")]
    UnknownUser,
}

/// PostgreSQL-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pub db: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig, database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;

        Ok(Self { db })
    }
}

/// Unique index on `users.username`, see the first migration.
pub(crate) const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Maps constraint violations onto [`StoreError`]; everything else passes through.
pub(crate) fn classify(err: sqlx::Error, context: &'static str) -> anyhow::Error {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(conflict) = conflict_for(
            db_err.is_unique_violation(),
            db_err.is_foreign_key_violation(),
            db_err.constraint(),
        ) {
            return conflict.into();
        }
    }
    anyhow::Error::new(err).context(context)
}

fn conflict_for(unique: bool, foreign_key: bool, constraint: Option<&str>) -> Option<StoreError> {
    if unique && constraint == Some(USERNAME_CONSTRAINT) {
        Some(StoreError::UsernameTaken)
    } else if foreign_key {
        Some(StoreError::UnknownUser)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_username_index_means_taken() {
        assert_eq!(
            conflict_for(true, false, Some(USERNAME_CONSTRAINT)),
            Some(StoreError::UsernameTaken)
        );
        assert_eq!(conflict_for(true, false, Some("sessions_token_hash_key")), None);
        assert_eq!(conflict_for(true, false, None), None);
    }

    #[test]
    fn foreign_key_means_unknown_user() {
        assert_eq!(
            conflict_for(false, true, Some("recipes_user_id_fkey")),
            Some(StoreError::UnknownUser)
        );
        assert_eq!(conflict_for(false, false, None), None);
    }

    #[test]
    fn other_errors_keep_their_context() {
        let err = classify(sqlx::Error::RowNotFound, "insert user");
        assert!(err.downcast_ref::<StoreError>().is_none());
        assert_eq!(err.to_string(), "insert user");
    }
}
