use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::db::{classify, PgStore};

/// A freshly opened session. `token` is only ever handed to the client.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, user_id: Uuid, ttl: Duration) -> anyhow::Result<NewSession>;
    /// Owner of a live session; expired or unknown tokens yield `None`.
    async fn resolve_session(&self, token: &str) -> anyhow::Result<Option<Uuid>>;
    async fn revoke_session(&self, token: &str) -> anyhow::Result<()>;
    async fn purge_expired_sessions(&self) -> anyhow::Result<u64>;
}

pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Digest stored in place of the token.
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    Base64UrlUnpadded::encode_string(digest.as_slice())
}

#[async_trait]
impl SessionStore for PgStore {
    #[instrument(skip(self))]
    async fn create_session(&self, user_id: Uuid, ttl: Duration) -> anyhow::Result<NewSession> {
        let token = generate_token();
        let expires_at = OffsetDateTime::now_utc()
            .checked_add(ttl)
            .context("session expiry out of range")?;
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(hash_token(&token))
        .bind(expires_at)
        .execute(&self.db)
        .await
        .map_err(|e| classify(e, "insert session"))?;
        debug!(%user_id, %expires_at, "session created");
        Ok(NewSession { token, expires_at })
    }

    async fn resolve_session(&self, token: &str) -> anyhow::Result<Option<Uuid>> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id
              FROM sessions
             WHERE token_hash = $1
               AND expires_at > now()
            "#,
        )
        .bind(hash_token(token))
        .fetch_optional(&self.db)
        .await
        .context("resolve session")?;
        Ok(user_id)
    }

    async fn revoke_session(&self, token: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(hash_token(token))
            .execute(&self.db)
            .await
            .context("revoke session")?;
        Ok(())
    }

    async fn purge_expired_sessions(&self) -> anyhow::Result<u64> {
        let done = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.db)
            .await
            .context("purge sessions")?;
        Ok(done.rows_affected())
    }
}

/// Periodically drops expired sessions until the runtime shuts down.
pub fn spawn_purger(store: Arc<dyn SessionStore>, every: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.purge_expired_sessions().await {
                Ok(0) => {}
                Ok(n) => info!(purged = n, "expired sessions removed"),
                Err(e) => warn!(error = ?e, "session purge failed"),
            }
        }
    })
}
