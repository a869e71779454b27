use std::{fmt::Display, str::FromStr};

use anyhow::Context;
use serde::Deserialize;

/// One year. Longer lifetimes are refused at startup.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_minutes: i64,
    pub secure: bool,
    pub purge_interval_secs: u64,
}

impl SessionConfig {
    pub fn ttl(&self) -> time::Duration {
        time::Duration::minutes(self.ttl_minutes)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "session".into()),
            ttl_minutes: parse_or("SESSION_TTL_MINUTES", 60 * 24 * 14)?,
            secure: parse_or("SESSION_COOKIE_SECURE", false)?,
            purge_interval_secs: parse_or("SESSION_PURGE_SECS", 3600)?,
        };
        check_ttl_minutes(session.ttl_minutes)?;
        Ok(Self {
            database_url,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_or("APP_PORT", 5555)?,
            session,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            session: SessionConfig {
                cookie_name: "session".into(),
                ttl_minutes: 5,
                secure: false,
                purge_interval_secs: 60,
            },
        }
    }
}

fn check_ttl_minutes(ttl_minutes: i64) -> anyhow::Result<()> {
    if !(1..=MAX_SESSION_TTL_MINUTES).contains(&ttl_minutes) {
        anyhow::bail!(
            "SESSION_TTL_MINUTES must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {ttl_minutes}"
        );
    }
    Ok(())
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}
