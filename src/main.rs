use std::time::Duration;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod memory;
mod recipes;
mod sessions;
mod state;

use crate::{config::AppConfig, sessions::store::spawn_purger, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "recipeshare=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let app_state = AppState::init(config.clone()).await?;

    let purger = spawn_purger(
        app_state.sessions.clone(),
        Duration::from_secs(config.session.purge_interval_secs.max(1)),
    );

    let app = app::build_app(app_state);
    let result = app::serve(app, &config).await;
    purger.abort();
    result
}
