use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use content_platform_api::app::{router, AppState};
use content_platform_api::config::AppConfig;
use content_platform_api::database::{DatabaseManager, Stores};
use content_platform_api::services::RetentionSweeper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting content platform API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set");
    }

    let database = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    database.migrate().await.context("failed to apply migrations")?;

    let stores = Stores::postgres(database.pool().clone());

    let sweeper = Arc::new(RetentionSweeper::new(stores.clone(), &config.retention));
    let sweep_task = sweeper.spawn_daily(config.retention.run_at);

    let port = config.api.port;
    let state = AppState::new(config, stores)?;
    let app = router(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Content platform API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    sweep_task.abort();
    database.close().await;
    Ok(())
}
