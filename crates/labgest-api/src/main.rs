//! Labgest API Server
//!
//! Initialization order matters: configuration first (a missing JWT
//! secret must fail here, not on the first login), then the backends,
//! then the router.

use anyhow::Context;
use labgest_api::notify::RedisNotificationBus;
use labgest_api::repository::UserRepository;
use labgest_api::session::RedisSessionStore;
use labgest_api::{create_router, state::AppState};
use labgest_core::AppConfig;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "labgest_api={0},tower_http={0}",
            config.logging.level
        ))
    });
    if config.logging.json_format {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let db = PgPoolOptions::new()
        .max_connections(config.database.pool_size)
        .connect(&config.database.url)
        .await
        .context("connecting to Postgres")?;

    let sessions = Arc::new(
        RedisSessionStore::connect(&config.redis.url, config.auth.token_ttl())
            .await
            .context("connecting to Redis (sessions)")?,
    );
    let notifier = Arc::new(
        RedisNotificationBus::connect(&config.redis.url)
            .await
            .context("connecting to Redis (notifications)")?,
    );
    let accounts = Arc::new(UserRepository::new(db.clone()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(
        config,
        db,
        accounts,
        sessions.clone(),
        sessions,
        notifier,
    ));

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("labgest API server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
