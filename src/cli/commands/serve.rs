use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Args;
use sqlx::PgPool;
use tracing::info;

use crate::app::{app, cors_layer, AppState};
use crate::authz::{Authorizer, GrantedCapabilities, PgAuthorizer};
use crate::config::{config, AppConfig, AuthorizationMode, StorageBackend};
use crate::database::{DatabaseManager, MemoryProductStore, PgProductStore, ProductStore};

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides PRODUCT_API_PORT/PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides HOST)")]
    pub host: Option<String>,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = config();
    info!("Starting Product API in {:?} mode", config.environment);

    let state = build_state(config).await?;
    let router = app(state, cors_layer(config.environment, &config.security));

    let host = args.host.as_deref().unwrap_or(&config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Product API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Product API stopped");
    Ok(())
}

/// Wire the configured store and authorizer. A pool is only opened when one of
/// them needs Postgres.
pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    if config.security.jwt_secret.is_empty() {
        bail!("JWT_SECRET must be set outside development");
    }

    let needs_pool = config.database.backend == StorageBackend::Postgres
        || config.security.authorization == AuthorizationMode::Database;
    let pool: Option<PgPool> = if needs_pool {
        let pool = DatabaseManager::connect(&config.database).await?;
        if config.database.run_migrations {
            DatabaseManager::migrate(&pool).await?;
        }
        Some(pool)
    } else {
        None
    };

    let store: Arc<dyn ProductStore> = match (&config.database.backend, &pool) {
        (StorageBackend::Postgres, Some(pool)) => Arc::new(PgProductStore::new(pool.clone())),
        _ => {
            tracing::warn!("Using in-memory product store; data is lost on restart");
            Arc::new(MemoryProductStore::new())
        }
    };

    let authorizer: Arc<dyn Authorizer> = match (&config.security.authorization, &pool) {
        (AuthorizationMode::Database, Some(pool)) => Arc::new(PgAuthorizer::new(pool.clone())),
        _ => Arc::new(GrantedCapabilities),
    };

    Ok(AppState::new(store, authorizer, config.security.jwt_secret.as_str()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
