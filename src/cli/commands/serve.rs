use anyhow::Context;
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::app::{app, AppState};
use crate::config::AppConfig;
use crate::database::{MemoryStore, PgStore};

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Bind address (overrides FOOD_API_HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Port (overrides FOOD_API_PORT / PORT)")]
    pub port: Option<u16>,

    #[arg(
        long,
        env = "FOOD_API_IN_MEMORY",
        help = "Keep data in process memory instead of PostgreSQL"
    )]
    pub in_memory: bool,
}

pub async fn handle(args: ServeArgs, mut config: AppConfig) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    if args.in_memory {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        let state = AppState::new(Arc::new(MemoryStore::new()), config)?;
        return serve(state, &bind_addr).await;
    }

    let store = Arc::new(
        PgStore::connect(&config.database)
            .await
            .context("failed to connect to database")?,
    );
    store.migrate().await.context("failed to apply migrations")?;

    let state = AppState::new(store.clone(), config)?;
    let result = serve(state, &bind_addr).await;
    store.close().await;
    result
}

async fn serve(state: AppState, bind_addr: &str) -> anyhow::Result<()> {
    let environment = state.config.environment;
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!(
        "food-api listening on http://{} ({:?})",
        listener.local_addr()?,
        environment
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
