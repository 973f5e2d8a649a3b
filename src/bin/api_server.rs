// API Server Binary Entry Point
//
// Purpose: Serve impact tables over HTTP from a CSV sourcing dataset
// Usage: cargo run --features api --bin api_server

use impact_table::{create_router, AppState, ImpactConfig};
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "impact_table=info,tower_http=debug,axum=debug,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "fixtures".to_string());

    let config = match std::env::var("IMPACT_CONFIG") {
        Ok(path) => ImpactConfig::load(Path::new(&path))?,
        Err(_) => ImpactConfig::default(),
    }
    .with_env_overrides()?;

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    tracing::info!("Configuration:");
    tracing::info!("  DATA_DIR: {}", data_dir);
    tracing::info!("  PORT: {}", port);
    tracing::info!("  Growth rate: {}%", config.growth_rate);
    tracing::info!("  Default page size: {}", config.default_page_size);

    let state = AppState::new(&data_dir, config)?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
