// Main entry point - Dependency injection and server setup
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use lathe_health::application::machine_service::MachineService;
use lathe_health::infrastructure::config::load_app_config;
use lathe_health::infrastructure::store;
use lathe_health::presentation::app_state::AppState;
use lathe_health::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let app_config = load_app_config()?;

    // Create record source (infrastructure layer)
    let repository = store::connect(&app_config.store).await?;

    // Create services (application layer)
    let machine_service = MachineService::new(repository, app_config.aggregation);
    let state = Arc::new(AppState { machine_service });

    // Build router (presentation layer)
    let router = build_router(state);

    let addr: SocketAddr = app_config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid server.bind address: {}", app_config.server.bind))?;
    tracing::info!("Starting lathe-health service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
