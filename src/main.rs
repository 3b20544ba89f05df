// Initialize configuration
// Set up logging
// Build upstream clients
// Initialize cache and stake service
// Create shared state
// Start cache sweeper
// Start HTTP server

use stake_history_service::{
    api, blockchain::EvmRpcClient, cache, config::Config, payment::CryptApiClient,
    service::StakeService, state::AppState,
};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting stake-history-service");

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Configuration loaded: {:?}", config);

    // Upstream collaborators
    let ledger = Arc::new(EvmRpcClient::new(&config)?);
    let payments = Arc::new(CryptApiClient::new(&config)?);

    // Initialize cache, owned by the stake service from here on
    let history_cache = cache::init_cache(&config);
    tracing::info!(
        "Cache initialized with TTL: {:?} and capacity: {}",
        config.cache_ttl,
        config.cache_max_capacity
    );

    let stakes = StakeService::from_config(ledger, history_cache.clone(), &config);

    // Create shared state
    let app_state = Arc::new(AppState {
        config: config.clone(),
        stakes,
        payments,
    });

    // Start cache sweeper
    let shutdown = CancellationToken::new();
    let sweeper = cache::spawn_sweeper(
        history_cache,
        config.cache_sweep_interval,
        shutdown.clone(),
    );

    // Start HTTP server
    let app = api::create_router(app_state);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Starting server on {}", addr);

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
            server_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::error!("Cache sweeper task failed: {}", e);
    }
    tracing::info!("Server stopped");

    Ok(())
}
