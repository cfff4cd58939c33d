use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use watchtower_core::{
    load_config, load_config_from_env, validate_config, Config, EventBroadcaster, StepProviders,
    WorkflowOrchestrator,
};
use watchtower_server::{api::create_router, metrics, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Interval between heartbeat events on the WebSocket feed
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting watchtower v{}", VERSION);

    let config = resolve_config()?;
    validate_config(&config).context("Configuration validation failed")?;

    info!(
        settle_delay_ms = config.orchestrator.settle_delay_ms,
        step_timeout_ms = config.orchestrator.step_timeout_ms,
        scorer = ?config.steps.scorer,
        "Configuration loaded"
    );

    let steps = StepProviders::from_config(&config.steps);
    let events = EventBroadcaster::new(config.orchestrator.event_buffer);
    let orchestrator =
        WorkflowOrchestrator::with_broadcaster(config.orchestrator.clone(), steps, events.clone());

    // Registers every metric before the first scrape.
    once_cell::sync::Lazy::force(&metrics::REGISTRY);

    let heartbeat = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
        loop {
            ticker.tick().await;
            events.heartbeat();
        }
    });

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, orchestrator));
    let app = create_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    heartbeat.abort();
    info!("Server stopped");
    Ok(())
}

/// Load the config file named by `WATCHTOWER_CONFIG`.
///
/// Without the variable, a missing `config.toml` means defaults plus
/// `WATCHTOWER_*` environment overrides.
fn resolve_config() -> Result<Config> {
    let explicit = std::env::var("WATCHTOWER_CONFIG").ok().map(PathBuf::from);
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if explicit.is_none() && !config_path.exists() {
        warn!(
            "No {} found, using defaults and environment overrides",
            DEFAULT_CONFIG_PATH
        );
        return load_config_from_env().context("Failed to load config from environment");
    }

    info!("Loading configuration from {:?}", config_path);
    load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
