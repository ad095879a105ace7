//! plantpal-relay - Plant identification relay service
//!
//! Accepts a leaf photo from the browser page and relays it to the
//! identification API, keeping the API key on the server.

use anyhow::{Context, Result};
use clap::Parser;
use plantpal_common::api::RELAY_PATH;
use plantpal_common::config::TomlConfig;
use plantpal_relay::{build_router, AppState, RelayArgs, RelayConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "plantpal_relay=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    let args = RelayArgs::parse();

    // Config file first: it may carry the log level
    let toml_config = TomlConfig::load(args.config.as_deref())
        .context("Failed to load configuration file")?;

    let default_filter = toml_config
        .logging
        .level
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting PlantPal relay (plantpal-relay) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = RelayConfig::resolve(&args, &toml_config.relay)
        .context("Invalid relay configuration")?;
    info!("Upstream endpoint: {}", config.identify_endpoint());
    info!("Classification hint: {}", config.organ);
    info!("Upstream timeout: {:?}", config.timeout);

    let host = config.host.clone();
    let port = config.port;

    let state = AppState::new(config).context("Failed to create upstream client")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", host, port))?;
    info!("plantpal-relay listening on http://{}:{}{}", host, port, RELAY_PATH);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
