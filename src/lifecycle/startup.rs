//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Start the metrics exporter when enabled
//! - Bind the listener and serve until a shutdown signal

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::{validate_config, ConfigError, ServiceConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Error type for startup and serving.
#[derive(Debug)]
pub enum StartupError {
    Config(ConfigError),
    Metrics(String),
    Bind(std::io::Error),
    Serve(std::io::Error),
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupError::Config(e) => write!(f, "Invalid configuration: {}", e),
            StartupError::Metrics(e) => write!(f, "Failed to start metrics exporter: {}", e),
            StartupError::Bind(e) => write!(f, "Failed to bind: {}", e),
            StartupError::Serve(e) => write!(f, "Server error: {}", e),
        }
    }
}

impl std::error::Error for StartupError {}

/// Run the service until SIGINT/SIGTERM.
pub async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_shutdown_signal().await;
        trigger.trigger();
    });

    run_until(config, shutdown).await
}

/// Run the service until `shutdown` is triggered.
pub async fn run_until(config: ServiceConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let shutdown_rx = shutdown.subscribe();
    validate_config(&config).map_err(|errors| StartupError::Config(ConfigError::Validation(errors)))?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_size = config.limits.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|e: std::net::AddrParseError| StartupError::Metrics(e.to_string()))?;
        metrics::init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(StartupError::Bind)?;
    let local_addr = listener.local_addr().map_err(StartupError::Bind)?;
    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let server = HttpServer::new(config);
    server
        .run(listener, shutdown_rx)
        .await
        .map_err(StartupError::Serve)
}
