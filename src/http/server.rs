//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build endpoints from the StringService and wrap them in middleware
//! - Mount one transport adapter per route on the Axum Router
//! - Wire up tower layers (request ID, tracing, timeout)
//! - Serve until the shutdown signal, then drain

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::endpoint::middleware::{annotate, deadline, instrument, log};
use crate::endpoint::strings::{make_count_endpoint, make_uppercase_endpoint};
use crate::endpoint::chain;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::service::{BasicStringService, StringService};
use crate::transport::{HttpTransport, TransportOptions};

pub const UPPERCASE_PATH: &str = "/uppercase";
pub const COUNT_PATH: &str = "/count";

/// Extra time the HTTP-level timeout allows past the endpoint deadline, so
/// the pipeline reports `err: deadline exceeded` before the connection is cut.
const TIMEOUT_GRACE: Duration = Duration::from_secs(1);

/// HTTP server for the string service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a server backed by [`BasicStringService`].
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_service(config, Arc::new(BasicStringService))
    }

    /// Create a server backed by the given service implementation.
    pub fn with_service(config: ServiceConfig, service: Arc<dyn StringService>) -> Self {
        let router = Self::build_router(&config, service);
        Self { router, config }
    }

    /// Build the Axum router with all routes and middleware layers.
    fn build_router(config: &ServiceConfig, service: Arc<dyn StringService>) -> Router {
        let request_timeout = Duration::from_secs(config.timeouts.request_secs);
        let options = TransportOptions {
            max_body_size: config.limits.max_body_size,
            request_timeout: Some(request_timeout),
        };

        let uppercase = chain(
            [instrument("uppercase"), annotate("uppercase"), log(), deadline()],
            make_uppercase_endpoint(service.clone()),
        );
        let count = chain(
            [instrument("count"), annotate("count"), log(), deadline()],
            make_count_endpoint(service),
        );

        let router = Router::new();
        let router = HttpTransport::json(UPPERCASE_PATH, uppercase)
            .with_options(options)
            .mount(router);
        let router = HttpTransport::json(COUNT_PATH, count)
            .with_options(options)
            .mount(router);

        with_layers(router, request_timeout)
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then finish in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Request ID, tracing and the HTTP-level timeout backstop.
fn with_layers(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = request_id(req.headers()).unwrap_or("unknown"),
                )
            }))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                request_timeout + TIMEOUT_GRACE,
            ))
            .layer(propagate_request_id_layer()),
    )
}
