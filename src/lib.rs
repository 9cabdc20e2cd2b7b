//! String service: endpoints, middleware and an HTTP transport.

pub mod config;
pub mod endpoint;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod service;
pub mod transport;

pub use config::schema::ServiceConfig;
pub use endpoint::{BoxEndpoint, Context, Endpoint, EndpointError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use service::{BasicStringService, StringService};
