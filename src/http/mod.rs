//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower layers)
//!     → request.rs (assign / propagate request ID)
//!     → transport adapter for the matched path
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{request_id, RequestIdGenerator, X_REQUEST_ID};
pub use server::{HttpServer, COUNT_PATH, UPPERCASE_PATH};
