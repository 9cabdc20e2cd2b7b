//! Transport subsystem: endpoints over HTTP.
//!
//! # Data Flow
//! ```text
//! Server side (server.rs):
//!     HTTP body → decode (codec.rs) → Endpoint → encode (codec.rs) → HTTP body
//!     any failure → "err: <message>" plain-text body
//!
//! Client side (client.rs):
//!     typed request → JSON POST → remote server → typed response
//!     "err: <message>" body → EndpointError::Remote
//! ```
//!
//! # Design Decisions
//! - Decode, endpoint and encode failures share one plain-text format and
//!   keep the implicit 200 status
//! - Codecs are plain functions so routes can swap wire formats
//! - The client adapter is itself an Endpoint and composes with middleware

pub mod client;
pub mod codec;
pub mod server;

pub use client::HttpClientEndpoint;
pub use codec::{decode_json_request, encode_json_response, BoxError, DecodeRequestFn, EncodeResponseFn};
pub use server::{HttpTransport, TransportError, TransportOptions};

/// Prefix of every failure body written by the server adapter.
pub const ERROR_PREFIX: &str = "err: ";
