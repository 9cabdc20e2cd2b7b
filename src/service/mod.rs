//! Business logic subsystem.
//!
//! # Data Flow
//! ```text
//! endpoint (typed request)
//!     → StringService operation (pure, no state)
//!     → endpoint (typed response)
//! ```
//!
//! # Design Decisions
//! - Operations are synchronous and referentially transparent
//! - The service knows nothing about transport or wire formats
//! - A single instance is shared via Arc for the process lifetime

pub mod strings;

pub use strings::{BasicStringService, ServiceError, StringService, EMPTY_INPUT_MESSAGE};
