//! Endpoint abstraction subsystem.
//!
//! # Data Flow
//! ```text
//! transport (decoded request + Context)
//!     → middleware.rs (outermost first, onion order)
//!     → strings.rs (endpoint closing over the StringService)
//!     → transport (typed response or EndpointError)
//! ```
//!
//! # Design Decisions
//! - An endpoint is a single async call `(Context, Req) -> Result<Resp, EndpointError>`
//! - Endpoints are immutable once built and shared via Arc
//! - Middleware maps an endpoint to another of the same request/response types
//! - Business errors live in the response type; EndpointError is for failures
//!   the caller cannot treat as a result

pub mod context;
pub mod middleware;
pub mod strings;

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;

pub use context::Context;
pub use middleware::{chain, Middleware};

/// Failure of an endpoint invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// The context deadline passed before the endpoint completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The remote side answered with an error body.
    #[error("{0}")]
    Remote(String),

    /// The request could not be delivered or the reply could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("{0}")]
    Other(String),
}

/// A single business operation, decoupled from transport.
pub trait Endpoint<Req, Resp>: Send + Sync + 'static {
    fn call(&self, ctx: Context, req: Req) -> BoxFuture<'_, Result<Resp, EndpointError>>;
}

/// Shared, type-erased endpoint.
pub type BoxEndpoint<Req, Resp> = Arc<dyn Endpoint<Req, Resp>>;

impl<Req, Resp, E> Endpoint<Req, Resp> for Arc<E>
where
    E: Endpoint<Req, Resp> + ?Sized,
{
    fn call(&self, ctx: Context, req: Req) -> BoxFuture<'_, Result<Resp, EndpointError>> {
        (**self).call(ctx, req)
    }
}

/// Endpoint backed by an async function. See [`endpoint_fn`].
#[derive(Clone, Copy)]
pub struct FnEndpoint<F> {
    f: F,
}

/// Build an endpoint from an async function or closure.
pub fn endpoint_fn<F>(f: F) -> FnEndpoint<F> {
    FnEndpoint { f }
}

impl<F> FnEndpoint<F> {
    /// Erase the concrete type.
    pub fn boxed<Req, Resp>(self) -> BoxEndpoint<Req, Resp>
    where
        Self: Endpoint<Req, Resp>,
    {
        Arc::new(self)
    }
}

impl<F, Fut, Req, Resp> Endpoint<Req, Resp> for FnEndpoint<F>
where
    F: Fn(Context, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, EndpointError>> + Send + 'static,
{
    fn call(&self, ctx: Context, req: Req) -> BoxFuture<'_, Result<Resp, EndpointError>> {
        Box::pin((self.f)(ctx, req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_endpoint_fn() {
        let double = endpoint_fn(|_ctx: Context, n: u32| async move { Ok::<_, EndpointError>(n * 2) })
            .boxed::<u32, u32>();

        assert_eq!(double.call(Context::background(), 21).await, Ok(42));
        // Reusable across invocations
        assert_eq!(double.call(Context::background(), 4).await, Ok(8));
    }

    #[tokio::test]
    async fn test_endpoint_fn_error() {
        let failing = endpoint_fn(|_ctx: Context, _req: ()| async {
            Err::<(), _>(EndpointError::Other("boom".into()))
        })
        .boxed::<(), ()>();

        let err = failing.call(Context::background(), ()).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_sees_context() {
        let echo_id = endpoint_fn(|ctx: Context, _req: ()| async move {
            Ok::<_, EndpointError>(ctx.request_id().unwrap_or_default().to_string())
        })
        .boxed::<(), String>();

        let ctx = Context::background().with_request_id("abc-123");
        assert_eq!(echo_id.call(ctx, ()).await.unwrap(), "abc-123");
    }
}
