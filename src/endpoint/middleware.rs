//! Endpoint middleware and chaining.
//!
//! # Responsibilities
//! - Decorate an endpoint with behaviour that runs around every call
//! - Compose several middleware into one endpoint in declared order
//!
//! # Design Decisions
//! - Middleware is a plain function `BoxEndpoint -> BoxEndpoint`
//! - `chain([a, b, c], e)` is `a(b(c(e)))`: pre-logic runs a, b, c and
//!   post-logic unwinds c, b, a
//! - Capability requirements (e.g. textual rendering for `log`) are trait
//!   bounds on the constructor, so misuse fails to compile

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::BoxFuture;

use super::{endpoint_fn, BoxEndpoint, Context, Endpoint, EndpointError};
use crate::observability::metrics;

/// Transforms an endpoint into another with the same request/response types.
pub type Middleware<Req, Resp> =
    Box<dyn Fn(BoxEndpoint<Req, Resp>) -> BoxEndpoint<Req, Resp> + Send + Sync>;

/// Wrap `endpoint` in `middlewares`, the first listed being the outermost.
pub fn chain<Req, Resp, I>(middlewares: I, endpoint: BoxEndpoint<Req, Resp>) -> BoxEndpoint<Req, Resp>
where
    I: IntoIterator<Item = Middleware<Req, Resp>>,
    I::IntoIter: DoubleEndedIterator,
{
    middlewares
        .into_iter()
        .rev()
        .fold(endpoint, |next, middleware| middleware(next))
}

/// Marker emitted by [`annotate`] around each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Enter(String),
    Exit(String),
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Enter(label) => write!(f, "{label} pre"),
            Annotation::Exit(label) => write!(f, "{label} post"),
        }
    }
}

/// Receiver for annotation markers.
pub type AnnotationSink = Arc<dyn Fn(Annotation) + Send + Sync>;

/// Emit a pre-marker before and a post-marker after the wrapped endpoint.
///
/// Markers are written as trace events. The post-marker is emitted on every
/// exit path: success, error, or the call future being dropped.
pub fn annotate<Req, Resp>(label: impl Into<String>) -> Middleware<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    annotated(label.into(), None)
}

/// Like [`annotate`], additionally forwarding every marker to `sink`.
pub fn annotate_with<Req, Resp>(label: impl Into<String>, sink: AnnotationSink) -> Middleware<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    annotated(label.into(), Some(sink))
}

fn annotated<Req, Resp>(label: String, sink: Option<AnnotationSink>) -> Middleware<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    let label: Arc<str> = label.into();
    Box::new(move |next: BoxEndpoint<Req, Resp>| -> BoxEndpoint<Req, Resp> {
        Arc::new(Annotated {
            label: label.clone(),
            sink: sink.clone(),
            next,
        })
    })
}

struct Annotated<Req, Resp> {
    label: Arc<str>,
    sink: Option<AnnotationSink>,
    next: BoxEndpoint<Req, Resp>,
}

impl<Req, Resp> Endpoint<Req, Resp> for Annotated<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    fn call(&self, ctx: Context, req: Req) -> BoxFuture<'_, Result<Resp, EndpointError>> {
        Box::pin(async move {
            let _exit = AnnotationGuard::enter(&self.label, self.sink.as_ref());
            self.next.call(ctx, req).await
        })
    }
}

/// Emits `Exit` on drop.
struct AnnotationGuard<'a> {
    label: &'a str,
    sink: Option<&'a AnnotationSink>,
}

impl<'a> AnnotationGuard<'a> {
    fn enter(label: &'a str, sink: Option<&'a AnnotationSink>) -> Self {
        let guard = Self { label, sink };
        guard.emit(Annotation::Enter(label.to_string()));
        guard
    }

    fn emit(&self, annotation: Annotation) {
        tracing::debug!(marker = %annotation, "annotate");
        if let Some(sink) = self.sink {
            sink(annotation);
        }
    }
}

impl Drop for AnnotationGuard<'_> {
    fn drop(&mut self) {
        self.emit(Annotation::Exit(self.label.to_string()));
    }
}

/// Log the textual rendering of each request before delegating, and of the
/// response (or error) afterwards.
///
/// Both types must implement [`Display`](fmt::Display):
///
/// ```compile_fail
/// use string_service::endpoint::middleware::{log, Middleware};
///
/// struct Opaque;
/// let _: Middleware<Opaque, Opaque> = log();
/// ```
pub fn log<Req, Resp>() -> Middleware<Req, Resp>
where
    Req: fmt::Display + Send + 'static,
    Resp: fmt::Display + Send + 'static,
{
    Box::new(|next: BoxEndpoint<Req, Resp>| -> BoxEndpoint<Req, Resp> {
        Arc::new(Logged { next })
    })
}

struct Logged<Req, Resp> {
    next: BoxEndpoint<Req, Resp>,
}

impl<Req, Resp> Endpoint<Req, Resp> for Logged<Req, Resp>
where
    Req: fmt::Display + Send + 'static,
    Resp: fmt::Display + Send + 'static,
{
    fn call(&self, ctx: Context, req: Req) -> BoxFuture<'_, Result<Resp, EndpointError>> {
        Box::pin(async move {
            let request_id = ctx.request_id().unwrap_or("-").to_string();
            tracing::info!(request_id = %request_id, request = %req, "Endpoint called");

            let result = self.next.call(ctx, req).await;
            match &result {
                Ok(resp) => tracing::info!(request_id = %request_id, response = %resp, "Endpoint returned"),
                Err(e) => tracing::warn!(request_id = %request_id, error = %e, "Endpoint failed"),
            }
            result
        })
    }
}

/// Record call count, failures and latency for `route`.
pub fn instrument<Req, Resp>(route: &'static str) -> Middleware<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    Box::new(move |next: BoxEndpoint<Req, Resp>| -> BoxEndpoint<Req, Resp> {
        endpoint_fn(move |ctx: Context, req: Req| {
            let next = next.clone();
            async move {
                let start = Instant::now();
                let result = next.call(ctx, req).await;
                metrics::record_endpoint(route, result.is_ok(), start);
                result
            }
        })
        .boxed()
    })
}

/// Fail with [`EndpointError::DeadlineExceeded`] when the context deadline
/// passes before the wrapped endpoint completes.
pub fn deadline<Req, Resp>() -> Middleware<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    Box::new(|next: BoxEndpoint<Req, Resp>| -> BoxEndpoint<Req, Resp> {
        endpoint_fn(move |ctx: Context, req: Req| {
            let next = next.clone();
            async move {
                let Some(at) = ctx.deadline() else {
                    return next.call(ctx, req).await;
                };
                if ctx.is_expired() {
                    return Err(EndpointError::DeadlineExceeded);
                }
                tokio::time::timeout_at(at, next.call(ctx, req))
                    .await
                    .map_err(|_| EndpointError::DeadlineExceeded)?
            }
        })
        .boxed()
    })
}
