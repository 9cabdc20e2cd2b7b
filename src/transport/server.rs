//! Server-side HTTP adapter for endpoints.
//!
//! # Responsibilities
//! - Bind a path to a decode function, an endpoint and an encode function
//! - Build the request-scoped Context (request ID, deadline)
//! - Write every failure as an `err: <message>` plain-text body
//!
//! # Design Decisions
//! - Failures keep status 200; callers tell them apart by body format only
//! - Body size is bounded before decoding
//! - One Arc'd adapter per route, shared by all concurrent requests

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::codec::{
    decode_json_request, encode_json_response, BoxError, DecodeRequestFn, EncodeResponseFn,
};
use super::ERROR_PREFIX;
use crate::endpoint::{BoxEndpoint, Context, EndpointError};
use crate::http::request::request_id;

/// Failure while serving a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The body could not be read or decoded; the endpoint did not run.
    #[error("{0}")]
    Decode(BoxError),

    #[error("{0}")]
    Endpoint(#[from] EndpointError),

    /// The endpoint ran but its response could not be encoded.
    #[error("{0}")]
    Encode(BoxError),
}

impl TransportError {
    /// Stage name for logs.
    pub fn stage(&self) -> &'static str {
        match self {
            TransportError::Decode(_) => "decode",
            TransportError::Endpoint(_) => "endpoint",
            TransportError::Encode(_) => "encode",
        }
    }
}

impl IntoResponse for TransportError {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
            format!("{ERROR_PREFIX}{self}"),
        )
            .into_response()
    }
}

/// Per-route transport settings.
#[derive(Debug, Clone, Copy)]
pub struct TransportOptions {
    /// Maximum accepted request body in bytes.
    pub max_body_size: usize,
    /// Deadline attached to each request's Context.
    pub request_timeout: Option<Duration>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024,
            request_timeout: None,
        }
    }
}

/// An endpoint served on one HTTP path.
pub struct HttpTransport<Req, Resp> {
    path: String,
    endpoint: BoxEndpoint<Req, Resp>,
    decode: DecodeRequestFn<Req>,
    encode: EncodeResponseFn<Resp>,
    options: TransportOptions,
}

impl<Req, Resp> HttpTransport<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    pub fn new<D, E>(path: impl Into<String>, endpoint: BoxEndpoint<Req, Resp>, decode: D, encode: E) -> Self
    where
        D: Fn(&Context, Bytes) -> Result<Req, BoxError> + Send + Sync + 'static,
        E: Fn(&Context, &Resp) -> Result<Bytes, BoxError> + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            endpoint,
            decode: Arc::new(decode),
            encode: Arc::new(encode),
            options: TransportOptions::default(),
        }
    }

    /// JSON in, JSON out.
    pub fn json(path: impl Into<String>, endpoint: BoxEndpoint<Req, Resp>) -> Self
    where
        Req: DeserializeOwned + Default,
        Resp: Serialize,
    {
        Self::new(path, endpoint, decode_json_request::<Req>, encode_json_response::<Resp>)
    }

    pub fn with_options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decode, call the endpoint, encode.
    pub async fn serve(&self, ctx: Context, body: Bytes) -> Result<Bytes, TransportError> {
        let request = (self.decode)(&ctx, body).map_err(TransportError::Decode)?;
        let response = self.endpoint.call(ctx.clone(), request).await?;
        (self.encode)(&ctx, &response).map_err(TransportError::Encode)
    }

    /// Handle one HTTP request end to end.
    pub async fn handle(&self, headers: &HeaderMap, body: Body) -> Response {
        let ctx = self.context_for(headers);

        let result = match axum::body::to_bytes(body, self.options.max_body_size).await {
            Ok(bytes) => self.serve(ctx, bytes).await,
            Err(e) => Err(TransportError::Decode(Box::new(e))),
        };

        match result {
            Ok(bytes) => (
                [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                bytes,
            )
                .into_response(),
            Err(e) => {
                tracing::debug!(
                    path = %self.path,
                    stage = e.stage(),
                    error = %e,
                    "Request failed"
                );
                e.into_response()
            }
        }
    }

    /// Add a `POST` route for this adapter.
    pub fn mount<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let path = self.path.clone();
        let transport = Arc::new(self);
        router.route(
            &path,
            post(move |headers: HeaderMap, body: Body| {
                let transport = Arc::clone(&transport);
                async move { transport.handle(&headers, body).await }
            }),
        )
    }

    fn context_for(&self, headers: &HeaderMap) -> Context {
        let mut ctx = Context::background();
        if let Some(id) = request_id(headers) {
            ctx = ctx.with_request_id(id);
        }
        if let Some(timeout) = self.options.request_timeout {
            ctx = ctx.with_timeout(timeout);
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::endpoint_fn;
    use crate::endpoint::strings::{make_count_endpoint, CountRequest, CountResponse};
    use crate::service::BasicStringService;

    fn count_transport() -> HttpTransport<CountRequest, CountResponse> {
        HttpTransport::json("/count", make_count_endpoint(Arc::new(BasicStringService)))
    }

    #[tokio::test]
    async fn test_serve() {
        let body = count_transport()
            .serve(Context::background(), Bytes::from_static(br#"{"s":"go kit"}"#))
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"v":6}"#);
    }

    #[tokio::test]
    async fn test_decode_failure_skips_endpoint() {
        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = called.clone();
        let endpoint = endpoint_fn(move |_ctx: Context, _req: CountRequest| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            async { Ok::<_, EndpointError>(CountResponse { v: 0 }) }
        })
        .boxed();

        let err = HttpTransport::json("/count", endpoint)
            .serve(Context::background(), Bytes::from_static(b"{oops"))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "decode");
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_endpoint_failure() {
        let endpoint = endpoint_fn(|_ctx: Context, _req: CountRequest| async {
            Err::<CountResponse, _>(EndpointError::Other("backend down".into()))
        })
        .boxed();

        let err = HttpTransport::json("/count", endpoint)
            .serve(Context::background(), Bytes::from_static(br#"{"s":"a"}"#))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "endpoint");
        assert_eq!(err.to_string(), "backend down");
    }

    #[tokio::test]
    async fn test_encode_failure() {
        let transport = HttpTransport::new(
            "/count",
            make_count_endpoint(Arc::new(BasicStringService)),
            decode_json_request::<CountRequest>,
            |_ctx: &Context, _resp: &CountResponse| -> Result<Bytes, BoxError> {
                Err("encoder unavailable".into())
            },
        );

        let err = transport
            .serve(Context::background(), Bytes::from_static(br#"{"s":"a"}"#))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "encode");
    }

    #[tokio::test]
    async fn test_error_response_format() {
        let response = TransportError::Encode("encoder unavailable".into()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"err: encoder unavailable");
    }

    #[tokio::test]
    async fn test_handle_oversized_body() {
        let transport = count_transport().with_options(TransportOptions {
            max_body_size: 8,
            request_timeout: None,
        });

        let response = transport
            .handle(&HeaderMap::new(), Body::from(r#"{"s":"far too long"}"#))
            .await;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"err: "));
    }

    #[tokio::test]
    async fn test_context_for() {
        let transport = count_transport().with_options(TransportOptions {
            max_body_size: 1024,
            request_timeout: Some(Duration::from_secs(5)),
        });
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("req-42"));

        let ctx = transport.context_for(&headers);
        assert_eq!(ctx.request_id(), Some("req-42"));
        assert!(ctx.deadline().is_some());
    }
}
