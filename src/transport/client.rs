//! Client-side HTTP adapter: a remote route exposed as a local endpoint.

use std::fmt;
use std::marker::PhantomData;

use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ERROR_PREFIX;
use crate::endpoint::strings::{CountRequest, CountResponse, UppercaseRequest, UppercaseResponse};
use crate::endpoint::{Context, Endpoint, EndpointError};
use crate::http::request::X_REQUEST_ID;
use crate::http::server::{COUNT_PATH, UPPERCASE_PATH};

/// Calls a JSON route on a remote string service.
pub struct HttpClientEndpoint<Req, Resp> {
    client: Client,
    url: String,
    _types: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp> HttpClientEndpoint<Req, Resp> {
    /// `base_url` like `http://localhost:8080`, `path` like `/count`.
    pub fn new(client: Client, base_url: &str, path: &str) -> Self {
        Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), path),
            _types: PhantomData,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<Req, Resp> fmt::Debug for HttpClientEndpoint<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientEndpoint").field("url", &self.url).finish()
    }
}

impl<Req, Resp> Endpoint<Req, Resp> for HttpClientEndpoint<Req, Resp>
where
    Req: Serialize + Send + 'static,
    Resp: DeserializeOwned + Send + 'static,
{
    fn call(&self, ctx: Context, req: Req) -> BoxFuture<'_, Result<Resp, EndpointError>> {
        Box::pin(async move {
            let mut builder = self.client.post(&self.url).json(&req);
            if let Some(id) = ctx.request_id() {
                builder = builder.header(X_REQUEST_ID, id);
            }
            if let Some(remaining) = ctx.remaining() {
                if remaining.is_zero() {
                    return Err(EndpointError::DeadlineExceeded);
                }
                builder = builder.timeout(remaining);
            }

            let response = builder.send().await.map_err(map_reqwest_error)?;
            let status = response.status();
            if !status.is_success() {
                return Err(EndpointError::Transport(format!("unexpected status {status}")));
            }
            let body = response.bytes().await.map_err(map_reqwest_error)?;
            decode_reply(&body)
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> EndpointError {
    if e.is_timeout() {
        EndpointError::DeadlineExceeded
    } else {
        EndpointError::Transport(e.to_string())
    }
}

/// Parse a reply body, mapping the server's `err: ` format to `Remote`.
fn decode_reply<Resp>(body: &[u8]) -> Result<Resp, EndpointError>
where
    Resp: DeserializeOwned,
{
    if let Some(message) = body.strip_prefix(ERROR_PREFIX.as_bytes()) {
        return Err(EndpointError::Remote(String::from_utf8_lossy(message).into_owned()));
    }
    serde_json::from_slice(body)
        .map_err(|e| EndpointError::Transport(format!("invalid response body: {e}")))
}

/// Client endpoint for `POST /uppercase`.
pub fn uppercase_endpoint(
    client: Client,
    base_url: &str,
) -> HttpClientEndpoint<UppercaseRequest, UppercaseResponse> {
    HttpClientEndpoint::new(client, base_url, UPPERCASE_PATH)
}

/// Client endpoint for `POST /count`.
pub fn count_endpoint(client: Client, base_url: &str) -> HttpClientEndpoint<CountRequest, CountResponse> {
    HttpClientEndpoint::new(client, base_url, COUNT_PATH)
}
