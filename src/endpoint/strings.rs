//! Request/response shapes and endpoints for the string operations.

use std::fmt;
use std::sync::Arc;

use futures_util::future;
use serde::{Deserialize, Deserializer, Serialize};

use super::{endpoint_fn, BoxEndpoint, Context, EndpointError};
use crate::service::StringService;

/// Body of `POST /uppercase`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UppercaseRequest {
    #[serde(default, alias = "S", deserialize_with = "null_as_empty")]
    pub s: String,
}

/// Reply of `POST /uppercase`.
///
/// A business failure is carried in `err`, not as a transport failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UppercaseResponse {
    pub v: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

/// Body of `POST /count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRequest {
    #[serde(default, alias = "S", deserialize_with = "null_as_empty")]
    pub s: String,
}

/// Reply of `POST /count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub v: usize,
}

/// `null` reads as the empty string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl fmt::Display for UppercaseRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uppercase(s={:?})", self.s)
    }
}

impl fmt::Display for UppercaseResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.err {
            Some(err) => write!(f, "v={:?} err={:?}", self.v, err),
            None => write!(f, "v={:?}", self.v),
        }
    }
}

impl fmt::Display for CountRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "count(s={:?})", self.s)
    }
}

impl fmt::Display for CountResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v={}", self.v)
    }
}

/// Endpoint for [`StringService::uppercase`].
///
/// A service error yields `v = ""` and `err = Some(message)`; the call itself
/// still succeeds.
pub fn make_uppercase_endpoint<S>(svc: Arc<S>) -> BoxEndpoint<UppercaseRequest, UppercaseResponse>
where
    S: StringService + ?Sized,
{
    endpoint_fn(move |_ctx: Context, req: UppercaseRequest| {
        let response = match svc.uppercase(&req.s) {
            Ok(v) => UppercaseResponse { v, err: None },
            Err(e) => UppercaseResponse {
                v: String::new(),
                err: Some(e.to_string()),
            },
        };
        future::ready(Ok::<_, EndpointError>(response))
    })
    .boxed()
}

/// Endpoint for [`StringService::count`].
pub fn make_count_endpoint<S>(svc: Arc<S>) -> BoxEndpoint<CountRequest, CountResponse>
where
    S: StringService + ?Sized,
{
    endpoint_fn(move |_ctx: Context, req: CountRequest| {
        future::ready(Ok::<_, EndpointError>(CountResponse { v: svc.count(&req.s) }))
    })
    .boxed()
}
