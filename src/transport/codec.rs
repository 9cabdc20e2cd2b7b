//! Wire codecs for the HTTP transport.

use std::sync::Arc;

use axum::body::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::endpoint::Context;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Turns a request body into a typed request.
pub type DecodeRequestFn<Req> = Arc<dyn Fn(&Context, Bytes) -> Result<Req, BoxError> + Send + Sync>;

/// Turns a typed response into a response body.
pub type EncodeResponseFn<Resp> = Arc<dyn Fn(&Context, &Resp) -> Result<Bytes, BoxError> + Send + Sync>;

#[derive(Debug, Error)]
enum CodecError {
    #[error("EOF")]
    EmptyBody,
}

/// Decode the first JSON value in the body.
///
/// Trailing content after the first value is ignored. Missing fields fall
/// back to the request type's serde defaults, and a `null` body decodes as
/// `T::default()`.
pub fn decode_json_request<T>(_ctx: &Context, body: Bytes) -> Result<T, BoxError>
where
    T: DeserializeOwned + Default,
{
    let mut values = serde_json::Deserializer::from_slice(&body).into_iter::<Option<T>>();
    match values.next() {
        Some(value) => Ok(value?.unwrap_or_default()),
        None => Err(CodecError::EmptyBody.into()),
    }
}

/// Encode the response as compact JSON.
pub fn encode_json_response<T>(_ctx: &Context, response: &T) -> Result<Bytes, BoxError>
where
    T: Serialize,
{
    Ok(Bytes::from(serde_json::to_vec(response)?))
}
