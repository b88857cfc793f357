//! Response relay and error responses.
//!
//! # Responsibilities
//! - Relay the upstream response to the caller unchanged
//! - Turn a contained `ProxyError` into a plain-text 500
//!
//! # Design Decisions
//! - The relayed response keeps the upstream parts, extensions included, so a
//!   non-standard HTTP/1 reason phrase survives the trip
//! - Bodies are never buffered; the upstream stream is handed straight back
//! - Only configuration errors expose their message to the caller

use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
    response::IntoResponse,
};
use hyper::ext::ReasonPhrase;

use crate::error::ProxyError;

/// Body sent for every non-configuration failure.
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// Relay an upstream response verbatim.
pub fn relay(upstream: Response<Body>) -> Response<Body> {
    let (parts, body) = upstream.into_parts();
    Response::from_parts(parts, body)
}

/// Status text as the upstream sent it, or the canonical phrase.
pub fn status_text<B>(response: &Response<B>) -> String {
    if let Some(reason) = response.extensions().get::<ReasonPhrase>() {
        return String::from_utf8_lossy(reason.as_bytes()).into_owned();
    }
    response
        .status()
        .canonical_reason()
        .unwrap_or_default()
        .to_string()
}

fn plain_text(status: StatusCode, body: String) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ProxyError::Configuration(e) => plain_text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ProxyError::Upstream(_) | ProxyError::Transform(_) => plain_text(
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_BODY.to_string(),
            ),
        }
    }
}
