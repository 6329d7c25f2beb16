//! Common types used throughout the middleware pipeline.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use http::StatusCode;
use http_body_util::Full;

/// The HTTP request type used in the middleware pipeline.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Prefixes `message` with the canonical reason of `status`.
///
/// ```
/// use http::StatusCode;
/// use xrhid_middleware::types::status_message;
///
/// assert_eq!(
///     status_message(StatusCode::BAD_REQUEST, "missing x-rh-identity header"),
///     "Bad Request: missing x-rh-identity header"
/// );
/// ```
pub fn status_message(status: StatusCode, message: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    format!("{reason}: {message}")
}

/// Extension trait for building error responses.
pub trait ResponseExt {
    /// Creates a plain-text error response whose body is `message` plus a
    /// trailing newline. Content sniffing is disabled.
    ///
    /// Pair with [`status_message`] for `"Bad Request: <reason>\n"` bodies.
    fn plain_error(status: StatusCode, message: &str) -> Response;
}

impl ResponseExt for Response {
    fn plain_error(status: StatusCode, message: &str) -> Response {
        let body = format!("{message}\n");

        http::Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .header(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"))
            .body(Full::new(Bytes::from(body)))
            .expect("failed to build error response")
    }
}
