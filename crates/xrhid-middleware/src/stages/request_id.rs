//! Request ID middleware.
//!
//! Makes sure every request carries a correlation id:
//!
//! 1. If the request already has the header, its value is kept verbatim
//! 2. Otherwise a UUID v7 is generated and written to the request header
//!
//! The id is stored on the [`RequestContext`] and echoed on the response, so
//! clients can quote it when reporting problems.

use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use http::header::{HeaderName, HeaderValue};
use xrhid_core::{RequestContext, RequestId};

/// The default header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that propagates or generates request IDs.
///
/// # Example
///
/// ```
/// use xrhid_middleware::stages::RequestIdMiddleware;
///
/// let default = RequestIdMiddleware::new();
/// assert_eq!(default.header_name().as_str(), "x-request-id");
///
/// let custom = RequestIdMiddleware::with_header("Request-Id").unwrap();
/// assert_eq!(custom.header_name().as_str(), "request-id");
/// ```
#[derive(Debug, Clone)]
pub struct RequestIdMiddleware {
    header: HeaderName,
}

impl RequestIdMiddleware {
    /// Creates a middleware using the `X-Request-Id` header.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: HeaderName::from_static(REQUEST_ID_HEADER),
        }
    }

    /// Creates a middleware using a custom header name.
    ///
    /// # Errors
    ///
    /// Returns an error if `header` is not a valid HTTP header name.
    pub fn with_header(header: &str) -> Result<Self, http::header::InvalidHeaderName> {
        Ok(Self {
            header: HeaderName::from_bytes(header.as_bytes())?,
        })
    }

    /// Returns the configured header name.
    #[must_use]
    pub fn header_name(&self) -> &HeaderName {
        &self.header
    }

    /// Returns the incoming id, or a generated one written to the request.
    fn ensure_request_id(&self, request: &mut Request) -> (RequestId, HeaderValue) {
        if let Some(value) = request.headers().get(&self.header) {
            if let Ok(id) = value.to_str() {
                if !id.is_empty() {
                    return (RequestId::from(id), value.clone());
                }
            }
        }

        let id = RequestId::new();
        // A hyphenated UUID is always a valid header value.
        let value = HeaderValue::from_str(id.as_str()).expect("valid header value");
        request.headers_mut().insert(self.header.clone(), value.clone());
        (id, value)
    }
}

impl Default for RequestIdMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        mut request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let (request_id, value) = self.ensure_request_id(&mut request);
            let ctx = ctx.with_request_id(request_id);

            let mut response = next.run(ctx, request).await;
            response.headers_mut().insert(self.header.clone(), value);
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::Full;
    use uuid::Uuid;

    fn create_request(header: Option<(&str, &str)>) -> Request {
        let mut builder = HttpRequest::builder().uri("/test");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    /// Echoes what downstream saw: the context id and the request header.
    fn echo_handler(
        header: &'static str,
    ) -> impl FnOnce(RequestContext, Request) -> BoxFuture<'static, Response> {
        move |ctx, req| {
            Box::pin(async move {
                let from_ctx = ctx.request_id().map(ToString::to_string).unwrap_or_default();
                let from_req = req
                    .headers()
                    .get(header)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                HttpResponse::builder()
                    .status(StatusCode::OK)
                    .header("x-ctx-id", from_ctx)
                    .header("x-req-id", from_req)
                    .body(Full::new(Bytes::new()))
                    .unwrap()
            })
        }
    }

    fn header<'r>(response: &'r Response, name: &str) -> &'r str {
        response.headers().get(name).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn test_generates_request_id_when_missing() {
        let middleware = RequestIdMiddleware::new();
        let next = Next::handler(echo_handler(REQUEST_ID_HEADER));

        let response = middleware
            .process(RequestContext::new(), create_request(None), next)
            .await;

        let id = header(&response, REQUEST_ID_HEADER);
        assert_eq!(Uuid::parse_str(id).unwrap().get_version_num(), 7);
        assert_eq!(header(&response, "x-ctx-id"), id);
        assert_eq!(header(&response, "x-req-id"), id);
    }

    #[tokio::test]
    async fn test_preserves_incoming_id() {
        let middleware = RequestIdMiddleware::new();
        let next = Next::handler(echo_handler(REQUEST_ID_HEADER));
        let request = create_request(Some(("X-Request-Id", "abc-123")));

        let response = middleware.process(RequestContext::new(), request, next).await;

        assert_eq!(header(&response, REQUEST_ID_HEADER), "abc-123");
        assert_eq!(header(&response, "x-ctx-id"), "abc-123");
        assert_eq!(header(&response, "x-req-id"), "abc-123");
    }

    #[tokio::test]
    async fn test_custom_header_name() {
        let middleware = RequestIdMiddleware::with_header("Request-Id").unwrap();
        let next = Next::handler(echo_handler("request-id"));
        let request = create_request(Some(("request-id", "custom-1")));

        let response = middleware.process(RequestContext::new(), request, next).await;

        assert_eq!(header(&response, "request-id"), "custom-1");
        assert!(response.headers().get(REQUEST_ID_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_empty_incoming_id_is_replaced() {
        let middleware = RequestIdMiddleware::new();
        let next = Next::handler(echo_handler(REQUEST_ID_HEADER));
        let request = create_request(Some((REQUEST_ID_HEADER, "")));

        let response = middleware.process(RequestContext::new(), request, next).await;

        assert!(Uuid::parse_str(header(&response, REQUEST_ID_HEADER)).is_ok());
    }

    #[test]
    fn test_invalid_header_name() {
        assert!(RequestIdMiddleware::with_header("bad header").is_err());
    }

    #[test]
    fn test_middleware_name() {
        assert_eq!(RequestIdMiddleware::new().name(), "request_id");
    }
}
