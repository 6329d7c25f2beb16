//! Access logging middleware.
//!
//! Emits one structured record per request after the response is produced,
//! and records the request metrics.
//!
//! # Log Format
//!
//! The default sink emits an `info` event with the message `Served` and the
//! fields:
//!
//! - `proto` - HTTP version, e.g. `HTTP/1.1`
//! - `path` - Request path
//! - `duration_ms` - Time spent in downstream stages and the handler
//! - `status` - Response status code
//! - `size` - Response body size in bytes
//! - `request_id` - Correlation id, empty if none was assigned

use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use xrhid_core::RequestContext;
use xrhid_telemetry::metrics::{record_request, InFlightGuard};

/// One access-log entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessLogRecord {
    /// HTTP protocol version.
    pub proto: String,
    /// Request path.
    pub path: String,
    /// Request duration.
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
    /// Response status code.
    pub status: u16,
    /// Response body size in bytes.
    pub size: u64,
    /// Request correlation id, empty if none was assigned.
    pub request_id: String,
}

impl AccessLogRecord {
    /// Returns the duration in fractional milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }
}

fn as_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

/// Destination for access-log records.
pub type AccessLogSink = dyn Fn(&AccessLogRecord) + Send + Sync;

/// Middleware that logs every request and records request metrics.
///
/// # Example
///
/// ```
/// use xrhid_middleware::stages::AccessLogMiddleware;
///
/// let middleware = AccessLogMiddleware::new()
///     .with_sink(|record| println!("{} {}", record.status, record.path));
/// ```
#[derive(Clone, Default)]
pub struct AccessLogMiddleware {
    sink: Option<Arc<AccessLogSink>>,
}

impl AccessLogMiddleware {
    /// Creates a middleware that logs through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the default `tracing` sink.
    #[must_use]
    pub fn with_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&AccessLogRecord) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    fn emit(&self, record: &AccessLogRecord) {
        match &self.sink {
            Some(sink) => sink(record),
            None => tracing::info!(
                proto = %record.proto,
                path = %record.path,
                duration_ms = record.duration_ms(),
                status = record.status,
                size = record.size,
                request_id = %record.request_id,
                "Served"
            ),
        }
    }
}

impl std::fmt::Debug for AccessLogMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessLogMiddleware")
            .field("custom_sink", &self.sink.is_some())
            .finish()
    }
}

impl Middleware for AccessLogMiddleware {
    fn name(&self) -> &'static str {
        "access_log"
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let _in_flight = InFlightGuard::new();
            let start = Instant::now();

            let proto = format!("{:?}", request.version());
            let path = request.uri().path().to_string();
            let request_id = ctx
                .request_id()
                .map(ToString::to_string)
                .unwrap_or_default();

            let response = next.run(ctx, request).await;
            let duration = start.elapsed();

            // The body is already buffered; collecting it only measures it.
            let (parts, body) = response.into_parts();
            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(never) => match never {},
            };

            let record = AccessLogRecord {
                proto,
                path,
                duration,
                status: parts.status.as_u16(),
                size: body.len() as u64,
                request_id,
            };
            self.emit(&record);
            record_request(record.status, duration);

            Response::from_parts(parts, Full::<Bytes>::new(body))
        })
    }
}
