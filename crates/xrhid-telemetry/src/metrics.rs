//! Prometheus metrics.
//!
//! Call sites record through the `metrics` facade, so recording is a no-op
//! until [`init_metrics`] installs the Prometheus recorder.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `xrhid_requests_total` | Counter | `status` | Requests served |
//! | `xrhid_request_duration_seconds` | Histogram | - | Request latency |
//! | `xrhid_in_flight_requests` | Gauge | - | Requests being processed |
//! | `xrhid_identity_rejections_total` | Counter | `reason` | Rejected identity headers |

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

/// Requests served, by status code.
pub const REQUESTS_TOTAL: &str = "xrhid_requests_total";

/// Request latency histogram.
pub const REQUEST_DURATION_SECONDS: &str = "xrhid_request_duration_seconds";

/// Requests currently being processed.
pub const IN_FLIGHT_REQUESTS: &str = "xrhid_in_flight_requests";

/// Rejected identity headers, by error kind.
pub const IDENTITY_REJECTIONS_TOTAL: &str = "xrhid_identity_rejections_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address of the Prometheus scrape listener (e.g. `0.0.0.0:9090`).
    ///
    /// When `None` the recorder is installed without a listener and metrics
    /// are only available through [`render_metrics`].
    pub addr: Option<String>,

    /// Histogram buckets for request duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: None,
            // 1ms .. 10s
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Installs the global Prometheus recorder.
///
/// When an address is configured the scrape listener is spawned onto the
/// current Tokio runtime.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidAddress`] if the address does not parse,
/// and [`TelemetryError::MetricsInit`] if a recorder is already installed or
/// no runtime is available for the listener.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr = config
        .addr
        .as_deref()
        .map(parse_addr)
        .transpose()?;

    let mut builder = PrometheusBuilder::new();
    if !config.duration_buckets.is_empty() {
        builder = builder
            .set_buckets_for_metric(
                Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
                &config.duration_buckets,
            )
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    let handle = match addr {
        Some(addr) => {
            let runtime = tokio::runtime::Handle::try_current()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
            let _entered = runtime.enter();
            let (recorder, exporter) = builder
                .with_http_listener(addr)
                .build()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
            let handle = recorder.handle();
            metrics::set_global_recorder(recorder)
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
            runtime.spawn(async move {
                if let Err(e) = exporter.await {
                    tracing::error!(error = ?e, "Prometheus listener failed");
                }
            });
            tracing::info!(%addr, "Prometheus listener started");
            handle
        }
        None => builder
            .install_recorder()
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?,
    };

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();

    Ok(())
}

fn parse_addr(addr: &str) -> TelemetryResult<SocketAddr> {
    addr.parse()
        .map_err(|e| TelemetryError::InvalidAddress(format!("{addr}: {e}")))
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests served");
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        IN_FLIGHT_REQUESTS,
        "Number of HTTP requests currently being processed"
    );
    describe_counter!(
        IDENTITY_REJECTIONS_TOTAL,
        "Total identity headers rejected, by reason"
    );
}

/// Records a completed request.
pub fn record_request(status_code: u16, duration: Duration) {
    counter!(REQUESTS_TOTAL, "status" => status_code.to_string()).increment(1);
    histogram!(REQUEST_DURATION_SECONDS).record(duration.as_secs_f64());
}

/// Records a rejected identity header.
///
/// `reason` is the snake_case error kind, e.g. `missing_header`.
pub fn record_identity_rejection(reason: &'static str) {
    counter!(IDENTITY_REJECTIONS_TOTAL, "reason" => reason).increment(1);
}

/// Guard that tracks a request in the in-flight gauge until dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
    }
}
