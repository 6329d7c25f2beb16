//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};
use xrhid_core::ValidationPolicy;
use xrhid_middleware::stages::{
    DuplicateHeaderPolicy, IdentityMiddleware, RequestIdMiddleware, REQUEST_ID_HEADER,
};
use xrhid_telemetry::{LogConfig, LogFormat, MetricsConfig, TelemetryConfig};

use crate::ConfigError;

/// Identity stage configuration.
///
/// # Example
///
/// ```
/// use xrhid_config::IdentityConfig;
/// use xrhid_core::ValidationPolicy;
///
/// let config = IdentityConfig {
///     policy: ValidationPolicy::OrgIdOnly,
///     ..Default::default()
/// };
/// let middleware = config.build_middleware();
/// assert_eq!(middleware.validator().policy(), ValidationPolicy::OrgIdOnly);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Validation strictness applied to decoded identities.
    #[serde(default)]
    pub policy: ValidationPolicy,

    /// Handling of requests that repeat the identity header.
    #[serde(default)]
    pub duplicate_headers: DuplicateHeaderPolicy,
}

impl IdentityConfig {
    /// Builds the identity stage from this section.
    #[must_use]
    pub fn build_middleware(&self) -> IdentityMiddleware {
        IdentityMiddleware::new()
            .with_policy(self.policy)
            .with_duplicate_headers(self.duplicate_headers)
    }
}

/// Request id stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RequestIdConfig {
    /// Header carrying the request id.
    #[serde(default = "default_request_id_header")]
    pub header: String,
}

impl Default for RequestIdConfig {
    fn default() -> Self {
        Self {
            header: default_request_id_header(),
        }
    }
}

fn default_request_id_header() -> String {
    REQUEST_ID_HEADER.to_string()
}

impl RequestIdConfig {
    /// Builds the request id stage from this section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `header` is not a valid HTTP
    /// header name.
    pub fn build_middleware(&self) -> Result<RequestIdMiddleware, ConfigError> {
        RequestIdMiddleware::with_header(&self.header)
            .map_err(|e| ConfigError::invalid_value("request_id.header", e.to_string()))
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Enable metrics collection.
    #[serde(default)]
    pub enabled: bool,

    /// Prometheus scrape listener address. Without it metrics are only
    /// rendered on demand.
    #[serde(default)]
    pub addr: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable the log subscriber.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or `EnvFilter` directive, e.g. `info` or `xrhid=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfigSection {
    /// Service name attached to log events.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for TelemetryConfigSection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            logging: LoggingSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

fn default_service_name() -> String {
    "xrhid".to_string()
}

impl TelemetryConfigSection {
    /// Converts this section into the runtime telemetry configuration.
    ///
    /// Pretty output also turns on span events and source locations.
    #[must_use]
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        let base = match self.logging.format {
            LogFormat::Pretty => LogConfig::development(),
            LogFormat::Json => LogConfig::production(),
        };
        let logging = LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            ..base
        };
        let metrics = MetricsConfig {
            enabled: self.metrics.enabled,
            addr: self.metrics.addr.clone(),
            ..MetricsConfig::default()
        };

        TelemetryConfig::builder()
            .service_name(&self.service_name)
            .logging(logging)
            .metrics(metrics)
            .build()
    }
}
