//! Main configuration types.
//!
//! This module provides the top-level [`XrhidConfig`] struct and its builder.

use std::net::SocketAddr;

use http::HeaderName;
use serde::{Deserialize, Serialize};
use xrhid_middleware::Pipeline;
use xrhid_telemetry::LogFormat;

use crate::{ConfigError, IdentityConfig, RequestIdConfig, TelemetryConfigSection};

/// Complete middleware stack configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use xrhid_config::XrhidConfig;
///
/// let config = XrhidConfig::default();
/// assert_eq!(config.request_id.header, "x-request-id");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct XrhidConfig {
    /// Identity stage configuration.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Request id stage configuration.
    #[serde(default)]
    pub request_id: RequestIdConfig,

    /// Telemetry configuration (logging, metrics).
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl XrhidConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> XrhidConfigBuilder {
        XrhidConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - The request id header is not a valid HTTP header name
    /// - The metrics address does not parse as a socket address
    /// - The service name is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if HeaderName::from_bytes(self.request_id.header.as_bytes()).is_err() {
            return Err(ConfigError::invalid_value(
                "request_id.header",
                format!("invalid HTTP header name: {:?}", self.request_id.header),
            ));
        }

        if let Some(addr) = &self.telemetry.metrics.addr {
            if addr.parse::<SocketAddr>().is_err() {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.addr",
                    format!("invalid socket address: {addr}"),
                ));
            }
        }

        if self.telemetry.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.service_name",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset: pretty debug logs.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config
    }

    /// Create a production configuration preset: JSON info logs and metrics.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.metrics.enabled = true;
        config
    }

    /// Builds the standard pipeline from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the request id header is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use xrhid_config::XrhidConfig;
    ///
    /// let pipeline = XrhidConfig::default().build_pipeline().unwrap();
    /// assert_eq!(pipeline.stage_names(), vec!["request_id", "access_log", "identity"]);
    /// ```
    pub fn build_pipeline(&self) -> Result<Pipeline, ConfigError> {
        Ok(Pipeline::standard(
            self.identity.build_middleware(),
            self.request_id.build_middleware()?,
        ))
    }
}

/// Builder for [`XrhidConfig`].
#[derive(Debug, Default)]
pub struct XrhidConfigBuilder {
    identity: Option<IdentityConfig>,
    request_id: Option<RequestIdConfig>,
    telemetry: Option<TelemetryConfigSection>,
}

impl XrhidConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identity configuration.
    #[must_use]
    pub fn identity(mut self, identity: IdentityConfig) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Set the request id configuration.
    #[must_use]
    pub fn request_id(mut self, request_id: RequestIdConfig) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfigSection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> XrhidConfig {
        XrhidConfig {
            identity: self.identity.unwrap_or_default(),
            request_id: self.request_id.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<XrhidConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
