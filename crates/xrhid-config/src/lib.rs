//! Typed configuration for the x-rh-identity middleware stack.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Configuration File Format
//!
//! ```toml
//! [identity]
//! policy = "relaxed_associate_exempt"   # or "org_id_only", "legacy_account_number_required"
//! duplicate_headers = "take_first"      # or "reject"
//!
//! [request_id]
//! header = "x-request-id"
//!
//! [telemetry]
//! service_name = "inventory"
//!
//! [telemetry.logging]
//! enabled = true
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `XRHID__IDENTITY__POLICY=org_id_only`
//! - `XRHID__REQUEST_ID__HEADER=x-correlation-id`
//! - `XRHID__TELEMETRY__METRICS__ENABLED=false`
//!
//! # Example
//!
//! ```no_run
//! use xrhid_config::ConfigLoader;
//!
//! # fn main() -> Result<(), xrhid_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("xrhid.toml")?
//!     .with_dotenv()?
//!     .with_env_prefix("XRHID")
//!     .load()?;
//!
//! let pipeline = config.build_pipeline()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
