//! # xrhid
//!
//! **`x-rh-identity` header middleware**
//!
//! Every request entering the platform carries a base64-encoded JSON
//! identity in the `x-rh-identity` header. This crate decodes it, validates
//! it against a configurable policy and hands the result to the handler on
//! the [`RequestContext`](core::RequestContext). Requests without a usable
//! identity are answered with `400 Bad Request` before they reach a handler.
//!
//! ## Quick Start
//!
//! ```
//! use xrhid::prelude::*;
//!
//! # async fn run(request: Request) -> Response {
//! let pipeline = Pipeline::standard(IdentityMiddleware::new(), RequestIdMiddleware::new());
//!
//! pipeline
//!     .process(RequestContext::new(), request, |ctx, _req| {
//!         Box::pin(async move {
//!             let org = ctx.identity().map(|id| id.identity.org_id.clone());
//!             Response::new(org.unwrap_or_default().into())
//!         })
//!     })
//!     .await
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → RequestId → AccessLog → Identity → Handler
//!                                                 ↓
//! Response ← RequestId ← AccessLog ← Identity ←───┘
//! ```

#![doc(html_root_url = "https://docs.rs/xrhid/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Identity model, decoding, validation and context
pub use xrhid_core as core;

// Pipeline and stages
pub use xrhid_middleware as middleware;

// Logging and metrics
pub use xrhid_telemetry as telemetry;

// Typed configuration
pub use xrhid_config as config;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use xrhid::prelude::*;
///
/// let header = encode(&xrhid::core::fixtures::example_identity()).unwrap();
/// let identity = decode(&header).unwrap();
/// assert_eq!(identity.identity.org_id, "1979710");
/// ```
pub mod prelude {
    pub use xrhid_core::{
        decode, decode_and_validate, encode, ErrorKind, Identity, IdentityError, IdentityResult,
        PrincipalType, RequestContext, RequestId, ValidationPolicy, Validator, XRhIdentity,
        IDENTITY_HEADER,
    };

    pub use xrhid_middleware::stages::{
        AccessLogMiddleware, AccessLogRecord, DuplicateHeaderPolicy, IdentityMiddleware,
        RequestIdMiddleware,
    };
    pub use xrhid_middleware::{Middleware, Next, Pipeline, Request, Response, ResponseExt};

    pub use xrhid_telemetry::{init_telemetry, TelemetryConfig};

    pub use xrhid_config::{ConfigError, ConfigLoader, XrhidConfig};
}
