//! Middleware stages.
//!
//! 1. [`request_id`] - Propagate or generate the request id
//! 2. [`access_log`] - Log the request and record metrics
//! 3. [`identity`] - Decode, validate and store the identity header

pub mod access_log;
pub mod identity;
pub mod request_id;

pub use access_log::{AccessLogMiddleware, AccessLogRecord, AccessLogSink};
pub use identity::{DuplicateHeaderPolicy, IdentityMiddleware, RejectionObserver};
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
