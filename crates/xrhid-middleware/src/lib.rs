//! # xrhid Middleware
//!
//! Async middleware pipeline that enforces the `x-rh-identity` header.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Request → RequestId → AccessLog → Identity → Handler
//!                                                 ↓
//! Response ← RequestId ← AccessLog ← Identity ←───┘
//! ```
//!
//! | Stage | Middleware | Purpose |
//! |-------|------------|---------|
//! | 1 | Request ID | Propagate or generate the request id (UUID v7) |
//! | 2 | Access Log | Emit one structured log line and request metrics |
//! | 3 | Identity | Decode and validate `x-rh-identity`, reject with 400 |
//!
//! The [`RequestContext`](xrhid_core::RequestContext) is passed by value
//! through the chain and finally handed to the handler.
//!
//! ## Example
//!
//! ```
//! use xrhid_middleware::pipeline::{Pipeline, Stage};
//! use xrhid_middleware::stages::{IdentityMiddleware, RequestIdMiddleware};
//!
//! let pipeline = Pipeline::standard(IdentityMiddleware::new(), RequestIdMiddleware::new());
//! assert_eq!(pipeline.stage_count(), Stage::all().len());
//! ```

#![doc(html_root_url = "https://docs.rs/xrhid-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use middleware::{BoxFuture, HandlerFn, Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use types::{status_message, Request, Response, ResponseExt};
