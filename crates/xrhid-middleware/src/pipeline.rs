//! Middleware pipeline.
//!
//! A [`Pipeline`] is an ordered list of middleware stages built once at
//! startup and shared by every request. Stages run in insertion order on the
//! way in and in reverse order on the way out.
//!
//! [`Pipeline::standard`] assembles the canonical order:
//!
//! ```text
//! Request → RequestId → AccessLog → Identity → Handler
//!                                                 ↓
//! Response ← RequestId ← AccessLog ← Identity ←───┘
//! ```
//!
//! Access logging runs outside the identity stage so that rejected requests
//! are still logged with their request id.

use crate::middleware::{BoxFuture, Middleware, Next};
use crate::stages::{AccessLogMiddleware, IdentityMiddleware, RequestIdMiddleware};
use crate::types::{Request, Response};
use std::sync::Arc;
use xrhid_core::RequestContext;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable, ordered middleware pipeline.
///
/// # Example
///
/// ```
/// use xrhid_middleware::pipeline::Pipeline;
/// use xrhid_middleware::stages::{IdentityMiddleware, RequestIdMiddleware};
///
/// let pipeline = Pipeline::standard(IdentityMiddleware::new(), RequestIdMiddleware::new());
/// assert_eq!(pipeline.stage_names(), vec!["request_id", "access_log", "identity"]);
/// ```
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Builds the canonical pipeline: request id, access log, identity.
    #[must_use]
    pub fn standard(identity: IdentityMiddleware, request_id: RequestIdMiddleware) -> Self {
        Self::builder()
            .add_stage(request_id)
            .add_stage(AccessLogMiddleware::new())
            .add_stage(identity)
            .build()
    }

    /// Processes a request through every stage, then the handler.
    pub async fn process<H>(&self, ctx: RequestContext, request: Request, handler: H) -> Response
    where
        H: FnOnce(RequestContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(ctx, request).await
    }

    /// Builds the middleware chain for a request, back to front.
    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(RequestContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the names of all middleware stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty pipeline builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware stage.
    #[must_use]
    pub fn add_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

/// The stages of the canonical pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Request ID generation/propagation.
    RequestId = 1,
    /// Access logging and request metrics.
    AccessLog = 2,
    /// Identity header decoding and validation.
    Identity = 3,
}

impl Stage {
    /// Returns the stage name, matching [`Middleware::name`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RequestId => "request_id",
            Self::AccessLog => "access_log",
            Self::Identity => "identity",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 3] {
        [Self::RequestId, Self::AccessLog, Self::Identity]
    }
}
