//! Identity header middleware.
//!
//! Decodes and validates the `x-rh-identity` header, then stores both the
//! parsed identity and the raw header value on the [`RequestContext`] before
//! calling the next stage.
//!
//! ## Request Lifecycle
//!
//! ```text
//! Start → Decoding → Validating → Enriching → Forwarded
//!   │         │           │
//!   └─────────┴───────────┴──→ Rejected (400)
//! ```
//!
//! A rejected request never reaches the handler. The response is
//! `400 Bad Request` with a plain-text body `"Bad Request: <reason>\n"`.

use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{status_message, Request, Response, ResponseExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use xrhid_core::{
    DecodeError, IdentityError, RequestContext, ValidationPolicy, Validator, IDENTITY_HEADER,
};
use xrhid_telemetry::metrics::record_identity_rejection;

/// How to treat a request that carries the identity header more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateHeaderPolicy {
    /// Use the first occurrence and ignore the rest.
    #[default]
    TakeFirst,
    /// Reject the request as if the header were missing.
    Reject,
}

/// Callback invoked with the context, the raw header (if any) and the
/// rejection message before a rejection response is sent.
///
/// The message is the response body without its trailing newline, e.g.
/// `"Bad Request: missing x-rh-identity header"`.
pub type RejectionObserver = dyn Fn(&RequestContext, Option<&str>, &str) + Send + Sync;

/// Middleware that enforces a valid `x-rh-identity` header.
///
/// # Example
///
/// ```
/// use xrhid_core::ValidationPolicy;
/// use xrhid_middleware::stages::{DuplicateHeaderPolicy, IdentityMiddleware};
///
/// let middleware = IdentityMiddleware::new()
///     .with_policy(ValidationPolicy::OrgIdOnly)
///     .with_duplicate_headers(DuplicateHeaderPolicy::Reject)
///     .with_observer(|_ctx, _raw, reason| eprintln!("rejected: {reason}"));
///
/// assert_eq!(middleware.validator().policy(), ValidationPolicy::OrgIdOnly);
/// ```
#[derive(Clone, Default)]
pub struct IdentityMiddleware {
    validator: Validator,
    duplicates: DuplicateHeaderPolicy,
    observer: Option<Arc<RejectionObserver>>,
}

impl IdentityMiddleware {
    /// Creates a middleware with the default policy and duplicate handling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the validation policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.validator = Validator::new(policy);
        self
    }

    /// Sets the duplicate header policy.
    #[must_use]
    pub fn with_duplicate_headers(mut self, duplicates: DuplicateHeaderPolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Sets the rejection observer.
    ///
    /// The observer sees every rejection exactly once and cannot change the
    /// response.
    #[must_use]
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&RequestContext, Option<&str>, &str) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Returns the validator.
    #[must_use]
    pub const fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Returns the duplicate header policy.
    #[must_use]
    pub const fn duplicate_headers(&self) -> DuplicateHeaderPolicy {
        self.duplicates
    }

    /// Selects the header value to decode according to the duplicate policy.
    fn select_header<'r>(&self, request: &'r Request) -> Result<&'r [u8], DecodeError> {
        let mut values = request.headers().get_all(IDENTITY_HEADER).iter();
        let first = values.next().ok_or(DecodeError::MissingHeader)?;

        if self.duplicates == DuplicateHeaderPolicy::Reject && values.next().is_some() {
            return Err(DecodeError::MissingHeader);
        }

        Ok(first.as_bytes())
    }

    /// Runs the decode and validate steps.
    fn enrich(&self, ctx: &RequestContext, request: &Request) -> Result<RequestContext, IdentityError> {
        let header = self.select_header(request)?;
        ctx.decode_into(header, &self.validator)
    }

    /// Notifies the observer and builds the rejection response.
    fn reject(&self, ctx: &RequestContext, request: &Request, err: &IdentityError) -> Response {
        let status = err.status_code();
        let message = status_message(status, &err.to_string());
        let raw = request
            .headers()
            .get(IDENTITY_HEADER)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        if let Some(observer) = &self.observer {
            observer(ctx, raw.as_deref(), &message);
        }

        tracing::debug!(
            request_id = ctx.request_id().map(|id| id.as_str()).unwrap_or_default(),
            error.kind = err.kind().as_str(),
            error = %message,
            "Rejected identity header"
        );
        record_identity_rejection(err.kind().as_str());

        Response::plain_error(status, &message)
    }
}

impl std::fmt::Debug for IdentityMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityMiddleware")
            .field("policy", &self.validator.policy())
            .field("duplicates", &self.duplicates)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Middleware for IdentityMiddleware {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            match self.enrich(&ctx, &request) {
                Ok(enriched) => {
                    if let Some(id) = enriched.identity() {
                        tracing::trace!(
                            identity = %id.identity.log_id(),
                            org_id = %id.identity.org_id,
                            "Identity accepted"
                        );
                    }
                    next.run(enriched, request).await
                }
                Err(err) => self.reject(&ctx, &request, &err),
            }
        })
    }
}
