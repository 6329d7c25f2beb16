//! Request context types.
//!
//! The [`RequestContext`] carries per-request state through the middleware
//! pipeline and into handlers. It is an immutable snapshot: every `with_*`
//! method returns a derived context and leaves the receiver untouched.

use crate::decode::{decode_and_validate, encode};
use crate::error::IdentityResult;
use crate::identity::XRhIdentity;
use crate::policy::Validator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A request correlation identifier.
///
/// Incoming identifiers are preserved verbatim, so this wraps a string rather
/// than a UUID. Generated identifiers are UUID v7, which are time-ordered.
///
/// # Example
///
/// ```
/// use xrhid_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.as_str().len(), 36);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generates a new UUID v7 request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Per-request context that flows through the middleware pipeline.
///
/// Holds the decoded identity, the raw header it came from, and the request
/// id. The identity and raw header are independent bindings; a context may
/// carry either, both, or neither.
///
/// # Example
///
/// ```
/// use xrhid_core::{fixtures, RequestContext, Validator};
///
/// let header = fixtures::encode_json(fixtures::EXAMPLE_IDENTITY_JSON);
/// let ctx = RequestContext::new()
///     .decode_into(&header, &Validator::default())
///     .unwrap();
///
/// assert_eq!(ctx.identity().unwrap().identity.org_id, "1979710");
/// assert_eq!(ctx.raw_identity(), Some(header.as_str()));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    identity: Option<Arc<XRhIdentity>>,
    raw_identity: Option<Arc<str>>,
    request_id: Option<RequestId>,
}

impl RequestContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            identity: None,
            raw_identity: None,
            request_id: None,
        }
    }

    /// Returns a derived context carrying `identity`.
    #[must_use]
    pub fn with_identity(&self, identity: XRhIdentity) -> Self {
        Self {
            identity: Some(Arc::new(identity)),
            ..self.clone()
        }
    }

    /// Returns the stored identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&XRhIdentity> {
        self.identity.as_deref()
    }

    /// Returns a derived context carrying the raw header value.
    #[must_use]
    pub fn with_raw_identity(&self, raw: impl Into<String>) -> Self {
        let raw: String = raw.into();
        Self {
            raw_identity: Some(Arc::from(raw)),
            ..self.clone()
        }
    }

    /// Returns the raw header value, if any.
    #[must_use]
    pub fn raw_identity(&self) -> Option<&str> {
        self.raw_identity.as_deref()
    }

    /// Re-encodes the stored identity into header form.
    ///
    /// Returns an empty string when no identity is stored or it cannot be
    /// serialized.
    #[must_use]
    pub fn encode_identity(&self) -> String {
        self.identity()
            .and_then(|id| encode(id).ok())
            .unwrap_or_default()
    }

    /// Returns a derived context carrying `request_id`.
    #[must_use]
    pub fn with_request_id(&self, request_id: impl Into<RequestId>) -> Self {
        Self {
            request_id: Some(request_id.into()),
            ..self.clone()
        }
    }

    /// Returns the request ID, if one was assigned.
    #[must_use]
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Decodes and validates `header`, storing both bindings on success.
    ///
    /// On failure `self` is unchanged and nothing is stored.
    pub fn decode_into(
        &self,
        header: impl AsRef<[u8]>,
        validator: &Validator,
    ) -> IdentityResult<Self> {
        let header = header.as_ref();
        let id = decode_and_validate(header, validator)?;
        Ok(self
            .with_identity(id)
            .with_raw_identity(String::from_utf8_lossy(header)))
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
