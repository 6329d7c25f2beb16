//! Error types for identity decoding and validation.
//!
//! Every failure is a value. [`DecodeError`] covers the header-to-struct
//! pipeline, [`ValidationError`] covers the acceptance policy, and
//! [`IdentityError`] unifies both for callers that run the whole pipeline.
//!
//! The `Display` text of each variant is the reason shown to clients in the
//! `400 Bad Request` body, so it is part of the wire contract.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`IdentityError`].
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Errors produced while turning a header value into an identity.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The header is absent, empty, or present an unacceptable number of times.
    #[error("missing x-rh-identity header")]
    MissingHeader,

    /// The header value is not valid padded standard base64.
    #[error("unable to b64 decode x-rh-identity header")]
    BadEncoding(#[source] base64::DecodeError),

    /// The decoded bytes are not a valid identity document.
    #[error("x-rh-identity header does not contain valid JSON: {0}")]
    BadPayload(#[source] serde_json::Error),
}

/// Policy violations found in a decoded identity.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationError {
    /// The effective org id is empty.
    #[error("x-rh-identity header has an invalid or missing org_id")]
    InvalidOrgId,

    /// The `type` field is empty.
    #[error("x-rh-identity header is missing type")]
    MissingType,

    /// The account number is empty or the `-1` sentinel.
    #[error("x-rh-identity header has an invalid or missing account number")]
    InvalidAccountNumber,
}

/// Failure to serialize an identity back to header form.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// JSON serialization failed.
    #[error("unable to serialize identity: {0}")]
    Json(#[from] serde_json::Error),
}

/// Any failure of the decode-and-validate pipeline.
#[derive(Error, Debug)]
pub enum IdentityError {
    /// Decoding failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Stable classification of identity failures.
///
/// Used for metric labels and structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`DecodeError::MissingHeader`].
    MissingHeader,
    /// See [`DecodeError::BadEncoding`].
    BadEncoding,
    /// See [`DecodeError::BadPayload`].
    BadPayload,
    /// See [`ValidationError::InvalidOrgId`].
    InvalidOrgId,
    /// See [`ValidationError::MissingType`].
    MissingType,
    /// See [`ValidationError::InvalidAccountNumber`].
    InvalidAccountNumber,
}

impl ErrorKind {
    /// Returns the snake_case name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::BadEncoding => "bad_encoding",
            Self::BadPayload => "bad_payload",
            Self::InvalidOrgId => "invalid_org_id",
            Self::MissingType => "missing_type",
            Self::InvalidAccountNumber => "invalid_account_number",
        }
    }
}

impl DecodeError {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingHeader => ErrorKind::MissingHeader,
            Self::BadEncoding(_) => ErrorKind::BadEncoding,
            Self::BadPayload(_) => ErrorKind::BadPayload,
        }
    }
}

impl ValidationError {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::InvalidOrgId => ErrorKind::InvalidOrgId,
            Self::MissingType => ErrorKind::MissingType,
            Self::InvalidAccountNumber => ErrorKind::InvalidAccountNumber,
        }
    }
}

impl IdentityError {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(err) => err.kind(),
            Self::Validation(err) => err.kind(),
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Malformed identity input is never transient, so every kind maps to
    /// `400 Bad Request`.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    #[test]
    fn test_decode_error_messages() {
        assert_eq!(
            DecodeError::MissingHeader.to_string(),
            "missing x-rh-identity header"
        );

        let b64 = base64::engine::general_purpose::STANDARD
            .decode("=")
            .unwrap_err();
        assert_eq!(
            DecodeError::BadEncoding(b64).to_string(),
            "unable to b64 decode x-rh-identity header"
        );

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let message = DecodeError::BadPayload(json).to_string();
        assert!(message.starts_with("x-rh-identity header does not contain valid JSON: "));
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::InvalidOrgId.to_string(),
            "x-rh-identity header has an invalid or missing org_id"
        );
        assert_eq!(
            ValidationError::MissingType.to_string(),
            "x-rh-identity header is missing type"
        );
        assert_eq!(
            ValidationError::InvalidAccountNumber.to_string(),
            "x-rh-identity header has an invalid or missing account number"
        );
    }

    #[test]
    fn test_identity_error_is_transparent() {
        let err = IdentityError::from(ValidationError::MissingType);
        assert_eq!(err.to_string(), "x-rh-identity header is missing type");
        assert_eq!(err.kind(), ErrorKind::MissingType);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = IdentityError::from(DecodeError::MissingHeader);
        assert_eq!(err.kind(), ErrorKind::MissingHeader);
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let json = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = DecodeError::BadPayload(json);
        assert!(err.source().is_some());
        assert!(DecodeError::MissingHeader.source().is_none());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::InvalidOrgId).unwrap();
        assert_eq!(json, "\"invalid_org_id\"");
        assert_eq!(ErrorKind::BadPayload.as_str(), "bad_payload");
    }
}
