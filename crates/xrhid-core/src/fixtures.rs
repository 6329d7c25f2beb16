//! Test fixtures for identity handling.
//!
//! Pre-built identity documents that can be used in tests across the
//! workspace.
//!
//! # Example
//!
//! ```
//! use xrhid_core::{decode, fixtures};
//!
//! let header = fixtures::encode_json(fixtures::EXAMPLE_IDENTITY_JSON);
//! let id = decode(&header).unwrap();
//!
//! assert_eq!(id.identity.org_id, "1979710");
//! ```

use crate::identity::XRhIdentity;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A user identity shaped like the ones issued by the staging gateway.
pub const EXAMPLE_IDENTITY_JSON: &str = r#"{
  "identity": {
    "account_number": "540155",
    "auth_type": "jwt-auth",
    "org_id": "1979710",
    "type": "User",
    "user": {
      "username": "Test",
      "email": "test@test.com",
      "first_name": "Test",
      "last_name": "User",
      "is_active": true,
      "is_org_admin": true,
      "is_internal": true,
      "locale": "en_US",
      "user_id": "55555555"
    },
    "internal": {
      "org_id": "1979710"
    }
  },
  "entitlements": {
    "insights": {"is_entitled": true, "is_trial": false},
    "cost_management": {"is_entitled": true, "is_trial": false},
    "ansible": {"is_entitled": false, "is_trial": false}
  }
}"#;

/// A service-account identity without an account number.
pub const SERVICE_ACCOUNT_JSON: &str = r#"{
  "identity": {
    "org_id": "456",
    "type": "ServiceAccount",
    "auth_type": "jwt-auth",
    "service_account": {
      "client_id": "0000",
      "username": "jdoe"
    },
    "internal": {
      "org_id": "456"
    }
  }
}"#;

/// Minimal documents that every policy accepts.
///
/// The org id is only present under `internal`, so decoding them exercises
/// the org id fallback.
pub const VALID_JSON: [&str; 2] = [
    r#"{ "identity": {"account_number": "540155", "type": "User", "internal": { "org_id": "1979710" } } }"#,
    r#"{ "identity": {"account_number": "540155", "type": "Associate", "internal": { "org_id": "1979710" } } }"#,
];

/// Base64 encodes a JSON document the way the gateway does.
#[must_use]
pub fn encode_json(json: &str) -> String {
    STANDARD.encode(json.as_bytes())
}

/// Returns the decoded [`EXAMPLE_IDENTITY_JSON`] document.
#[must_use]
pub fn example_identity() -> XRhIdentity {
    let mut id: XRhIdentity =
        serde_json::from_str(EXAMPLE_IDENTITY_JSON).unwrap_or_default();
    id.identity.apply_org_id_fallback();
    id
}
