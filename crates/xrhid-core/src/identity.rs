//! The `x-rh-identity` data model.
//!
//! [`XRhIdentity`] is the envelope carried (base64 encoded) in the
//! `x-rh-identity` header. It holds the principal [`Identity`] and the
//! organization's [`Entitlements`].
//!
//! Every field has a zero value: a field missing from the payload, or sent
//! as JSON `null`, decodes to the empty string, `false`, or an empty record.
//! The same holds for `null` entitlement values and `null` associate roles.
//! Unknown fields are ignored so that newer gateways can add fields without
//! breaking older services.
//!
//! A key repeated within one JSON object is rejected as a payload error
//! rather than resolved to either value.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Organization entitlements keyed by service name.
pub type Entitlements = BTreeMap<String, ServiceDetails>;

/// The decoded `x-rh-identity` payload.
///
/// # Example
///
/// ```
/// use xrhid_core::XRhIdentity;
///
/// let id: XRhIdentity = serde_json::from_str(
///     r#"{"identity": {"org_id": "1979710", "type": "User"}}"#,
/// ).unwrap();
///
/// assert_eq!(id.identity.org_id, "1979710");
/// assert!(id.entitlements.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XRhIdentity {
    /// The authenticated principal.
    #[serde(default, deserialize_with = "null_as_default")]
    pub identity: Identity,

    /// Services the organization is entitled to.
    #[serde(
        default,
        deserialize_with = "null_entries_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub entitlements: Entitlements,
}

/// Entitlement flags for a single service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDetails {
    /// Whether the organization is entitled to the service.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_entitled: bool,

    /// Whether the entitlement is a trial.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_trial: bool,
}

/// The principal identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Legacy tenant identifier. Empty means absent.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub account_number: String,

    /// Account number of the employee, if any.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub employee_account_number: String,

    /// Organization identifier.
    ///
    /// After decoding this holds the effective org id, see
    /// [`Identity::apply_org_id_fallback`].
    #[serde(default, deserialize_with = "null_as_default")]
    pub org_id: String,

    /// Metadata set by the gateway.
    #[serde(default, deserialize_with = "null_as_default")]
    pub internal: Internal,

    /// Present for human users.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_default"
    )]
    pub user: User,

    /// Present for system (certificate) principals.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_default"
    )]
    pub system: System,

    /// Present for internal employees.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_default"
    )]
    pub associate: Associate,

    /// Present for x509 certificate principals.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_default"
    )]
    pub x509: X509,

    /// Present for OAuth service accounts.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_default"
    )]
    pub service_account: ServiceAccount,

    /// Principal type discriminator (`User`, `Associate`, `X509`, ...).
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub principal_type: String,

    /// Free-form authentication mechanism label. Not validated.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub auth_type: String,
}

/// The `internal` record set by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Internal {
    /// Organization identifier as seen by the gateway.
    #[serde(default, deserialize_with = "null_as_default")]
    pub org_id: String,

    /// Authentication timestamp.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_default"
    )]
    pub auth_time: f64,

    /// Whether the request uses cross-account access.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_default"
    )]
    pub cross_access: bool,
}

/// The `user` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    /// Email address.
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Given name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    /// Family name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    /// Whether the account is active.
    #[serde(rename = "is_active", default, deserialize_with = "null_as_default")]
    pub active: bool,
    /// Whether the user administers the organization.
    #[serde(rename = "is_org_admin", default, deserialize_with = "null_as_default")]
    pub org_admin: bool,
    /// Whether the user is an internal employee.
    #[serde(rename = "is_internal", default, deserialize_with = "null_as_default")]
    pub internal: bool,
    /// Preferred locale, e.g. `en_US`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub locale: String,
    /// Stable user identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,
}

/// The `system` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    /// Certificate common name.
    #[serde(
        rename = "cn",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub common_name: String,
    /// Certificate type.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub cert_type: String,
    /// Cluster identifier.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub cluster_id: String,
}

/// The `associate` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Associate {
    /// Roles granted to the associate.
    #[serde(rename = "Role", default, deserialize_with = "null_items_as_default")]
    pub roles: Vec<String>,
    /// Email address.
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Given name.
    #[serde(rename = "givenName", default, deserialize_with = "null_as_default")]
    pub given_name: String,
    /// Employee UUID.
    #[serde(rename = "rhatUUID", default, deserialize_with = "null_as_default")]
    pub rhat_uuid: String,
    /// Family name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub surname: String,
}

/// The `x509` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct X509 {
    /// Subject distinguished name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject_dn: String,
    /// Issuer distinguished name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub issuer_dn: String,
}

/// The `service_account` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    /// OAuth client identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub client_id: String,
    /// Service account user name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
}

/// Recognized principal types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrincipalType {
    /// A human account.
    User,
    /// An internal employee.
    Associate,
    /// A certificate-based principal.
    X509,
    /// A system or service principal.
    System,
    /// An OAuth service account.
    ServiceAccount,
    /// Any type not known to this crate.
    Other(String),
}

impl PrincipalType {
    /// Parses a `type` field value. Matching is case-sensitive.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "User" => Self::User,
            "Associate" => Self::Associate,
            "X509" => Self::X509,
            "System" => Self::System,
            "ServiceAccount" => Self::ServiceAccount,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "User",
            Self::Associate => "Associate",
            Self::X509 => "X509",
            Self::System => "System",
            Self::ServiceAccount => "ServiceAccount",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Identity {
    /// Returns the parsed principal type, or `None` when `type` is empty.
    #[must_use]
    pub fn principal(&self) -> Option<PrincipalType> {
        if self.principal_type.is_empty() {
            None
        } else {
            Some(PrincipalType::parse(&self.principal_type))
        }
    }

    /// Copies `internal.org_id` to `org_id` when the top-level value is empty.
    ///
    /// The decoder calls this exactly once, right after parsing.
    pub fn apply_org_id_fallback(&mut self) {
        if self.org_id.is_empty() && !self.internal.org_id.is_empty() {
            self.org_id = self.internal.org_id.clone();
        }
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// Never contains the raw header. The format is `<kind>:<name>`, e.g.
    /// `user:jdoe` or `x509:/CN=svc`.
    #[must_use]
    pub fn log_id(&self) -> String {
        match self.principal() {
            Some(PrincipalType::User) => format!("user:{}", self.user.username),
            Some(PrincipalType::Associate) => format!("associate:{}", self.associate.email),
            Some(PrincipalType::X509) => format!("x509:{}", self.x509.subject_dn),
            Some(PrincipalType::System) => format!("system:{}", self.system.common_name),
            Some(PrincipalType::ServiceAccount) => {
                format!("service_account:{}", self.service_account.client_id)
            }
            Some(PrincipalType::Other(other)) => other,
            None => "unknown".to_string(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Like [`null_as_default`], and also maps `null` map values to `T::default()`.
fn null_entries_as_default<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let entries = Option::<BTreeMap<String, Option<T>>>::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}

/// Like [`null_as_default`], and also maps `null` items to `T::default()`.
fn null_items_as_default<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}
