//! Identity validation policy.
//!
//! A [`ValidationPolicy`] names a level of strictness. Each policy expands to
//! an ordered chain of [`Rule`]s, which a [`Validator`] evaluates until one of
//! them accepts or rejects the identity.
//!
//! | Policy | Rules |
//! |---|---|
//! | [`ValidationPolicy::LegacyAccountNumberRequired`] | exemption, org id, type, account number |
//! | [`ValidationPolicy::OrgIdOnly`] | org id, type |
//! | [`ValidationPolicy::RelaxedAssociateExempt`] | exemption, org id, type |

use crate::error::ValidationError;
use crate::identity::{PrincipalType, XRhIdentity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result of evaluating a single [`Rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The identity is valid; stop evaluating.
    Accept,
    /// No decision; evaluate the next rule.
    Continue,
    /// The identity is invalid; stop evaluating.
    Reject(ValidationError),
}

/// A single validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Accepts `Associate` and `X509` principals that carry no account number.
    AssociateExemption,
    /// Rejects an empty effective org id.
    OrgIdPresent,
    /// Rejects an empty `type`.
    TypePresent,
    /// Rejects an empty or `-1` account number.
    AccountNumberValid,
}

impl Rule {
    /// Evaluates the rule against `id`.
    #[must_use]
    pub fn evaluate(self, id: &XRhIdentity) -> RuleOutcome {
        let identity = &id.identity;
        match self {
            Self::AssociateExemption => match identity.principal() {
                Some(PrincipalType::Associate | PrincipalType::X509)
                    if identity.account_number.is_empty() =>
                {
                    RuleOutcome::Accept
                }
                _ => RuleOutcome::Continue,
            },
            Self::OrgIdPresent if identity.org_id.is_empty() => {
                RuleOutcome::Reject(ValidationError::InvalidOrgId)
            }
            Self::TypePresent if identity.principal_type.is_empty() => {
                RuleOutcome::Reject(ValidationError::MissingType)
            }
            Self::AccountNumberValid
                if identity.account_number.is_empty() || identity.account_number == "-1" =>
            {
                RuleOutcome::Reject(ValidationError::InvalidAccountNumber)
            }
            _ => RuleOutcome::Continue,
        }
    }

    /// Returns the rule name in snake_case.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AssociateExemption => "associate_exemption",
            Self::OrgIdPresent => "org_id_present",
            Self::TypePresent => "type_present",
            Self::AccountNumberValid => "account_number_valid",
        }
    }
}

/// Named validation strictness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Requires a valid account number except for exempt principals.
    LegacyAccountNumberRequired,
    /// Requires org id and type for every principal.
    OrgIdOnly,
    /// Requires org id and type, exempting associates and x509 principals
    /// without an account number.
    #[default]
    RelaxedAssociateExempt,
}

impl ValidationPolicy {
    /// Returns the ordered rule chain of this policy.
    #[must_use]
    pub const fn rules(self) -> &'static [Rule] {
        match self {
            Self::LegacyAccountNumberRequired => &[
                Rule::AssociateExemption,
                Rule::OrgIdPresent,
                Rule::TypePresent,
                Rule::AccountNumberValid,
            ],
            Self::OrgIdOnly => &[Rule::OrgIdPresent, Rule::TypePresent],
            Self::RelaxedAssociateExempt => &[
                Rule::AssociateExemption,
                Rule::OrgIdPresent,
                Rule::TypePresent,
            ],
        }
    }

    /// Returns the policy name in snake_case.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LegacyAccountNumberRequired => "legacy_account_number_required",
            Self::OrgIdOnly => "org_id_only",
            Self::RelaxedAssociateExempt => "relaxed_associate_exempt",
        }
    }
}

impl fmt::Display for ValidationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown validation policy: {0}")]
pub struct UnknownPolicy(pub String);

impl FromStr for ValidationPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy_account_number_required" => Ok(Self::LegacyAccountNumberRequired),
            "org_id_only" => Ok(Self::OrgIdOnly),
            "relaxed_associate_exempt" => Ok(Self::RelaxedAssociateExempt),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// Validates decoded identities against a [`ValidationPolicy`].
///
/// # Example
///
/// ```
/// use xrhid_core::{decode, fixtures, ValidationPolicy, Validator};
///
/// let validator = Validator::new(ValidationPolicy::OrgIdOnly);
/// let id = decode(fixtures::encode_json(fixtures::EXAMPLE_IDENTITY_JSON)).unwrap();
///
/// assert!(validator.validate(&id).is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    policy: ValidationPolicy,
}

impl Validator {
    /// Creates a validator for `policy`.
    #[must_use]
    pub const fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    /// Returns the configured policy.
    #[must_use]
    pub const fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Returns the rule chain in evaluation order.
    #[must_use]
    pub const fn rules(&self) -> &'static [Rule] {
        self.policy.rules()
    }

    /// Validates `id`, returning the first rejection.
    pub fn validate(&self, id: &XRhIdentity) -> Result<(), ValidationError> {
        for rule in self.rules() {
            match rule.evaluate(id) {
                RuleOutcome::Accept => return Ok(()),
                RuleOutcome::Continue => {}
                RuleOutcome::Reject(err) => return Err(err),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Identity, Internal};
    use proptest::prelude::*;

    fn identity(account: &str, org: &str, kind: &str) -> XRhIdentity {
        XRhIdentity {
            identity: Identity {
                account_number: account.to_string(),
                org_id: org.to_string(),
                principal_type: kind.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    const ALL_POLICIES: [ValidationPolicy; 3] = [
        ValidationPolicy::LegacyAccountNumberRequired,
        ValidationPolicy::OrgIdOnly,
        ValidationPolicy::RelaxedAssociateExempt,
    ];

    #[test]
    fn test_default_policy() {
        assert_eq!(
            Validator::default().policy(),
            ValidationPolicy::RelaxedAssociateExempt
        );
    }

    #[test]
    fn test_complete_identity_passes_every_policy() {
        let id = identity("540155", "1979710", "User");
        for policy in ALL_POLICIES {
            assert_eq!(Validator::new(policy).validate(&id), Ok(()), "{policy}");
        }
    }

    #[test]
    fn test_missing_org_id() {
        let id = identity("540155", "", "User");
        for policy in ALL_POLICIES {
            assert_eq!(
                Validator::new(policy).validate(&id),
                Err(ValidationError::InvalidOrgId)
            );
        }
    }

    #[test]
    fn test_missing_type() {
        let id = identity("540155", "1979710", "");
        for policy in ALL_POLICIES {
            assert_eq!(
                Validator::new(policy).validate(&id),
                Err(ValidationError::MissingType)
            );
        }
    }

    #[test]
    fn test_org_id_checked_before_type() {
        let id = identity("", "", "");
        assert_eq!(
            Validator::default().validate(&id),
            Err(ValidationError::InvalidOrgId)
        );
    }

    #[test]
    fn test_associate_and_x509_exemption() {
        for kind in ["Associate", "X509"] {
            let id = identity("", "", kind);
            assert_eq!(Validator::default().validate(&id), Ok(()));
            assert_eq!(
                Validator::new(ValidationPolicy::LegacyAccountNumberRequired).validate(&id),
                Ok(())
            );
        }
    }

    #[test]
    fn test_exemption_requires_empty_account() {
        let id = identity("540155", "", "Associate");
        assert_eq!(
            Validator::default().validate(&id),
            Err(ValidationError::InvalidOrgId)
        );
    }

    #[test]
    fn test_exemption_is_case_sensitive() {
        let id = identity("", "", "associate");
        assert_eq!(
            Validator::default().validate(&id),
            Err(ValidationError::InvalidOrgId)
        );
    }

    #[test]
    fn test_org_id_only_does_not_exempt_associates() {
        let id = identity("", "", "Associate");
        assert_eq!(
            Validator::new(ValidationPolicy::OrgIdOnly).validate(&id),
            Err(ValidationError::InvalidOrgId)
        );
    }

    #[test]
    fn test_legacy_policy_account_number() {
        let validator = Validator::new(ValidationPolicy::LegacyAccountNumberRequired);

        assert_eq!(
            validator.validate(&identity("", "1979710", "User")),
            Err(ValidationError::InvalidAccountNumber)
        );
        assert_eq!(
            validator.validate(&identity("-1", "1979710", "User")),
            Err(ValidationError::InvalidAccountNumber)
        );
        assert_eq!(
            Validator::default().validate(&identity("-1", "1979710", "User")),
            Ok(())
        );
    }

    #[test]
    fn test_fallback_org_id_satisfies_policy() {
        let mut id = identity("540155", "", "User");
        id.identity.internal = Internal {
            org_id: "X".to_string(),
            ..Default::default()
        };
        id.identity.apply_org_id_fallback();

        assert_eq!(Validator::default().validate(&id), Ok(()));
    }

    #[test]
    fn test_rules_are_exposed_in_order() {
        let rules = Validator::new(ValidationPolicy::LegacyAccountNumberRequired).rules();
        let names: Vec<_> = rules.iter().map(|rule| rule.name()).collect();
        assert_eq!(
            names,
            [
                "associate_exemption",
                "org_id_present",
                "type_present",
                "account_number_valid"
            ]
        );
        assert_eq!(ValidationPolicy::OrgIdOnly.rules().len(), 2);
    }

    #[test]
    fn test_rule_evaluate_individually() {
        let id = identity("", "", "X509");
        assert_eq!(Rule::AssociateExemption.evaluate(&id), RuleOutcome::Accept);
        assert_eq!(
            Rule::OrgIdPresent.evaluate(&id),
            RuleOutcome::Reject(ValidationError::InvalidOrgId)
        );
        assert_eq!(Rule::TypePresent.evaluate(&id), RuleOutcome::Continue);
    }

    #[test]
    fn test_policy_parse_and_serde() {
        for policy in ALL_POLICIES {
            assert_eq!(policy.as_str().parse::<ValidationPolicy>(), Ok(policy));
            let json = serde_json::to_string(&policy).unwrap();
            assert_eq!(json, format!("\"{}\"", policy.as_str()));
        }
        assert!("strict".parse::<ValidationPolicy>().is_err());
    }

    proptest! {
        #[test]
        fn prop_non_empty_org_and_type_pass_relaxed(
            org in "[^\\s]{1,16}",
            kind in "[A-Za-z0-9]{1,16}",
            account in "[0-9]{0,8}",
        ) {
            let id = identity(&account, &org, &kind);
            prop_assert_eq!(Validator::default().validate(&id), Ok(()));
        }
    }
}
