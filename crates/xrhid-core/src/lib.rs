//! # xrhid Core
//!
//! Identity model, decoding, validation and request context for the
//! `x-rh-identity` header.
//!
//! This crate provides the foundational types used throughout xrhid:
//!
//! - [`XRhIdentity`] - The decoded header payload
//! - [`decode`] / [`encode`] - Conversion between header values and identities
//! - [`Validator`] / [`ValidationPolicy`] - Layered acceptance rules
//! - [`RequestContext`] - Per-request snapshot carrying identity and request id
//! - [`IdentityError`] - Error taxonomy shared by every layer

#![doc(html_root_url = "https://docs.rs/xrhid-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
pub mod decode;
mod error;
pub mod fixtures;
mod identity;
pub mod policy;

pub use context::{RequestContext, RequestId};
pub use decode::{decode, decode_and_validate, encode, IDENTITY_HEADER};
pub use error::{
    DecodeError, EncodeError, ErrorKind, IdentityError, IdentityResult, ValidationError,
};
pub use identity::{
    Associate, Entitlements, Identity, Internal, PrincipalType, ServiceAccount, ServiceDetails,
    System, User, XRhIdentity, X509,
};
pub use policy::{Rule, RuleOutcome, UnknownPolicy, ValidationPolicy, Validator};
