//! Header decoding and encoding.
//!
//! The `x-rh-identity` header carries a JSON document encoded with the
//! standard, padded base64 alphabet. Non-zero trailing bits in the last
//! symbol are tolerated on decode, since some gateways emit them.

use crate::error::{DecodeError, EncodeError, IdentityResult};
use crate::identity::XRhIdentity;
use crate::policy::Validator;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

/// Standard padded alphabet, lenient about trailing bits.
const HEADER_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Canonical (lowercase) name of the identity header.
pub const IDENTITY_HEADER: &str = "x-rh-identity";

/// Decodes an `x-rh-identity` header value.
///
/// The steps run in order and the first failure wins:
///
/// 1. an empty value is [`DecodeError::MissingHeader`]
/// 2. invalid base64 is [`DecodeError::BadEncoding`]
/// 3. invalid JSON is [`DecodeError::BadPayload`]
/// 4. the org id fallback is applied to the result
///
/// # Example
///
/// ```
/// use xrhid_core::{decode, fixtures};
///
/// let header = fixtures::encode_json(fixtures::VALID_JSON[0]);
/// let id = decode(&header).unwrap();
///
/// // org_id was only present under `internal`
/// assert_eq!(id.identity.org_id, "1979710");
/// ```
pub fn decode(header: impl AsRef<[u8]>) -> Result<XRhIdentity, DecodeError> {
    let header = header.as_ref();
    if header.is_empty() {
        return Err(DecodeError::MissingHeader);
    }

    let json = HEADER_ENGINE.decode(header).map_err(DecodeError::BadEncoding)?;
    let mut id: XRhIdentity = serde_json::from_slice(&json).map_err(DecodeError::BadPayload)?;
    id.identity.apply_org_id_fallback();

    Ok(id)
}

/// Serializes an identity back to header form.
pub fn encode(id: &XRhIdentity) -> Result<String, EncodeError> {
    let json = serde_json::to_vec(id)?;
    Ok(HEADER_ENGINE.encode(json))
}

/// Decodes a header value and checks it against `validator`.
pub fn decode_and_validate(
    header: impl AsRef<[u8]>,
    validator: &Validator,
) -> IdentityResult<XRhIdentity> {
    let id = decode(header)?;
    validator.validate(&id)?;
    Ok(id)
}
