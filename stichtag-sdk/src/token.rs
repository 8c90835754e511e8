//! Signed access tokens.
//!
//! The wire format is:
//!
//! ```text
//! Authorization: Bearer {base64_claims_json}.{base64_signature}
//! ```
//!
//! where the signature is `HMAC-SHA256(claims_json, secret)` and both parts
//! use RFC 4648 base64 without padding. Verification checks the format,
//! then the signature, then the expiry.

use compact_str::CompactString;
use fast32::base64::RFC4648_NOPAD;
use serde::{Deserialize, Serialize};

use crate::objects::users::Role;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Username the token was issued to.
    pub sub: CompactString,
    /// Role at issue time.
    pub role: Role,
    /// Unix timestamp the token expires at.
    pub exp: i64,
}

/// Errors produced by token verification.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token format")]
    InvalidFormat,
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("invalid claims: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid signature")]
    SignatureMismatch,
    #[error("token expired")]
    Expired,
}

impl From<ring::error::Unspecified> for TokenError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// Issue a token for `username`, valid for `ttl_minutes` from now.
///
/// Returns the token string and its expiry timestamp.
pub fn issue(
    username: &str,
    role: Role,
    ttl_minutes: i64,
    key: &[u8],
) -> Result<(String, i64), serde_json::Error> {
    let exp = time::OffsetDateTime::now_utc().unix_timestamp() + ttl_minutes * 60;
    let claims = TokenClaims {
        sub: CompactString::from(username),
        role,
        exp,
    };
    let json = serde_json::to_vec(&claims)?;
    let signature = ring::hmac::sign(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
        &json,
    );
    let token = format!(
        "{}.{}",
        RFC4648_NOPAD.encode(&json),
        RFC4648_NOPAD.encode(signature.as_ref())
    );
    Ok((token, exp))
}

/// Verify a token and return its claims.
pub fn verify(token: &str, key: &[u8]) -> Result<TokenClaims, TokenError> {
    let (claims_part, signature_part) =
        token.split_once('.').ok_or(TokenError::InvalidFormat)?;
    let json = RFC4648_NOPAD
        .decode_str(claims_part)
        .map_err(|_| TokenError::InvalidBase64)?;
    let signature = RFC4648_NOPAD
        .decode_str(signature_part)
        .map_err(|_| TokenError::InvalidBase64)?;
    ring::hmac::verify(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
        &json,
        &signature,
    )?;
    let claims: TokenClaims = serde_json::from_slice(&json)?;
    if claims.exp < time::OffsetDateTime::now_utc().unix_timestamp() {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}
