//! HMAC-SHA256 signing key derivation.
//!
//! `k0 = HMAC(secret, date)`, `k1 = HMAC(k0, "*")`, `k2 = HMAC(k1, service)`,
//! `key = HMAC(k2, request_type)`. The order is part of the wire contract.

use crate::{
    config::{SigningContext, REGION_MARKER},
    error::{Result, SigningError},
};
use hmac::{digest::FixedOutput, Hmac, Mac};
use secrecy::zeroize::Zeroizing;
use sha2::{digest::generic_array::GenericArray, Sha256};

pub type HmacSha256 = Hmac<Sha256>;

/// Length of a derived signing key in bytes
pub const SIGNING_KEY_LEN: usize = 32;

/// 256-bit key at the end of the HMAC chain
///
/// Zeroized on drop; only exposed to the key generator. The chain writes
/// its last HMAC output straight into this buffer.
pub struct DerivedKey(Zeroizing<[u8; SIGNING_KEY_LEN]>);

impl DerivedKey {
    /// Wrap caller-owned key bytes; the caller's copy is not wiped
    pub fn from_bytes(bytes: [u8; SIGNING_KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn expose(&self) -> &[u8; SIGNING_KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive the signing key for `ctx`
///
/// # Errors
/// - `Compute` if the secret is empty or an HMAC key is rejected
///
/// No partial key is returned; intermediate keys are zeroized on every path.
pub fn derive_signing_key(ctx: &SigningContext<'_>) -> Result<DerivedKey> {
    if ctx.secret.is_empty() {
        return Err(SigningError::Compute("secret must not be empty".to_string()));
    }

    let k0 = hmac_sha256(ctx.secret, ctx.date.as_bytes())?;
    let k1 = hmac_sha256(k0.as_slice(), REGION_MARKER.as_bytes())?;
    let k2 = hmac_sha256(k1.as_slice(), ctx.service.as_bytes())?;
    let key = hmac_sha256(k2.as_slice(), ctx.request_type.as_bytes())?;

    Ok(DerivedKey(key))
}

fn hmac_sha256(key: &[u8], msg: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| SigningError::Compute(format!("HMAC key rejected: {}", e)))?;
    mac.update(msg);
    let mut out = Zeroizing::new([0u8; 32]);
    mac.finalize_into(GenericArray::from_mut_slice(out.as_mut_slice()));
    Ok(out)
}
