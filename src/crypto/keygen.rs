//! Deterministic P-256 key pair generation from a derived signing key.
//!
//! Counter-driven rejection sampling: `candidate = SHA-256(key || be32(counter))`
//! is accepted once `0 < candidate < n`. A draw is rejected with probability
//! about 2^-32, so the first iteration almost always succeeds; the loop is
//! still bounded by [`MAX_ITERATIONS`].

use crate::{
    crypto::hmac_chain::{DerivedKey, SIGNING_KEY_LEN},
    error::{Result, SigningError},
};
use p256::{
    ecdsa::{SigningKey, VerifyingKey},
    elliptic_curve::Curve,
    FieldBytes, NistP256, U256,
};
use secrecy::zeroize::{Zeroize, Zeroizing};
use sha2::{digest::generic_array::GenericArray, Digest, Sha256};
use tracing::{debug, warn};

/// Upper bound on rejection-sampling draws
pub const MAX_ITERATIONS: u32 = 1 << 16;

const SEED_LEN: usize = SIGNING_KEY_LEN + 4;

/// P-256 key pair derived from a signing key
///
/// The private scalar is zeroized when the pair is dropped. The public point
/// is only exposed so callers can check signatures locally.
pub struct EcKeyPair {
    signing_key: SigningKey,
    counter: u32,
}

impl EcKeyPair {
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Uncompressed SEC1 encoding of the public point
    pub fn public_key_sec1(&self) -> Vec<u8> {
        self.verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }

    /// Big-endian private scalar
    pub fn scalar_bytes(&self) -> Zeroizing<[u8; 32]> {
        let mut out = Zeroizing::new([0u8; 32]);
        let mut bytes = self.signing_key.to_bytes();
        out.copy_from_slice(&bytes);
        bytes.as_mut_slice().zeroize();
        out
    }

    /// Counter value of the accepted draw
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for EcKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcKeyPair")
            .field("public_key", &hex::encode(self.public_key_sec1()))
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

/// Derive the P-256 key pair for a signing key
pub fn derive_key_pair(key: &DerivedKey) -> Result<EcKeyPair> {
    derive_key_pair_from_slice(key.expose())
}

/// Derive a key pair from raw key bytes
///
/// Keys shorter than 32 bytes are zero-padded, longer keys are truncated to
/// their first 32 bytes.
///
/// # Errors
/// - `KeyDerivation` if no candidate is accepted within [`MAX_ITERATIONS`]
///   draws, or the accepted scalar cannot be installed
pub fn derive_key_pair_from_slice(key: &[u8]) -> Result<EcKeyPair> {
    derive_with_cap(key, MAX_ITERATIONS)
}

fn derive_with_cap(key: &[u8], max_iterations: u32) -> Result<EcKeyPair> {
    derive_with_bound(key, max_iterations, &NistP256::ORDER)
}

/// Rejection sampling accepting `0 < candidate < bound`
///
/// `bound` must not exceed the curve order.
fn derive_with_bound(key: &[u8], max_iterations: u32, bound: &U256) -> Result<EcKeyPair> {
    let mut seed = Zeroizing::new([0u8; SEED_LEN]);
    let used = key.len().min(SIGNING_KEY_LEN);
    seed[..used].copy_from_slice(&key[..used]);

    let mut digest = Zeroizing::new([0u8; 32]);
    for counter in 0..max_iterations {
        seed[SIGNING_KEY_LEN..].copy_from_slice(&counter.to_be_bytes());
        Sha256::new()
            .chain_update(seed.as_slice())
            .finalize_into(GenericArray::from_mut_slice(digest.as_mut_slice()));

        let candidate = U256::from_be_slice(digest.as_slice());
        if candidate == U256::ZERO || candidate >= *bound {
            debug!(counter, "rejected out-of-range scalar candidate");
            continue;
        }

        let signing_key = SigningKey::from_bytes(FieldBytes::from_slice(digest.as_slice()))
            .map_err(|e| {
                SigningError::KeyDerivation(format!("Failed to install private scalar: {}", e))
            })?;
        return Ok(EcKeyPair {
            signing_key,
            counter,
        });
    }

    warn!(max_iterations, "scalar rejection sampling exhausted");
    Err(SigningError::KeyDerivation(format!(
        "no valid scalar after {} draws",
        max_iterations
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TESTKEY_SIGNING_KEY: &str =
        "6f8becafecb25fdbc79e76f544ed1c1275ea3cbfd011bf0518a039bf9480d5a8";
    const TESTKEY_SCALAR: &str =
        "b63ebc873cf2a2db9d5631dd33284d83d11cf1048b36e86525ccdf3c5e815bd4";
    const TESTKEY_PUBLIC: &str = "04a328ee1d47525e1aff7ca096642d3275fbea3ff2878bab17f2acee0f05db40e3\
                                  5b211dad0fe955e4f44e3a72872661143a28acb59187eaa436cfda89c37e36e4";

    fn testkey() -> Vec<u8> {
        hex::decode(TESTKEY_SIGNING_KEY).unwrap()
    }

    #[test]
    fn test_known_answer_scalar_and_point() {
        let pair = derive_key_pair_from_slice(&testkey()).unwrap();
        assert_eq!(hex::encode(pair.scalar_bytes().as_slice()), TESTKEY_SCALAR);
        assert_eq!(hex::encode(pair.public_key_sec1()), TESTKEY_PUBLIC);
        assert_eq!(pair.counter(), 0);
    }

    #[test]
    fn test_repeatable() {
        let a = derive_key_pair_from_slice(&testkey()).unwrap();
        let b = derive_key_pair_from_slice(&testkey()).unwrap();
        assert_eq!(a.scalar_bytes(), b.scalar_bytes());
        assert_eq!(a.verifying_key(), b.verifying_key());
    }

    #[test]
    fn test_derived_key_matches_slice() {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&testkey());
        let pair = derive_key_pair(&DerivedKey::from_bytes(bytes)).unwrap();
        assert_eq!(hex::encode(pair.scalar_bytes().as_slice()), TESTKEY_SCALAR);
    }

    #[test]
    fn test_short_key_is_zero_padded() {
        let short = derive_key_pair_from_slice(&[1, 2, 3]).unwrap();
        let mut padded = [0u8; 32];
        padded[..3].copy_from_slice(&[1, 2, 3]);
        let explicit = derive_key_pair_from_slice(&padded).unwrap();

        assert_eq!(short.scalar_bytes(), explicit.scalar_bytes());
        assert_eq!(
            hex::encode(short.scalar_bytes().as_slice()),
            "869f896ef3c1331f55b53f8c37344966e9b0a35203c184ed3932397babc0811f"
        );
    }

    #[test]
    fn test_long_key_is_truncated() {
        let mut long = testkey();
        long.extend_from_slice(b"ignored tail");
        let pair = derive_key_pair_from_slice(&long).unwrap();
        assert_eq!(hex::encode(pair.scalar_bytes().as_slice()), TESTKEY_SCALAR);
    }

    #[test]
    fn test_iteration_cap_is_enforced() {
        let result = derive_with_cap(&testkey(), 0);
        assert!(matches!(result, Err(SigningError::KeyDerivation(_))));
    }

    // Draws 0..=4 for the test key are all >= 0x20.., draw 5 starts 0x1651..
    const LOW_BOUND: &str = "2000000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn test_rejected_draws_retry_with_next_counter() {
        let bound = U256::from_be_hex(LOW_BOUND);
        let pair = derive_with_bound(&testkey(), MAX_ITERATIONS, &bound).unwrap();

        assert_eq!(pair.counter(), 5);
        let mut seed = testkey();
        seed.extend_from_slice(&5u32.to_be_bytes());
        assert_eq!(
            pair.scalar_bytes().as_slice(),
            Sha256::digest(&seed).as_slice()
        );
        assert_eq!(
            hex::encode(pair.scalar_bytes().as_slice()),
            "1651611e85b2daf0db952b7a5ec2f4e6da09fc5266ee4138375b6cc1ea7644e6"
        );
    }

    #[test]
    fn test_cap_counts_every_rejected_draw() {
        let bound = U256::from_be_hex(LOW_BOUND);

        let result = derive_with_bound(&testkey(), 5, &bound);
        match result {
            Err(SigningError::KeyDerivation(msg)) => assert!(msg.contains("after 5 draws")),
            other => panic!("expected KeyDerivation, got {:?}", other),
        }
        assert_eq!(
            derive_with_bound(&testkey(), 6, &bound).unwrap().counter(),
            5
        );
    }

    #[test]
    fn test_bound_rejecting_everything_fails() {
        let result = derive_with_bound(&testkey(), 16, &U256::ONE);
        assert!(matches!(result, Err(SigningError::KeyDerivation(_))));
    }

    #[test]
    fn test_debug_omits_scalar() {
        let pair = derive_key_pair_from_slice(&testkey()).unwrap();
        assert!(!format!("{:?}", pair).contains(TESTKEY_SCALAR));
    }
}
