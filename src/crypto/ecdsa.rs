use crate::{
    config::NonceMode,
    crypto::keygen::EcKeyPair,
    error::{Result, SigningError},
};
use p256::ecdsa::{
    signature::hazmat::{PrehashSigner, RandomizedPrehashSigner},
    DerSignature, Signature,
};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Sign a canonical string with the derived private key
///
/// The message is hashed with SHA-256 and the digest is signed directly.
/// With [`NonceMode::Random`] repeated calls give different signatures that
/// all verify under the same public key.
///
/// # Arguments
/// * `key_pair` - Key pair from the deterministic key generator
/// * `message` - Canonical string to sign, may be empty
/// * `nonce` - Nonce selection mode
///
/// # Returns
/// * `Ok(DerSignature)` - DER-encoded `(r, s)` pair
/// * `Err(SigningError::Sign)` - The signing primitive failed
///
/// # Example
/// ```rust
/// use sigv4a_sign::crypto::{ecdsa::sign_message, keygen::derive_key_pair_from_slice};
/// use sigv4a_sign::NonceMode;
///
/// let pair = derive_key_pair_from_slice(&[7u8; 32]).unwrap();
/// let signature = sign_message(&pair, b"AWS4-ECDSA-P256-SHA256\n...", NonceMode::Random).unwrap();
/// assert!(signature.as_bytes().len() <= 72);
/// ```
pub fn sign_message(
    key_pair: &EcKeyPair,
    message: &[u8],
    nonce: NonceMode,
) -> Result<DerSignature> {
    let digest = Sha256::digest(message);

    let signature = match nonce {
        NonceMode::Random => RandomizedPrehashSigner::<Signature>::sign_prehash_with_rng(
            key_pair.signing_key(),
            &mut OsRng,
            &digest,
        ),
        NonceMode::Deterministic => {
            PrehashSigner::<Signature>::sign_prehash(key_pair.signing_key(), &digest)
        }
    }
    .map_err(|e| SigningError::Sign(format!("Failed to sign digest: {}", e)))?;

    Ok(signature.to_der())
}
