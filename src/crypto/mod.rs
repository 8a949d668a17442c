pub mod encoding;
#[cfg(feature = "ecdsa")]
pub mod ecdsa;
pub mod hmac_chain;
#[cfg(feature = "ecdsa")]
pub mod keygen;

/// Largest DER-encoded P-256 ECDSA signature in bytes
pub const MAX_SIGNATURE_BYTES: usize = 72;

// Re-export main functions for easier access
pub use encoding::{encode_signature, MAX_HEX_SIGNATURE_LEN};
#[cfg(feature = "ecdsa")]
pub use ecdsa::sign_message;
pub use hmac_chain::{derive_signing_key, DerivedKey};
#[cfg(feature = "ecdsa")]
pub use keygen::{derive_key_pair, EcKeyPair};
