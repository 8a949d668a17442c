//! # sigv4a-sign
//!
//! The signing primitive behind **asymmetric request signing** (SigV4a style):
//! an ECDSA P-256 signature over a canonical request string, made with a private
//! key derived deterministically from a shared secret and the request's
//! credential scope.
//!
//! ## Pipeline
//!
//! - **HMAC chain** - `secret -> date -> "*" -> service -> request type`
//!   yields a 256-bit signing key
//! - **Deterministic key generation** - counter-driven rejection sampling turns
//!   the signing key into a P-256 scalar in `[1, n-1]`
//! - **Signing** - SHA-256 of the canonical string, signed with ECDSA, DER encoded
//! - **Hex encoding** - lowercase hex into a fixed-capacity, NUL-terminated buffer
//!
//! Building the canonical string and formatting headers is left to the HTTP
//! layer calling this crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use sigv4a_sign::{Signer, SigningConfig};
//! use secrecy::Secret;
//!
//! let config = SigningConfig::new(
//!     Secret::new("wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".to_string()),
//!     "s3",
//! );
//! let signer = Signer::new(config);
//!
//! match signer.sign_hex("20150830", b"AWS4-ECDSA-P256-SHA256\n...") {
//!     Ok(signature) => println!("Signature: {}", signature),
//!     Err(e) => println!("Signing failed: {}", e),
//! }
//! ```
//!
//! ## Features
//!
//! - `ecdsa` (default) - the P-256 backend. Without it every signing call
//!   returns [`SigningError::NotBuiltIn`] and leaves the output buffer alone.

pub mod config;
pub mod crypto;
pub mod error;
pub mod signer;

// Re-export main types for easier access
pub use config::{date_stamp, NonceMode, SigningConfig, SigningContext, ALGORITHM};
pub use crypto::{MAX_HEX_SIGNATURE_LEN, MAX_SIGNATURE_BYTES};
pub use error::{Result, ResultCode, SigningError};
pub use signer::{sign, sign_request, Signer};
