use std::fmt;

/// Signing pipeline errors
///
/// Each stage of the signing pipeline reports its own variant and the first
/// failure is returned unchanged to the caller. No partial signature is ever
/// produced alongside an error.
///
/// # Example
/// ```rust
/// use sigv4a_sign::{SigningError, Result};
///
/// fn handle_sign_result(result: Result<usize>) {
///     match result {
///         Ok(len) => println!("Wrote {} hex characters", len),
///         Err(SigningError::Encoding(msg)) => println!("Output buffer problem: {}", msg),
///         Err(SigningError::NotBuiltIn) => println!("Built without the ECDSA backend"),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
#[derive(Debug)]
pub enum SigningError {
    /// The signing context or curve setup is unusable
    ///
    /// This error occurs when:
    /// - The date is not an 8-digit `YYYYMMDD` calendar date
    /// - The service or request type is empty
    Configuration(String),

    /// A scratch buffer could not be allocated
    Allocation(String),

    /// HMAC-SHA256 or SHA-256 computation failed
    ///
    /// This error occurs when:
    /// - The secret is empty
    /// - The HMAC implementation rejects a key
    Compute(String),

    /// No valid private scalar could be derived
    ///
    /// This error occurs when:
    /// - The rejection-sampling loop exceeds its iteration cap
    /// - The accepted candidate cannot be installed as a P-256 scalar
    KeyDerivation(String),

    /// Hashing or ECDSA signing of the canonical string failed
    Sign(String),

    /// The hex signature does not fit the caller's output buffer
    Encoding(String),

    /// The crate was built without the `ecdsa` feature
    NotBuiltIn,
}

impl SigningError {
    /// The terminal result code for this error
    pub fn code(&self) -> ResultCode {
        match self {
            SigningError::Configuration(_) => ResultCode::ConfigurationError,
            SigningError::Allocation(_) => ResultCode::AllocationError,
            SigningError::Compute(_) => ResultCode::ComputeError,
            SigningError::KeyDerivation(_) => ResultCode::KeyDerivationError,
            SigningError::Sign(_) => ResultCode::SignError,
            SigningError::Encoding(_) => ResultCode::EncodingError,
            SigningError::NotBuiltIn => ResultCode::NotBuiltIn,
        }
    }
}

impl fmt::Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningError::Configuration(msg) => {
                write!(f, "Invalid signing configuration: {msg}")
            }
            SigningError::Allocation(msg) => {
                write!(f, "Allocation failed: {msg}")
            }
            SigningError::Compute(msg) => {
                write!(f, "Hash computation failed: {msg}")
            }
            SigningError::KeyDerivation(msg) => {
                write!(f, "Key derivation failed: {msg}")
            }
            SigningError::Sign(msg) => {
                write!(f, "ECDSA signing failed: {msg}")
            }
            SigningError::Encoding(msg) => {
                write!(f, "Signature encoding failed: {msg}")
            }
            SigningError::NotBuiltIn => {
                write!(f, "ECDSA signing support is not built in")
            }
        }
    }
}

impl std::error::Error for SigningError {}

pub type Result<T> = std::result::Result<T, SigningError>;

/// Single terminal outcome of a signing call
///
/// Useful where the caller only forwards a status, e.g. across an FFI or
/// transport boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Ok,
    ConfigurationError,
    AllocationError,
    ComputeError,
    KeyDerivationError,
    SignError,
    EncodingError,
    NotBuiltIn,
}

impl ResultCode {
    pub fn is_ok(self) -> bool {
        self == ResultCode::Ok
    }
}

impl<T> From<&Result<T>> for ResultCode {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => ResultCode::Ok,
            Err(e) => e.code(),
        }
    }
}
