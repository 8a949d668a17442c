use crate::{
    config::{SigningConfig, SigningContext},
    crypto::MAX_HEX_SIGNATURE_LEN,
    error::{Result, ResultCode, SigningError},
};
#[cfg(feature = "ecdsa")]
use crate::crypto::{
    derive_key_pair, derive_signing_key, encode_signature, sign_message, EcKeyPair,
};
use tracing::debug;
#[cfg(feature = "ecdsa")]
use tracing::instrument;

/// Sign `string_to_sign` for `ctx`, writing a NUL-terminated hex signature
///
/// Runs the whole pipeline: HMAC chain, deterministic P-256 key generation,
/// SHA-256 + ECDSA signing, then hex encoding. The first failing stage ends
/// the call and its error is returned; the contents of `out` are unspecified
/// after an error. Key material is zeroized on every exit path.
///
/// # Arguments
/// * `ctx` - Request-scoped secret and scope values
/// * `string_to_sign` - Canonical string, may be empty
/// * `out` - Destination of at least [`MAX_HEX_SIGNATURE_LEN`] bytes
///
/// # Returns
/// * `Ok(usize)` - Number of hex characters written before the NUL
/// * `Err(SigningError)` - The first stage failure
///
/// # Example
/// ```rust
/// use sigv4a_sign::{sign, SigningContext, MAX_HEX_SIGNATURE_LEN};
///
/// let ctx = SigningContext::new(b"AWS4testkey", "20101109", "*", "service", "aws4_request").unwrap();
/// let mut out = [0u8; MAX_HEX_SIGNATURE_LEN];
/// let len = sign(&ctx, b"canonical string", &mut out).unwrap();
/// assert_eq!(out[len], 0);
/// ```
#[cfg(feature = "ecdsa")]
#[instrument(skip_all, fields(date = %ctx.date(), service = %ctx.service(), region_set = %ctx.region_set()))]
pub fn sign(ctx: &SigningContext<'_>, string_to_sign: &[u8], out: &mut [u8]) -> Result<usize> {
    let signing_key = derive_signing_key(ctx)?;
    let key_pair = derive_key_pair(&signing_key)?;
    drop(signing_key);
    debug!(counter = key_pair.counter(), "derived P-256 key pair");

    let signature = sign_message(&key_pair, string_to_sign, ctx.nonce())?;
    let hex_len = encode_signature(signature.as_bytes(), out)?;
    debug!(hex_len, "signed request");
    Ok(hex_len)
}

/// Always fails with `NotBuiltIn`; `out` is left untouched
#[cfg(not(feature = "ecdsa"))]
pub fn sign(_ctx: &SigningContext<'_>, _string_to_sign: &[u8], _out: &mut [u8]) -> Result<usize> {
    Err(SigningError::NotBuiltIn)
}

/// Flat entry point returning only a [`ResultCode`]
///
/// `region_set` selects the asymmetric mode upstream; the key derivation
/// always uses the `*` marker. Without the `ecdsa` feature this returns
/// `NotBuiltIn` before validating anything.
pub fn sign_request(
    secret: &[u8],
    date: &str,
    region_set: &str,
    service: &str,
    request_type: &str,
    string_to_sign: &[u8],
    out: &mut [u8],
) -> ResultCode {
    if let Err(e) = ensure_built_in() {
        return e.code();
    }
    let result = SigningContext::new(secret, date, region_set, service, request_type)
        .and_then(|ctx| sign(&ctx, string_to_sign, out));
    ResultCode::from(&result)
}

fn ensure_built_in() -> Result<()> {
    if cfg!(feature = "ecdsa") {
        Ok(())
    } else {
        debug!("signing requested without the ecdsa backend");
        Err(SigningError::NotBuiltIn)
    }
}

/// Request signer bound to one [`SigningConfig`]
///
/// Stateless apart from the configuration: every call derives its own keys
/// and releases them before returning, so a `Signer` can be shared across
/// threads.
pub struct Signer {
    pub config: SigningConfig,
}

impl Signer {
    /// Create a new signer with the given configuration
    ///
    /// # Example
    /// ```rust
    /// use sigv4a_sign::{Signer, SigningConfig};
    /// use secrecy::Secret;
    ///
    /// let config = SigningConfig::new(Secret::new("AWS4testkey".to_string()), "s3");
    /// let signer = Signer::new(config);
    /// ```
    pub fn new(config: SigningConfig) -> Self {
        Self { config }
    }

    /// Build the signing context for `date`
    pub fn context<'a>(&'a self, date: &'a str) -> Result<SigningContext<'a>> {
        self.config.context(date)
    }

    /// Sign into a caller-provided buffer
    ///
    /// See [`sign`] for the buffer contract.
    pub fn sign_into(&self, date: &str, string_to_sign: &[u8], out: &mut [u8]) -> Result<usize> {
        ensure_built_in()?;
        let ctx = self.context(date)?;
        sign(&ctx, string_to_sign, out)
    }

    /// Sign and return the lowercase hex signature
    ///
    /// # Errors
    /// - `Allocation` if the output buffer cannot be reserved
    /// - Any error of [`sign`]
    ///
    /// # Example
    /// ```rust
    /// use sigv4a_sign::{Signer, SigningConfig};
    /// use secrecy::Secret;
    ///
    /// let config = SigningConfig::new(
    ///     Secret::new("wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".to_string()),
    ///     "s3",
    /// );
    /// let signer = Signer::new(config);
    /// if let Ok(signature) = signer.sign_hex("20150830", b"AWS4-ECDSA-P256-SHA256\n...") {
    ///     assert_eq!(signature.len() % 2, 0);
    /// }
    /// ```
    pub fn sign_hex(&self, date: &str, string_to_sign: &[u8]) -> Result<String> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(MAX_HEX_SIGNATURE_LEN)
            .map_err(|e| SigningError::Allocation(format!("signature buffer: {}", e)))?;
        buf.resize(MAX_HEX_SIGNATURE_LEN, 0);

        let hex_len = self.sign_into(date, string_to_sign, &mut buf)?;
        buf.truncate(hex_len);
        String::from_utf8(buf)
            .map_err(|e| SigningError::Encoding(format!("hex output is not UTF-8: {}", e)))
    }

    /// Derive the P-256 key pair used for `date`
    ///
    /// Exposes the public point so a caller can check signatures locally.
    #[cfg(feature = "ecdsa")]
    pub fn key_pair(&self, date: &str) -> Result<EcKeyPair> {
        let ctx = self.context(date)?;
        let signing_key = derive_signing_key(&ctx)?;
        derive_key_pair(&signing_key)
    }
}

#[cfg(all(test, feature = "ecdsa"))]
mod tests {
    use super::*;
    use crate::config::NonceMode;
    use p256::ecdsa::{signature::Verifier, Signature};
    use secrecy::Secret;

    const EXAMPLE_SECRET: &str = "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY";
    const STRING_TO_SIGN: &str = "AWS4-ECDSA-P256-SHA256\n\
                                  20150830T123600Z\n\
                                  20150830/s3/aws4_request\n\
                                  816cd5b414d056048ba4f7c5386d6e0533120fb1fcfa93762cf0fc39e2cf19e0";

    fn create_test_signer() -> Signer {
        Signer::new(SigningConfig::new(
            Secret::new(EXAMPLE_SECRET.to_string()),
            "s3",
        ))
    }

    fn assert_verifies(pair: &EcKeyPair, hex_sig: &str, message: &[u8]) {
        let der = hex::decode(hex_sig).unwrap();
        let signature = Signature::from_der(&der).unwrap();
        assert!(pair.verifying_key().verify(message, &signature).is_ok());
    }

    #[test]
    fn test_end_to_end_signature_verifies() {
        let signer = create_test_signer();
        let hex_sig = signer
            .sign_hex("20150830", STRING_TO_SIGN.as_bytes())
            .unwrap();

        // P-256 DER signatures run to 72 bytes, so the bound is 144 hex
        // characters; a 128-character cap would reject most valid signatures.
        assert_eq!(hex_sig.len() % 2, 0);
        assert!(hex_sig.len() < MAX_HEX_SIGNATURE_LEN);
        assert!(hex_sig.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));

        let pair = signer.key_pair("20150830").unwrap();
        assert_verifies(&pair, &hex_sig, STRING_TO_SIGN.as_bytes());
    }

    #[test]
    fn test_key_pair_known_answer() {
        let pair = create_test_signer().key_pair("20150830").unwrap();
        assert_eq!(
            hex::encode(pair.scalar_bytes().as_slice()),
            "1c56ce1433261256fd648508b67301ff4bb60f8406b1cbe71c24591aef42329a"
        );
    }

    #[test]
    fn test_empty_string_to_sign() {
        let signer = create_test_signer();
        let hex_sig = signer.sign_hex("20150830", b"").unwrap();

        let pair = signer.key_pair("20150830").unwrap();
        assert_verifies(&pair, &hex_sig, b"");
    }

    #[test]
    fn test_sign_writes_terminator() {
        let ctx = SigningContext::new(b"AWS4testkey", "20101109", "*", "service", "aws4_request")
            .unwrap();
        let mut out = [0xffu8; MAX_HEX_SIGNATURE_LEN];
        let len = sign(&ctx, b"payload", &mut out).unwrap();

        assert_eq!(out[len], 0);
        assert!(std::str::from_utf8(&out[..len]).is_ok());
    }

    #[test]
    fn test_small_buffer_never_overflows() {
        let ctx = SigningContext::new(b"AWS4testkey", "20101109", "*", "service", "aws4_request")
            .unwrap();
        let mut backing = [0xa5u8; 256];
        let (declared, tail) = backing.split_at_mut(128);
        let result = sign(&ctx, b"payload", declared);

        assert!(matches!(result, Err(SigningError::Encoding(_))));
        assert!(tail.iter().all(|&b| b == 0xa5));
    }

    #[test]
    fn test_sign_request_codes() {
        let mut out = [0u8; MAX_HEX_SIGNATURE_LEN];
        let code = sign_request(
            b"AWS4testkey",
            "20101109",
            "us-east-1,us-west-2",
            "service",
            "aws4_request",
            b"payload",
            &mut out,
        );
        assert_eq!(code, ResultCode::Ok);

        let code = sign_request(b"", "20101109", "*", "service", "aws4_request", b"x", &mut out);
        assert_eq!(code, ResultCode::ComputeError);

        let code = sign_request(b"k", "2010-11-09", "*", "service", "aws4_request", b"x", &mut out);
        assert_eq!(code, ResultCode::ConfigurationError);

        let mut small = [0u8; 129];
        let code = sign_request(b"k", "20101109", "*", "service", "aws4_request", b"x", &mut small);
        assert_eq!(code, ResultCode::EncodingError);
    }

    #[test]
    fn test_region_set_does_not_change_key() {
        let signer = create_test_signer();
        let mut scoped = create_test_signer();
        scoped.config.region_set = "us-east-1".to_string();

        assert_eq!(
            signer.key_pair("20150830").unwrap().verifying_key(),
            scoped.key_pair("20150830").unwrap().verifying_key()
        );
    }

    #[test]
    fn test_deterministic_nonce_mode() {
        let mut signer = create_test_signer();
        signer.config.nonce = NonceMode::Deterministic;

        let a = signer.sign_hex("20150830", STRING_TO_SIGN.as_bytes()).unwrap();
        let b = signer.sign_hex("20150830", STRING_TO_SIGN.as_bytes()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_date_rejected() {
        let result = create_test_signer().sign_hex("2015083", b"x");
        assert!(matches!(result, Err(SigningError::Configuration(_))));
    }
}
