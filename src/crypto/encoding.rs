use crate::{
    crypto::MAX_SIGNATURE_BYTES,
    error::{Result, SigningError},
};

/// Output capacity needed for any hex signature plus its NUL terminator
pub const MAX_HEX_SIGNATURE_LEN: usize = 2 * MAX_SIGNATURE_BYTES + 1;

/// Write `signature` as lowercase hex followed by a NUL byte
///
/// `out` must hold at least [`MAX_HEX_SIGNATURE_LEN`] bytes whatever the
/// actual signature length. Nothing past `2 * signature.len() + 1` is
/// written.
///
/// # Returns
/// * `Ok(usize)` - Number of hex characters written, excluding the NUL
/// * `Err(SigningError::Encoding)` - Buffer too small or signature too long
pub fn encode_signature(signature: &[u8], out: &mut [u8]) -> Result<usize> {
    if out.len() < MAX_HEX_SIGNATURE_LEN {
        return Err(SigningError::Encoding(format!(
            "output buffer holds {} bytes, need {}",
            out.len(),
            MAX_HEX_SIGNATURE_LEN
        )));
    }
    if signature.len() > MAX_SIGNATURE_BYTES {
        return Err(SigningError::Encoding(format!(
            "signature is {} bytes, limit is {}",
            signature.len(),
            MAX_SIGNATURE_BYTES
        )));
    }

    let hex_len = signature.len() * 2;
    hex::encode_to_slice(signature, &mut out[..hex_len])
        .map_err(|e| SigningError::Encoding(format!("Failed to hex-encode signature: {}", e)))?;
    out[hex_len] = 0;
    Ok(hex_len)
}
