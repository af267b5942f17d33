//! Random verification and referral codes.

use crate::CryptoError;

/// Bytes of randomness in a verification code (hex-encoded to twice as many chars).
pub const CODE_SIZE: usize = 16;

/// Bytes of randomness in an own referral code.
pub const REFERRAL_CODE_SIZE: usize = 4;

fn random_hex<const N: usize>() -> Result<String, CryptoError> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes).map_err(|e| CryptoError::RandomSource(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Generate a fresh verification code: `CODE_SIZE` random bytes as lowercase hex.
pub fn new_code() -> Result<String, CryptoError> {
    random_hex::<CODE_SIZE>()
}

/// Generate a referral code an owner can hand out to recruit others.
pub fn new_referral_code() -> Result<String, CryptoError> {
    random_hex::<REFERRAL_CODE_SIZE>()
}

/// Compare a submitted code with the stored one in time independent of
/// where they differ.
pub fn codes_match(stored: &str, submitted: &str) -> bool {
    let (a, b) = (stored.as_bytes(), submitted.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
