//! Wallet address validation.
//!
//! Addresses on the target chain are bech32 strings: `<prefix>1<data><checksum>`,
//! where data and checksum use the alphabet `qpzry9x8gf2tvdw0s3jn54khce6mua7l`
//! and the checksum is the 6-character BCH code over prefix and data.
//! The payload decoded from the data part is a 20-byte account hash
//! (or 32 bytes for module / contract accounts).

use thiserror::Error;

/// Bech32 alphabet (32 chars).
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const CHARSET_REV: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let mut i = 0;
    while i < 32 {
        table[CHARSET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// BCH generator coefficients.
const GENERATOR: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];

/// Number of checksum characters.
const CHECKSUM_LEN: usize = 6;
/// Maximum total length of a bech32 string.
const MAX_LEN: usize = 90;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address has no separator")]
    MissingSeparator,

    #[error("address prefix is {found}, expected {expected}")]
    WrongPrefix { expected: String, found: String },

    #[error("invalid character {0:?} in address")]
    InvalidChar(char),

    #[error("address mixes upper and lower case")]
    MixedCase,

    #[error("address checksum is invalid")]
    InvalidChecksum,

    #[error("invalid address length: {0}")]
    InvalidLength(usize),
}

fn polymod(values: impl Iterator<Item = u8>) -> u32 {
    let mut chk: u32 = 1;
    for v in values {
        let top = chk >> 25;
        chk = ((chk & 0x1ff_ffff) << 5) ^ v as u32;
        for (i, g) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }
    chk
}

fn expand_prefix(prefix: &str) -> impl Iterator<Item = u8> + '_ {
    prefix
        .bytes()
        .map(|b| b >> 5)
        .chain(std::iter::once(0))
        .chain(prefix.bytes().map(|b| b & 0x1f))
}

/// Length in bytes of the payload carried by the 5-bit groups in `data`,
/// or `None` if the trailing padding is not valid.
fn payload_len(data: &[u8]) -> Option<usize> {
    let bits = data.len() * 5;
    let padding = bits % 8;
    if padding >= 5 {
        return None;
    }
    let last = *data.last()?;
    if last & ((1 << padding) - 1) != 0 {
        return None;
    }
    Some(bits / 8)
}

/// Validate that `address` is a well-formed bech32 address with the given
/// human-readable prefix (e.g. `"decentr"`).
pub fn validate_address(address: &str, expected_prefix: &str) -> Result<(), AddressError> {
    if address.len() > MAX_LEN {
        return Err(AddressError::InvalidLength(address.len()));
    }

    let has_lower = address.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = address.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(AddressError::MixedCase);
    }
    let address = address.to_ascii_lowercase();

    let sep = address.rfind('1').ok_or(AddressError::MissingSeparator)?;
    let (prefix, data) = (&address[..sep], &address[sep + 1..]);

    if prefix != expected_prefix {
        return Err(AddressError::WrongPrefix {
            expected: expected_prefix.to_string(),
            found: prefix.to_string(),
        });
    }
    if data.len() <= CHECKSUM_LEN {
        return Err(AddressError::InvalidLength(address.len()));
    }

    let mut values = Vec::with_capacity(data.len());
    for c in data.chars() {
        let v = if c.is_ascii() {
            CHARSET_REV[c as usize]
        } else {
            0xFF
        };
        if v == 0xFF {
            return Err(AddressError::InvalidChar(c));
        }
        values.push(v);
    }

    if polymod(expand_prefix(prefix).chain(values.iter().copied())) != 1 {
        return Err(AddressError::InvalidChecksum);
    }

    match payload_len(&values[..values.len() - CHECKSUM_LEN]) {
        Some(20) | Some(32) => Ok(()),
        _ => Err(AddressError::InvalidLength(address.len())),
    }
}
