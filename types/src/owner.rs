//! Owner identifier derived from an email address.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Opaque, one-way identifier of an email address (lowercase hex digest).
///
/// Used as the primary correlation key so that plaintext email never acts
/// as a lookup key. Produced by `vulcan_crypto::owner_from_email`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Owner(String);

impl Owner {
    /// Number of hex characters in an owner (16-byte digest).
    pub const HEX_LEN: usize = 32;

    /// Wrap an already-derived hex digest.
    pub fn from_hex_unchecked(hex: String) -> Self {
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Owner {
    type Err = TypesError;

    /// Parse an owner received from a client (e.g. a confirmation link).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = s.len() == Self::HEX_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(TypesError::InvalidOwner(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Owner({})", &self.0[..self.0.len().min(8)])
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
