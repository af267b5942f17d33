//! Wallet address type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A bech32 wallet address on the target chain, e.g. `decentr1vg08…`.
///
/// The type only carries the string; checksum validation lives in
/// `vulcan_crypto::validate_address` because it needs the configured prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Separator between the human-readable part and the data part.
    pub const SEPARATOR: char = '1';

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The human-readable prefix (everything before the last `1`), if any.
    pub fn prefix(&self) -> Option<&str> {
        self.0
            .rfind(Self::SEPARATOR)
            .filter(|&pos| pos > 0)
            .map(|pos| &self.0[..pos])
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for WalletAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_part_before_last_separator() {
        let addr = WalletAddress::new("decentr1vg085ra5hw8mx5rrheqf8fruks0xv4urqkuqga");
        assert_eq!(addr.prefix(), Some("decentr"));
    }

    #[test]
    fn prefix_missing_without_separator() {
        assert_eq!(WalletAddress::new("nodataatall").prefix(), None);
        assert_eq!(WalletAddress::new("1abc").prefix(), None);
    }

    #[test]
    fn serializes_as_plain_string() {
        let addr = WalletAddress::new("decentr1abc");
        assert_eq!(serde_json::to_string(&addr).unwrap(), "\"decentr1abc\"");
    }
}
