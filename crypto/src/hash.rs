//! Blake2b hashing for owner derivation.

use blake2::digest::consts::U16;
use blake2::{Blake2b, Digest};
use vulcan_types::Owner;

type Blake2b128 = Blake2b<U16>;

/// Compute a 128-bit Blake2b hash of arbitrary data.
pub fn blake2b_128(data: &[u8]) -> [u8; 16] {
    let mut hasher = Blake2b128::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 16];
    output.copy_from_slice(&result);
    output
}

/// Derive the owner identifier of an email address.
///
/// The email must already be normalized (trimmed, lowercased) by the caller;
/// this function hashes the bytes exactly as given.
pub fn owner_from_email(email: &str) -> Owner {
    Owner::from_hex_unchecked(hex::encode(blake2b_128(email.as_bytes())))
}

/// Owner of a registration that has no email, such as a testnet faucet
/// grant. Derived from the lowercased wallet address under its own prefix
/// so it never equals the owner of an email.
pub fn owner_from_address(address: &str) -> Owner {
    let key = format!("address:{}", address.to_ascii_lowercase());
    Owner::from_hex_unchecked(hex::encode(blake2b_128(key.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        assert_eq!(
            owner_from_email("decentr@decentr.xyz").as_str(),
            "43c024f40120a2f7b58e48c9de9edf6d"
        );
        assert_eq!(
            owner_from_email("a@x.com").as_str(),
            "bea112c11facdedc0ab577545efbafa8"
        );
    }

    #[test]
    fn deterministic() {
        assert_eq!(owner_from_email("a@x.com"), owner_from_email("a@x.com"));
    }

    #[test]
    fn different_inputs() {
        assert_ne!(owner_from_email("a@x.com"), owner_from_email("b@x.com"));
    }

    #[test]
    fn no_normalization_applied() {
        assert_ne!(owner_from_email("A@x.com"), owner_from_email("a@x.com"));
    }

    #[test]
    fn owner_is_parseable() {
        let owner = owner_from_email("a@x.com");
        assert_eq!(owner.as_str().parse::<vulcan_types::Owner>().unwrap(), owner);
    }

    #[test]
    fn address_owner_ignores_case() {
        let lower = "decentr1vg085ra5hw8mx5rrheqf8fruks0xv4urqkuqga";
        assert_eq!(owner_from_address(lower), owner_from_address(&lower.to_uppercase()));
        assert_ne!(owner_from_address(lower), owner_from_email(lower));
    }
}
