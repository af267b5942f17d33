//! Cryptographic helpers for the Vulcan registration service.
//!
//! - **Blake2b-128** for deriving owners from email addresses
//! - **OS CSPRNG** (`getrandom`) for verification and referral codes
//! - **bech32** checksum validation of wallet addresses

pub mod address;
pub mod code;
pub mod error;
pub mod hash;

pub use address::{validate_address, AddressError};
pub use code::{codes_match, new_code, new_referral_code, CODE_SIZE, REFERRAL_CODE_SIZE};
pub use error::CryptoError;
pub use hash::{blake2b_128, owner_from_address, owner_from_email};
