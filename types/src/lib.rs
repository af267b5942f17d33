//! Fundamental types for the Vulcan registration service.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! owners, wallet addresses, token amounts, timestamps and referral states.

pub mod address;
pub mod amount;
pub mod error;
pub mod owner;
pub mod state;
pub mod time;

pub use address::WalletAddress;
pub use amount::TokenAmount;
pub use error::TypesError;
pub use owner::Owner;
pub use state::ReferralStatus;
pub use time::{Timestamp, SECS_PER_DAY};
