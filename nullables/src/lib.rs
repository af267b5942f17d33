//! Nullable collaborators for deterministic testing.
//!
//! Every external dependency of the registration service (clock, storage,
//! chain, mail) sits behind a trait. The implementations here:
//! - return deterministic values
//! - record what was asked of them so tests can assert on it
//! - can be told to fail
//! - never touch the filesystem or network

pub mod blockchain;
pub mod clock;
pub mod mail;
pub mod store;

pub use blockchain::{NullBlockchain, Transfer};
pub use clock::NullClock;
pub use mail::{NullMailer, SentMail};
pub use store::NullStore;
