//! Blockchain collaborator for the Vulcan registration service.
//!
//! The service only ever needs two things from the chain: move tokens from
//! the service account to a freshly confirmed wallet, and know whether the
//! chain is reachable. Signing, gas estimation and node RPC all happen behind
//! a broadcaster endpoint; [`HttpBlockchain`] just POSTs a prepared transfer.

pub mod chain;
pub mod client;
pub mod error;

pub use chain::Blockchain;
pub use client::{HttpBlockchain, TransferRequest, DEFAULT_DENOM};
pub use error::BlockchainError;
