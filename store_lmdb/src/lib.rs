//! LMDB storage backend for the Vulcan registration service.
//!
//! Implements the `vulcan-store` traits using the `heed` LMDB bindings.
//! Every logical store maps to one LMDB database within a single environment;
//! secondary indexes live in their own databases and are maintained in the
//! same write transaction as the primary record.

mod access;
pub mod environment;
pub mod error;
mod fraud;
mod referral;
mod request;
pub mod transaction;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use transaction::LmdbTxn;
