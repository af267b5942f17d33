//! Abstract storage traits for the Vulcan registration service.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The service depends only on [`RegistryStore`].

pub mod error;
pub mod fraud;
pub mod referral;
pub mod request;
pub mod transaction;

pub use error::StoreError;
pub use fraud::{email_domain, FraudStore};
pub use referral::{ReferralStats, ReferralStore, ReferralTracking};
pub use request::{DailyCount, Request, RequestStore};
pub use transaction::{with_tx, RegistryStore, TxFn};
