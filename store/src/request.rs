//! Registration request storage trait.

use std::collections::BTreeMap;

use crate::StoreError;
use serde::{Deserialize, Serialize};
use vulcan_types::{Owner, Timestamp, WalletAddress};

/// One registration attempt binding an owner to a wallet address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub owner: Owner,
    /// Normalized email, kept to address the welcome email. Never a lookup key.
    pub email: String,
    pub address: WalletAddress,
    /// Verification code mailed to the owner.
    pub code: String,
    pub created_at: Timestamp,
    /// Set exactly once, when confirmation succeeds.
    pub confirmed_at: Option<Timestamp>,
    /// Code this owner hands out to recruit others.
    pub own_referral_code: String,
    /// Inviter's code this owner registered with.
    pub referral_code: Option<String>,
}

impl Request {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }
}

/// Number of registrations confirmed on one UTC day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub day: Timestamp,
    pub count: u64,
}

/// Trait for registration request storage.
pub trait RequestStore {
    /// Fetch the request of an owner. `StoreError::NotFound` when absent.
    fn get_request(&self, owner: &Owner) -> Result<Request, StoreError>;

    /// Upsert keyed by owner.
    ///
    /// Fails with `StoreError::Duplicate` when `own_referral_code` already
    /// belongs to another owner.
    fn set_request(&self, request: &Request) -> Result<(), StoreError>;

    /// Mark the owner's request confirmed and bind its address to the owner.
    ///
    /// `StoreError::NotFound` when there is no request,
    /// `StoreError::Conflict` when it is already confirmed.
    fn set_confirmed(&self, owner: &Owner, at: Timestamp) -> Result<(), StoreError>;

    /// Insert a request that is confirmed from creation, as the testnet
    /// faucet grants without an email step.
    ///
    /// `StoreError::Duplicate` when the owner already has a request or the
    /// address is bound to a confirmed request, `StoreError::Conflict` when
    /// `request` is not confirmed.
    fn create_testnet_confirmed_request(&self, request: &Request) -> Result<(), StoreError>;

    /// The confirmed request bound to `address`, if any.
    fn get_confirmed_request_by_address(
        &self,
        address: &WalletAddress,
    ) -> Result<Request, StoreError>;

    /// The request whose own referral code is `code`.
    fn get_request_by_own_referral_code(&self, code: &str) -> Result<Request, StoreError>;

    /// All confirmed requests.
    fn iter_confirmed_requests(&self) -> Result<Vec<Request>, StoreError>;

    fn confirmed_registrations_total(&self) -> Result<u64, StoreError> {
        self.iter_confirmed_requests().map(|v| v.len() as u64)
    }

    /// Confirmed registrations grouped by UTC day, oldest first.
    fn confirmed_registrations_by_day(&self) -> Result<Vec<DailyCount>, StoreError> {
        let mut days: BTreeMap<Timestamp, u64> = BTreeMap::new();
        for request in self.iter_confirmed_requests()? {
            if let Some(at) = request.confirmed_at {
                *days.entry(at.start_of_day()).or_default() += 1;
            }
        }
        Ok(days
            .into_iter()
            .map(|(day, count)| DailyCount { day, count })
            .collect())
    }
}
