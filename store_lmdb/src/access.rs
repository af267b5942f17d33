//! Store trait implementations shared by the environment and its
//! transactional view.
//!
//! Both types expose `read` and `write` helpers that hand a database set and
//! an LMDB transaction to a closure; the traits are implemented once here on
//! top of those helpers.

macro_rules! impl_registry_store {
    ($ty:ty) => {
        impl vulcan_store::RequestStore for $ty {
            fn get_request(
                &self,
                owner: &vulcan_types::Owner,
            ) -> Result<vulcan_store::Request, vulcan_store::StoreError> {
                self.read(|dbs, txn| crate::request::get(dbs, txn, owner))
            }

            fn set_request(
                &self,
                request: &vulcan_store::Request,
            ) -> Result<(), vulcan_store::StoreError> {
                self.write(|dbs, txn| crate::request::put(dbs, txn, request))
            }

            fn set_confirmed(
                &self,
                owner: &vulcan_types::Owner,
                at: vulcan_types::Timestamp,
            ) -> Result<(), vulcan_store::StoreError> {
                self.write(|dbs, txn| crate::request::set_confirmed(dbs, txn, owner, at))
            }

            fn create_testnet_confirmed_request(
                &self,
                request: &vulcan_store::Request,
            ) -> Result<(), vulcan_store::StoreError> {
                self.write(|dbs, txn| crate::request::create_confirmed(dbs, txn, request))
            }

            fn get_confirmed_request_by_address(
                &self,
                address: &vulcan_types::WalletAddress,
            ) -> Result<vulcan_store::Request, vulcan_store::StoreError> {
                self.read(|dbs, txn| crate::request::get_confirmed_by_address(dbs, txn, address))
            }

            fn get_request_by_own_referral_code(
                &self,
                code: &str,
            ) -> Result<vulcan_store::Request, vulcan_store::StoreError> {
                self.read(|dbs, txn| crate::request::get_by_own_referral_code(dbs, txn, code))
            }

            fn iter_confirmed_requests(
                &self,
            ) -> Result<Vec<vulcan_store::Request>, vulcan_store::StoreError> {
                self.read(|dbs, txn| crate::request::iter_confirmed(dbs, txn))
            }
        }

        impl vulcan_store::ReferralStore for $ty {
            fn create_referral_tracking(
                &self,
                sender: &vulcan_types::Owner,
                receiver: &vulcan_types::Owner,
                at: vulcan_types::Timestamp,
            ) -> Result<(), vulcan_store::StoreError> {
                self.write(|dbs, txn| crate::referral::create(dbs, txn, sender, receiver, at))
            }

            fn get_referral_tracking_by_receiver(
                &self,
                receiver: &vulcan_types::Owner,
            ) -> Result<vulcan_store::ReferralTracking, vulcan_store::StoreError> {
                self.read(|dbs, txn| crate::referral::get(dbs, txn, receiver))
            }

            fn transition_referral_tracking_to_installed(
                &self,
                receiver: &vulcan_types::Owner,
                at: vulcan_types::Timestamp,
            ) -> Result<(), vulcan_store::StoreError> {
                self.write(|dbs, txn| {
                    crate::referral::update(dbs, txn, receiver, |r| r.mark_installed(at))
                })
            }

            fn transition_referral_tracking_to_confirmed(
                &self,
                receiver: &vulcan_types::Owner,
                sender_reward: vulcan_types::TokenAmount,
                receiver_reward: vulcan_types::TokenAmount,
                at: vulcan_types::Timestamp,
            ) -> Result<(), vulcan_store::StoreError> {
                self.write(|dbs, txn| {
                    crate::referral::update(dbs, txn, receiver, |r| {
                        r.mark_confirmed(sender_reward, receiver_reward, at)
                    })
                })
            }

            fn referrals_by_sender(
                &self,
                sender: &vulcan_types::Owner,
            ) -> Result<Vec<vulcan_store::ReferralTracking>, vulcan_store::StoreError> {
                self.read(|dbs, txn| crate::referral::by_sender(dbs, txn, sender))
            }

            fn installed_referrals_before(
                &self,
                cutoff: vulcan_types::Timestamp,
            ) -> Result<Vec<vulcan_store::ReferralTracking>, vulcan_store::StoreError> {
                self.read(|dbs, txn| crate::referral::installed_before(dbs, txn, cutoff))
            }
        }

        impl vulcan_store::FraudStore for $ty {
            fn is_fraud_domain(&self, domain: &str) -> Result<bool, vulcan_store::StoreError> {
                self.read(|dbs, txn| crate::fraud::contains(dbs, txn, domain))
            }

            fn put_fraud_domain(&self, domain: &str) -> Result<(), vulcan_store::StoreError> {
                self.write(|dbs, txn| crate::fraud::put(dbs, txn, domain))
            }
        }
    };
}

pub(crate) use impl_registry_store;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::LmdbError;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}
