//! Nullable store: thread-safe in-memory registry for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use vulcan_store::{
    email_domain, FraudStore, ReferralStore, ReferralTracking, RegistryStore, Request,
    RequestStore, StoreError, TxFn,
};
use vulcan_types::{Owner, ReferralStatus, Timestamp, TokenAmount, WalletAddress};

#[derive(Clone, Default)]
struct State {
    requests: HashMap<Owner, Request>,
    referrals: HashMap<Owner, ReferralTracking>,
    fraud_domains: HashSet<String>,
    failing: HashSet<&'static str>,
    writes: u64,
}

impl State {
    fn check(&self, op: &'static str) -> Result<(), StoreError> {
        if self.failing.contains(op) {
            return Err(StoreError::Backend(format!("injected failure in {op}")));
        }
        Ok(())
    }
}

/// An in-memory [`RegistryStore`].
///
/// `in_tx` runs the body against a copy of the data and swaps it in only on
/// success, holding the lock throughout, so transactions are serialized and
/// roll back cleanly.
#[derive(Default)]
pub struct NullStore {
    state: Mutex<State>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of the named trait method fail with
    /// `StoreError::Backend`, e.g. `store.fail_on("set_request")`.
    pub fn fail_on(&self, op: &'static str) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failing.clear();
    }

    /// Number of successful write calls so far.
    pub fn write_count(&self) -> u64 {
        self.state.lock().unwrap().writes
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    fn read<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&State) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let state = self.state.lock().unwrap();
        state.check(op)?;
        f(&state)
    }

    fn write<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut State) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.check(op)?;
        let value = f(&mut state)?;
        state.writes += 1;
        Ok(value)
    }
}

impl RequestStore for NullStore {
    fn get_request(&self, owner: &Owner) -> Result<Request, StoreError> {
        self.read("get_request", |s| {
            s.requests
                .get(owner)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("request of {owner}")))
        })
    }

    fn set_request(&self, request: &Request) -> Result<(), StoreError> {
        self.write("set_request", |s| {
            let taken = s.requests.values().any(|r| {
                r.owner != request.owner && r.own_referral_code == request.own_referral_code
            });
            if taken {
                return Err(StoreError::Duplicate(format!(
                    "referral code {}",
                    request.own_referral_code
                )));
            }
            s.requests.insert(request.owner.clone(), request.clone());
            Ok(())
        })
    }

    fn set_confirmed(&self, owner: &Owner, at: Timestamp) -> Result<(), StoreError> {
        self.write("set_confirmed", |s| {
            let request = s
                .requests
                .get_mut(owner)
                .ok_or_else(|| StoreError::NotFound(format!("request of {owner}")))?;
            if request.is_confirmed() {
                return Err(StoreError::Conflict(format!("request of {owner} already confirmed")));
            }
            request.confirmed_at = Some(at);
            Ok(())
        })
    }

    fn create_testnet_confirmed_request(&self, request: &Request) -> Result<(), StoreError> {
        self.write("create_testnet_confirmed_request", |s| {
            if !request.is_confirmed() {
                return Err(StoreError::Conflict(format!(
                    "request of {} is not confirmed",
                    request.owner
                )));
            }
            if s.requests.contains_key(&request.owner) {
                return Err(StoreError::Duplicate(format!("request of {}", request.owner)));
            }
            let bound = s
                .requests
                .values()
                .any(|r| r.is_confirmed() && r.address == request.address);
            if bound {
                return Err(StoreError::Duplicate(format!("address {}", request.address)));
            }
            s.requests.insert(request.owner.clone(), request.clone());
            Ok(())
        })
    }

    fn get_confirmed_request_by_address(
        &self,
        address: &WalletAddress,
    ) -> Result<Request, StoreError> {
        self.read("get_confirmed_request_by_address", |s| {
            s.requests
                .values()
                .find(|r| r.is_confirmed() && &r.address == address)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("address {address}")))
        })
    }

    fn get_request_by_own_referral_code(&self, code: &str) -> Result<Request, StoreError> {
        self.read("get_request_by_own_referral_code", |s| {
            s.requests
                .values()
                .find(|r| r.own_referral_code == code)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("referral code {code}")))
        })
    }

    fn iter_confirmed_requests(&self) -> Result<Vec<Request>, StoreError> {
        self.read("iter_confirmed_requests", |s| {
            Ok(s.requests.values().filter(|r| r.is_confirmed()).cloned().collect())
        })
    }
}

impl ReferralStore for NullStore {
    fn create_referral_tracking(
        &self,
        sender: &Owner,
        receiver: &Owner,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        self.write("create_referral_tracking", |s| {
            if s.referrals.contains_key(receiver) {
                return Err(StoreError::Duplicate(format!("referral of {receiver}")));
            }
            s.referrals.insert(
                receiver.clone(),
                ReferralTracking::new(sender.clone(), receiver.clone(), at),
            );
            Ok(())
        })
    }

    fn get_referral_tracking_by_receiver(
        &self,
        receiver: &Owner,
    ) -> Result<ReferralTracking, StoreError> {
        self.read("get_referral_tracking_by_receiver", |s| {
            s.referrals
                .get(receiver)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("referral of {receiver}")))
        })
    }

    fn transition_referral_tracking_to_installed(
        &self,
        receiver: &Owner,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        self.write("transition_referral_tracking_to_installed", |s| {
            s.referrals
                .get_mut(receiver)
                .ok_or_else(|| StoreError::NotFound(format!("referral of {receiver}")))?
                .mark_installed(at)
        })
    }

    fn transition_referral_tracking_to_confirmed(
        &self,
        receiver: &Owner,
        sender_reward: TokenAmount,
        receiver_reward: TokenAmount,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        self.write("transition_referral_tracking_to_confirmed", |s| {
            s.referrals
                .get_mut(receiver)
                .ok_or_else(|| StoreError::NotFound(format!("referral of {receiver}")))?
                .mark_confirmed(sender_reward, receiver_reward, at)
        })
    }

    fn referrals_by_sender(&self, sender: &Owner) -> Result<Vec<ReferralTracking>, StoreError> {
        self.read("referrals_by_sender", |s| {
            Ok(s.referrals
                .values()
                .filter(|r| &r.sender == sender)
                .cloned()
                .collect())
        })
    }

    fn installed_referrals_before(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<ReferralTracking>, StoreError> {
        self.read("installed_referrals_before", |s| {
            Ok(s.referrals
                .values()
                .filter(|r| {
                    r.status == ReferralStatus::Installed
                        && r.installed_at.is_some_and(|at| at < cutoff)
                })
                .cloned()
                .collect())
        })
    }
}

impl FraudStore for NullStore {
    fn is_fraud_domain(&self, domain: &str) -> Result<bool, StoreError> {
        self.read("is_fraud_domain", |s| {
            Ok(s.fraud_domains.contains(&domain.to_ascii_lowercase()))
        })
    }

    fn put_fraud_domain(&self, domain: &str) -> Result<(), StoreError> {
        let domain = email_domain(&format!("@{domain}"))
            .ok_or_else(|| StoreError::Backend(format!("invalid domain {domain:?}")))?;
        self.write("put_fraud_domain", |s| {
            s.fraud_domains.insert(domain);
            Ok(())
        })
    }
}

impl RegistryStore for NullStore {
    fn in_tx(&self, f: &mut TxFn<'_>) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.check("in_tx")?;
        let view = NullStore {
            state: Mutex::new(state.clone()),
        };
        f(&view)?;
        *state = view.state.into_inner().unwrap();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vulcan_store::with_tx;

    fn owner(c: char) -> Owner {
        Owner::from_hex_unchecked(std::iter::repeat(c).take(32).collect())
    }

    fn request(c: char) -> Request {
        Request {
            owner: owner(c),
            email: format!("{c}@x.com"),
            address: WalletAddress::new(format!("decentr1{c}")),
            code: "00".repeat(16),
            created_at: Timestamp::new(1),
            confirmed_at: None,
            own_referral_code: format!("{c}{c}{c}{c}0000"),
            referral_code: None,
        }
    }

    #[test]
    fn rolled_back_transaction_leaves_no_trace() {
        let store = NullStore::new();
        let result = with_tx(&store, |tx| -> Result<(), StoreError> {
            tx.set_request(&request('a'))?;
            Err(StoreError::Conflict("abort".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.request_count(), 0);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn committed_transaction_counts_writes() {
        let store = NullStore::new();
        with_tx(&store, |tx| -> Result<(), StoreError> {
            tx.set_request(&request('a'))?;
            tx.set_request(&request('b'))
        })
        .unwrap();
        assert_eq!(store.request_count(), 2);
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn testnet_request_rejects_known_owner_and_bound_address() {
        let store = NullStore::new();
        let mut grant = request('a');
        grant.confirmed_at = Some(Timestamp::new(5));
        store.create_testnet_confirmed_request(&grant).unwrap();

        assert!(matches!(
            store.create_testnet_confirmed_request(&grant),
            Err(StoreError::Duplicate(_))
        ));
        let mut rival = request('b');
        rival.address = grant.address.clone();
        rival.confirmed_at = Some(Timestamp::new(6));
        assert!(matches!(
            store.create_testnet_confirmed_request(&rival),
            Err(StoreError::Duplicate(_))
        ));
        assert!(matches!(
            store.create_testnet_confirmed_request(&request('c')),
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.request_count(), 1);
    }

    #[test]
    fn injected_failure_applies_to_named_operation() {
        let store = NullStore::new();
        store.fail_on("set_request");
        assert!(matches!(store.set_request(&request('a')), Err(StoreError::Backend(_))));
        assert!(store.get_request(&owner('a')).unwrap_err().is_not_found());
        store.clear_failures();
        store.set_request(&request('a')).unwrap();
    }

    #[test]
    fn fraud_domains_match_subdomains() {
        let store = NullStore::new();
        store.put_fraud_domain("Spam.Example").unwrap();
        assert!(store.does_email_have_fraud_domain("x@mx.spam.example").unwrap());
        assert!(!store.does_email_have_fraud_domain("x@example.org").unwrap());
    }
}
