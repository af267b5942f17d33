//! Referral tracking storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use vulcan_types::{Owner, ReferralStatus, Timestamp, TokenAmount};

/// One sender → receiver referral relationship.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralTracking {
    pub sender: Owner,
    /// Unique: a receiver is referred at most once.
    pub receiver: Owner,
    pub status: ReferralStatus,
    pub registered_at: Timestamp,
    pub installed_at: Option<Timestamp>,
    pub confirmed_at: Option<Timestamp>,
    pub sender_reward: Option<TokenAmount>,
    pub receiver_reward: Option<TokenAmount>,
}

impl ReferralTracking {
    pub fn new(sender: Owner, receiver: Owner, at: Timestamp) -> Self {
        Self {
            sender,
            receiver,
            status: ReferralStatus::Registered,
            registered_at: at,
            installed_at: None,
            confirmed_at: None,
            sender_reward: None,
            receiver_reward: None,
        }
    }

    /// Move to `Installed`. Fails unless currently `Registered`.
    pub fn mark_installed(&mut self, at: Timestamp) -> Result<(), StoreError> {
        self.check_transition(ReferralStatus::Installed)?;
        self.status = ReferralStatus::Installed;
        self.installed_at = Some(at);
        Ok(())
    }

    /// Move to `Confirmed` and record the rewards. Fails unless currently `Installed`.
    pub fn mark_confirmed(
        &mut self,
        sender_reward: TokenAmount,
        receiver_reward: TokenAmount,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        self.check_transition(ReferralStatus::Confirmed)?;
        self.status = ReferralStatus::Confirmed;
        self.confirmed_at = Some(at);
        self.sender_reward = Some(sender_reward);
        self.receiver_reward = Some(receiver_reward);
        Ok(())
    }

    fn check_transition(&self, to: ReferralStatus) -> Result<(), StoreError> {
        if self.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(StoreError::Conflict(format!(
                "referral of {} cannot move from {} to {}",
                self.receiver, self.status, to
            )))
        }
    }
}

/// Per-sender referral counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralStats {
    pub registered: u64,
    pub installed: u64,
    pub confirmed: u64,
    /// Sum of sender rewards earned so far.
    pub reward: TokenAmount,
}

/// Trait for referral tracking storage.
///
/// Status changes go through the `transition_*` methods, which act as a
/// compare-and-set on the current status.
pub trait ReferralStore {
    /// Create a `Registered` row. `StoreError::Duplicate` if the receiver is
    /// already tracked.
    fn create_referral_tracking(
        &self,
        sender: &Owner,
        receiver: &Owner,
        at: Timestamp,
    ) -> Result<(), StoreError>;

    fn get_referral_tracking_by_receiver(
        &self,
        receiver: &Owner,
    ) -> Result<ReferralTracking, StoreError>;

    /// `Registered → Installed`; `StoreError::Conflict` from any other status.
    fn transition_referral_tracking_to_installed(
        &self,
        receiver: &Owner,
        at: Timestamp,
    ) -> Result<(), StoreError>;

    /// `Installed → Confirmed` with rewards; `StoreError::Conflict` from any other status.
    fn transition_referral_tracking_to_confirmed(
        &self,
        receiver: &Owner,
        sender_reward: TokenAmount,
        receiver_reward: TokenAmount,
        at: Timestamp,
    ) -> Result<(), StoreError>;

    /// All relationships started by `sender`.
    fn referrals_by_sender(&self, sender: &Owner) -> Result<Vec<ReferralTracking>, StoreError>;

    /// `Installed` relationships whose installation happened before `cutoff`.
    fn installed_referrals_before(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<ReferralTracking>, StoreError>;

    fn confirmed_referral_count(&self, sender: &Owner) -> Result<u64, StoreError> {
        Ok(self
            .referrals_by_sender(sender)?
            .iter()
            .filter(|r| r.status == ReferralStatus::Confirmed)
            .count() as u64)
    }

    fn referral_stats(&self, sender: &Owner) -> Result<ReferralStats, StoreError> {
        let mut stats = ReferralStats::default();
        for r in self.referrals_by_sender(sender)? {
            match r.status {
                ReferralStatus::Registered => stats.registered += 1,
                ReferralStatus::Installed => stats.installed += 1,
                ReferralStatus::Confirmed => stats.confirmed += 1,
            }
            if let Some(reward) = r.sender_reward {
                stats.reward = stats.reward.saturating_add(reward);
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(c: char) -> Owner {
        Owner::from_hex_unchecked(std::iter::repeat(c).take(32).collect())
    }

    #[test]
    fn lifecycle_moves_forward() {
        let mut r = ReferralTracking::new(owner('a'), owner('b'), Timestamp::new(10));
        r.mark_installed(Timestamp::new(20)).unwrap();
        r.mark_confirmed(TokenAmount::new(5), TokenAmount::new(3), Timestamp::new(30))
            .unwrap();
        assert_eq!(r.status, ReferralStatus::Confirmed);
        assert_eq!(r.installed_at, Some(Timestamp::new(20)));
        assert_eq!(r.sender_reward, Some(TokenAmount::new(5)));
        assert_eq!(r.receiver_reward, Some(TokenAmount::new(3)));
    }

    #[test]
    fn cannot_skip_installation() {
        let mut r = ReferralTracking::new(owner('a'), owner('b'), Timestamp::new(10));
        let err = r
            .mark_confirmed(TokenAmount::new(5), TokenAmount::new(3), Timestamp::new(30))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(r.status, ReferralStatus::Registered);
    }

    #[test]
    fn confirmed_is_terminal() {
        let mut r = ReferralTracking::new(owner('a'), owner('b'), Timestamp::new(10));
        r.mark_installed(Timestamp::new(20)).unwrap();
        r.mark_confirmed(TokenAmount::new(5), TokenAmount::new(3), Timestamp::new(30))
            .unwrap();
        assert!(r.mark_installed(Timestamp::new(40)).is_err());
        assert!(r
            .mark_confirmed(TokenAmount::new(9), TokenAmount::new(9), Timestamp::new(40))
            .is_err());
        assert_eq!(r.sender_reward, Some(TokenAmount::new(5)));
    }
}
