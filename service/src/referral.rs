//! Referral funnel: `Registered → Installed → Confirmed`.
//!
//! A referral is paid once the receiver has both installed the extension and
//! confirmed their registration, in whichever order those happen. Rewards are
//! written in the same transaction that moves the row to `Confirmed`; the
//! on-chain transfers follow the commit and are never retried, so a row is
//! paid at most once.

use tracing::{error, info};

use vulcan_store::{with_tx, ReferralTracking, StoreError};
use vulcan_types::{Owner, ReferralStatus, TokenAmount, WalletAddress};

use crate::{RegistrationService, ServiceError};

/// Rewards committed for one confirmed referral.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferralPayout {
    pub sender: Owner,
    pub sender_address: WalletAddress,
    pub sender_reward: TokenAmount,
    pub receiver: Owner,
    pub receiver_address: WalletAddress,
    pub receiver_reward: TokenAmount,
}

fn sender_memo(receiver: &Owner) -> String {
    format!("referral-sender:{receiver}")
}

fn receiver_memo(receiver: &Owner) -> String {
    format!("referral-receiver:{receiver}")
}

impl RegistrationService {
    /// Record that the invited user installed the extension.
    ///
    /// If their registration is already confirmed the referral is paid out
    /// in the background.
    pub async fn mark_installed(&self, receiver: &Owner) -> Result<(), ServiceError> {
        match self
            .store
            .transition_referral_tracking_to_installed(receiver, self.clock.now())
        {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => return Err(ServiceError::NotFound),
            Err(StoreError::Conflict(msg)) => return Err(ServiceError::InvalidTransition(msg)),
            Err(e) => return Err(e.into()),
        }
        info!(%receiver, "referral installed");

        match self.store.get_request(receiver) {
            Ok(request) if request.is_confirmed() => {
                self.spawn_referral_advancement(receiver.clone())
            }
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Pay the referral of `receiver` if it is ready.
    ///
    /// Returns `None` when there is nothing to do: no tracking row, a row
    /// that is not `Installed`, or a receiver not yet confirmed. A transfer
    /// failure is returned after both transfers were attempted; the row
    /// stays `Confirmed` either way.
    pub async fn advance_referral(
        &self,
        receiver: &Owner,
    ) -> Result<Option<ReferralPayout>, ServiceError> {
        let now = self.clock.now();
        let policy = &self.config.referral;

        let payout = with_tx(self.store.as_ref(), |tx| -> Result<_, ServiceError> {
            let tracking: ReferralTracking = match tx.get_referral_tracking_by_receiver(receiver) {
                Ok(tracking) => tracking,
                Err(e) if e.is_not_found() => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            if tracking.status != ReferralStatus::Installed {
                return Ok(None);
            }
            let receiver_request = tx.get_request(receiver)?;
            if !receiver_request.is_confirmed() {
                return Ok(None);
            }
            let sender_request = tx.get_request(&tracking.sender)?;

            let confirmed_before = tx.confirmed_referral_count(&tracking.sender)?;
            let sender_reward = policy.sender_reward(confirmed_before);
            let receiver_reward = policy.receiver_reward;
            tx.transition_referral_tracking_to_confirmed(
                receiver,
                sender_reward,
                receiver_reward,
                now,
            )?;

            Ok(Some(ReferralPayout {
                sender: tracking.sender,
                sender_address: sender_request.address,
                sender_reward,
                receiver: receiver.clone(),
                receiver_address: receiver_request.address,
                receiver_reward,
            }))
        })?;

        let Some(payout) = payout else {
            return Ok(None);
        };
        info!(
            sender = %payout.sender,
            %receiver,
            sender_reward = %payout.sender_reward,
            receiver_reward = %payout.receiver_reward,
            "referral confirmed"
        );

        let transfers = [
            (&payout.sender_address, payout.sender_reward, sender_memo(receiver)),
            (&payout.receiver_address, payout.receiver_reward, receiver_memo(receiver)),
        ];
        let mut first_failure = None;
        for (address, amount, memo) in transfers {
            if amount.is_zero() {
                continue;
            }
            if let Err(e) = self.chain.send_stakes(address, amount, &memo).await {
                error!(%receiver, %address, %amount, %memo, error = %e, "referral reward transfer failed");
                first_failure.get_or_insert(e);
            }
        }
        match first_failure {
            Some(e) => Err(e.into()),
            None => Ok(Some(payout)),
        }
    }
}
