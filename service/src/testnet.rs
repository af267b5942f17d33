//! Testnet faucet: grant a stake to a wallet without the email round trip.

use tracing::{error, info};

use vulcan_crypto::{new_code, owner_from_address, validate_address};
use vulcan_store::{with_tx, Request, StoreError};
use vulcan_types::{Owner, WalletAddress};

use crate::register::unused_referral_code;
use crate::{RegistrationService, ServiceError};

/// Memo attached to the faucet transfer to `address`.
pub(crate) fn testnet_stake_memo(address: &WalletAddress) -> String {
    format!("testnet-stake:{address}")
}

impl RegistrationService {
    /// Send the configured testnet stake to `address` and record it as a
    /// confirmed registration.
    ///
    /// Each address is granted once. `FaucetDisabled` when no testnet stake is
    /// configured.
    pub async fn grant_testnet_stake(&self, address: &WalletAddress) -> Result<Owner, ServiceError> {
        let stake = self.config.testnet_stake.ok_or(ServiceError::FaucetDisabled)?;
        validate_address(address.as_str(), &self.config.address_prefix)
            .map_err(|e| ServiceError::InvalidAddress(e.to_string()))?;

        let owner = owner_from_address(address.as_str());
        match self.store.get_confirmed_request_by_address(address) {
            Ok(_) => return Err(ServiceError::AlreadyExists),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }
        match self.store.get_request(&owner) {
            Ok(_) => return Err(ServiceError::AlreadyExists),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        self.chain
            .send_stakes(address, stake, &testnet_stake_memo(address))
            .await?;

        let now = self.clock.now();
        let stored = with_tx(self.store.as_ref(), |tx| -> Result<(), ServiceError> {
            let request = Request {
                owner: owner.clone(),
                email: String::new(),
                address: address.clone(),
                code: new_code()?,
                created_at: now,
                confirmed_at: Some(now),
                own_referral_code: unused_referral_code(tx)?,
                referral_code: None,
            };
            tx.create_testnet_confirmed_request(&request)?;
            Ok(())
        });
        match stored {
            Ok(()) => {}
            Err(ServiceError::Store(StoreError::Duplicate(_))) => {
                error!(%owner, %address, "testnet stake sent to an address granted concurrently");
                return Err(ServiceError::AlreadyExists);
            }
            Err(e) => {
                error!(%owner, %address, error = %e, "testnet stake sent but grant not stored");
                return Err(e);
            }
        }

        info!(%owner, %address, %stake, "testnet stake granted");
        Ok(owner)
    }
}
