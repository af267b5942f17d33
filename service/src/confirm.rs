//! Confirm: check the mailed code and grant the initial stake.

use tracing::{error, info};

use vulcan_crypto::codes_match;
use vulcan_store::StoreError;
use vulcan_types::Owner;

use crate::{RegistrationService, ServiceError};

/// Memo attached to the stake transfer of `owner`.
///
/// Deterministic, so the broadcaster can recognize a repeated grant.
pub(crate) fn stake_memo(owner: &Owner) -> String {
    format!("stake:{owner}")
}

impl RegistrationService {
    /// Confirm the registration of `owner` with the mailed `code`.
    ///
    /// An unknown owner and a wrong code both yield `NotFound`.
    pub async fn confirm(&self, owner: &Owner, code: &str) -> Result<(), ServiceError> {
        let request = match self.store.get_request(owner) {
            Ok(request) => request,
            Err(e) if e.is_not_found() => return Err(ServiceError::NotFound),
            Err(e) => return Err(e.into()),
        };
        if !codes_match(&request.code, code) {
            return Err(ServiceError::NotFound);
        }
        if request.is_confirmed() {
            return Err(ServiceError::AlreadyExists);
        }

        self.chain
            .send_stakes(&request.address, self.config.initial_stake, &stake_memo(owner))
            .await?;

        match self.store.set_confirmed(owner, self.clock.now()) {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                error!(%owner, "request confirmed concurrently after stake transfer");
                return Err(ServiceError::AlreadyExists);
            }
            Err(e) => {
                error!(%owner, address = %request.address, error = %e,
                    "stake sent but confirmation not stored");
                return Err(e.into());
            }
        }
        info!(%owner, address = %request.address, stake = %self.config.initial_stake, "registration confirmed");

        self.mailer.send_welcome_email_async(&request.email);
        self.spawn_referral_advancement(owner.clone());
        Ok(())
    }
}
