//! The service object and its read-only queries.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use vulcan_blockchain::Blockchain;
use vulcan_mail::Sender;
use vulcan_store::{DailyCount, ReferralStats, ReferralTracking, RegistryStore};
use vulcan_types::Owner;
use vulcan_utils::Clock;

use crate::{ServiceConfig, ServiceError};

/// Confirmed registrations overall and per UTC day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationStats {
    pub total: u64,
    pub by_day: Vec<DailyCount>,
}

/// Orchestrates registration, confirmation and referral rewards against the
/// injected collaborators.
///
/// Cloning is cheap; clones share collaborators and the set of background
/// tasks.
#[derive(Clone)]
pub struct RegistrationService {
    pub(crate) store: Arc<dyn RegistryStore + Send + Sync>,
    pub(crate) chain: Arc<dyn Blockchain>,
    pub(crate) mailer: Arc<dyn Sender>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: Arc<ServiceConfig>,
    background: Arc<Mutex<JoinSet<()>>>,
}

impl RegistrationService {
    pub fn new(
        store: Arc<dyn RegistryStore + Send + Sync>,
        chain: Arc<dyn Blockchain>,
        mailer: Arc<dyn Sender>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            chain,
            mailer,
            clock,
            config: Arc::new(config),
            background: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Check that the chain is reachable.
    pub async fn ping(&self) -> Result<(), ServiceError> {
        Ok(self.chain.ping().await?)
    }

    pub fn registration_stats(&self) -> Result<RegistrationStats, ServiceError> {
        Ok(RegistrationStats {
            total: self.store.confirmed_registrations_total()?,
            by_day: self.store.confirmed_registrations_by_day()?,
        })
    }

    pub fn referral_stats(&self, sender: &Owner) -> Result<ReferralStats, ServiceError> {
        Ok(self.store.referral_stats(sender)?)
    }

    /// Referrals stuck in `Installed` for more than `days` days.
    pub fn stale_installed_referrals(
        &self,
        days: u64,
    ) -> Result<Vec<ReferralTracking>, ServiceError> {
        let cutoff = self.clock.now().minus_days(days);
        Ok(self.store.installed_referrals_before(cutoff)?)
    }

    /// Run referral advancement for `receiver` on a background task.
    pub(crate) fn spawn_referral_advancement(&self, receiver: Owner) {
        let service = self.clone();
        let mut tasks = match self.background.lock() {
            Ok(tasks) => tasks,
            Err(poisoned) => poisoned.into_inner(),
        };
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            match service.advance_referral(&receiver).await {
                Ok(Some(payout)) => debug!(%receiver, ?payout, "referral rewarded"),
                Ok(None) => {}
                Err(e) => warn!(%receiver, error = %e, "referral advancement failed"),
            }
        });
    }

    /// Wait for every background task started so far.
    pub async fn drain(&self) {
        let mut tasks = {
            let mut guard = match self.background.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            std::mem::take(&mut *guard)
        };
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "background task panicked");
            }
        }
    }
}
