//! Workflow configuration.

use serde::{Deserialize, Serialize};

use vulcan_types::TokenAmount;

use crate::ServiceError;

/// Tunables of the registration workflow.
///
/// Deserializes from the `[service]` table of the daemon's TOML file; every
/// field has a default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Minimum seconds between two verification emails for one unconfirmed
    /// request.
    #[serde(default = "default_throttle_secs")]
    pub throttle_secs: u64,

    /// Tokens granted to a wallet when its registration is confirmed.
    #[serde(default = "default_initial_stake")]
    pub initial_stake: TokenAmount,

    /// Human-readable prefix every wallet address must carry.
    #[serde(default = "default_address_prefix")]
    pub address_prefix: String,

    #[serde(default)]
    pub referral: ReferralPolicy,

    /// Stake granted by the testnet faucet. `None` disables the faucet.
    #[serde(default)]
    pub testnet_stake: Option<TokenAmount>,
}

fn default_throttle_secs() -> u64 {
    60
}

fn default_initial_stake() -> TokenAmount {
    TokenAmount::new(1_000_000)
}

fn default_address_prefix() -> String {
    "decentr".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            throttle_secs: default_throttle_secs(),
            initial_stake: default_initial_stake(),
            address_prefix: default_address_prefix(),
            referral: ReferralPolicy::default(),
            testnet_stake: None,
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.address_prefix.is_empty() {
            return Err(ServiceError::InvalidConfig("address_prefix is empty".into()));
        }
        if self.initial_stake.is_zero() {
            return Err(ServiceError::InvalidConfig("initial_stake is zero".into()));
        }
        if self.testnet_stake.is_some_and(|stake| stake.is_zero()) {
            return Err(ServiceError::InvalidConfig("testnet_stake is zero".into()));
        }
        self.referral.validate()
    }
}

/// One step of the sender reward schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTier {
    /// Confirmed referrals the sender must already have for this tier to apply.
    pub min_confirmed: u64,
    pub reward: TokenAmount,
}

/// How much a confirmed referral pays.
///
/// The receiver always gets `receiver_reward`. The sender is paid by the
/// highest tier whose `min_confirmed` does not exceed the number of referrals
/// of theirs confirmed before this one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferralPolicy {
    pub receiver_reward: TokenAmount,
    pub sender_tiers: Vec<RewardTier>,
}

impl Default for ReferralPolicy {
    fn default() -> Self {
        let tier = |min_confirmed, reward| RewardTier {
            min_confirmed,
            reward: TokenAmount::new(reward),
        };
        Self {
            receiver_reward: TokenAmount::new(10_000_000),
            sender_tiers: vec![
                tier(0, 10_000_000),
                tier(100, 12_500_000),
                tier(250, 15_000_000),
                tier(500, 17_500_000),
                tier(1000, 20_000_000),
            ],
        }
    }
}

impl ReferralPolicy {
    /// Reward for a sender that already has `confirmed_before` confirmed
    /// referrals. Zero when no tier applies.
    pub fn sender_reward(&self, confirmed_before: u64) -> TokenAmount {
        self.sender_tiers
            .iter()
            .filter(|t| t.min_confirmed <= confirmed_before)
            .max_by_key(|t| t.min_confirmed)
            .map(|t| t.reward)
            .unwrap_or(TokenAmount::ZERO)
    }

    fn validate(&self) -> Result<(), ServiceError> {
        let mut thresholds: Vec<u64> = self.sender_tiers.iter().map(|t| t.min_confirmed).collect();
        thresholds.sort_unstable();
        if thresholds.windows(2).any(|w| w[0] == w[1]) {
            return Err(ServiceError::InvalidConfig(
                "referral tiers share a min_confirmed threshold".into(),
            ));
        }
        Ok(())
    }
}
