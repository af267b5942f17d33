use thiserror::Error;

use vulcan_blockchain::BlockchainError;
use vulcan_crypto::CryptoError;
use vulcan_store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("already exists")]
    AlreadyExists,

    #[error("too many attempts")]
    TooManyAttempts,

    /// Unknown owner or wrong code. The two are not told apart.
    #[error("not found")]
    NotFound,

    #[error("email domain is on the fraud list")]
    FraudDomain,

    #[error("invalid referral code")]
    InvalidReferralCode,

    #[error("invalid referral transition: {0}")]
    InvalidTransition(String),

    #[error("testnet faucet is disabled")]
    FaucetDisabled,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("storage: {0}")]
    Store(#[from] StoreError),

    #[error("blockchain: {0}")]
    Blockchain(#[from] BlockchainError),

    #[error("random source: {0}")]
    Random(#[from] CryptoError),
}
