use async_trait::async_trait;

use vulcan_types::{TokenAmount, WalletAddress};

use crate::BlockchainError;

/// What the registration workflow needs from the chain.
///
/// Implementations must not retry internally: a failed transfer is reported
/// to the caller, who decides what to do with it.
#[async_trait]
pub trait Blockchain: Send + Sync {
    /// Transfer `amount` from the service account to `address`.
    ///
    /// `memo` is attached to the transaction unchanged. Callers pass a
    /// deterministic value so a repeated transfer can be recognized.
    async fn send_stakes(
        &self,
        address: &WalletAddress,
        amount: TokenAmount,
        memo: &str,
    ) -> Result<(), BlockchainError>;

    /// Check that the chain can be reached.
    async fn ping(&self) -> Result<(), BlockchainError>;
}
