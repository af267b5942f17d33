//! Nullable chain: records transfers instead of broadcasting them.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use vulcan_blockchain::{Blockchain, BlockchainError};
use vulcan_types::{TokenAmount, WalletAddress};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub address: WalletAddress,
    pub amount: TokenAmount,
    pub memo: String,
}

/// In-memory [`Blockchain`].
///
/// Only successful transfers are recorded. Failures can be switched on for
/// every transfer or for chosen recipients.
#[derive(Default)]
pub struct NullBlockchain {
    transfers: Mutex<Vec<Transfer>>,
    fail_all: AtomicBool,
    failing_addresses: Mutex<HashSet<WalletAddress>>,
    unreachable: AtomicBool,
}

impl NullBlockchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following transfer fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }

    /// Make transfers to `address` fail.
    pub fn fail_for(&self, address: &WalletAddress) {
        self.failing_addresses.lock().unwrap().insert(address.clone());
    }

    /// Make `ping` fail.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn transfers(&self) -> Vec<Transfer> {
        self.transfers.lock().unwrap().clone()
    }

    pub fn transfers_to(&self, address: &WalletAddress) -> Vec<Transfer> {
        self.transfers()
            .into_iter()
            .filter(|t| &t.address == address)
            .collect()
    }
}

#[async_trait]
impl Blockchain for NullBlockchain {
    async fn send_stakes(
        &self,
        address: &WalletAddress,
        amount: TokenAmount,
        memo: &str,
    ) -> Result<(), BlockchainError> {
        if self.fail_all.load(Ordering::SeqCst)
            || self.failing_addresses.lock().unwrap().contains(address)
        {
            return Err(BlockchainError::Broadcast("injected failure".into()));
        }
        self.transfers.lock().unwrap().push(Transfer {
            address: address.clone(),
            amount,
            memo: memo.to_string(),
        });
        Ok(())
    }

    async fn ping(&self) -> Result<(), BlockchainError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(BlockchainError::Unreachable("injected failure".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_successful_transfers_only() {
        let chain = NullBlockchain::new();
        let a = WalletAddress::new("decentr1a");
        let b = WalletAddress::new("decentr1b");
        chain.fail_for(&b);

        chain.send_stakes(&a, TokenAmount::new(5), "m1").await.unwrap();
        assert!(chain.send_stakes(&b, TokenAmount::new(5), "m2").await.is_err());
        chain.set_failing(true);
        assert!(chain.send_stakes(&a, TokenAmount::new(1), "m3").await.is_err());

        assert_eq!(chain.transfers().len(), 1);
        assert_eq!(chain.transfers_to(&a)[0].memo, "m1");
    }
}
