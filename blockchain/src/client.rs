//! HTTP client for the transaction broadcaster.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vulcan_crypto::validate_address;
use vulcan_types::{TokenAmount, WalletAddress};

use crate::{Blockchain, BlockchainError};

/// Default timeout for broadcaster requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Bond denomination of the target chain.
pub const DEFAULT_DENOM: &str = "udec";

/// ABCI code the chain returns for a transaction it already holds in its
/// mempool cache. Treated as success.
const CODE_TX_IN_MEMPOOL_CACHE: u32 = 19;

/// Body of `POST /v1/transfers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub to: String,
    pub denom: String,
    pub amount: u64,
    pub memo: String,
}

/// Broadcast result as reported by the broadcaster.
#[derive(Debug, Deserialize)]
struct BroadcastResponse {
    /// Block height; zero when the transaction was not included.
    height: u64,
    #[serde(default)]
    code: u32,
    #[serde(default)]
    raw_log: String,
}

/// [`Blockchain`] backed by a broadcaster service that signs and submits
/// bank transfers from the service account.
///
/// `POST {endpoint}/v1/transfers` sends tokens, `GET {endpoint}/v1/status`
/// is the health check.
pub struct HttpBlockchain {
    http_client: reqwest::Client,
    endpoint: String,
    address_prefix: String,
    denom: String,
}

impl HttpBlockchain {
    pub fn new(endpoint: impl Into<String>, address_prefix: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, address_prefix, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        address_prefix: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            address_prefix: address_prefix.into(),
            denom: DEFAULT_DENOM.to_string(),
        }
    }

    pub fn with_denom(mut self, denom: impl Into<String>) -> Self {
        self.denom = denom.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Blockchain for HttpBlockchain {
    async fn send_stakes(
        &self,
        address: &WalletAddress,
        amount: TokenAmount,
        memo: &str,
    ) -> Result<(), BlockchainError> {
        validate_address(address.as_str(), &self.address_prefix)
            .map_err(|e| BlockchainError::InvalidAddress(format!("{address}: {e}")))?;

        let body = TransferRequest {
            to: address.to_string(),
            denom: self.denom.clone(),
            amount: amount.raw(),
            memo: memo.to_string(),
        };
        let url = format!("{}/v1/transfers", self.endpoint);
        let response = self.http_client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(BlockchainError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let resp: BroadcastResponse = response.json().await.map_err(|e| {
            BlockchainError::InvalidResponse(format!("failed to parse broadcast response: {e}"))
        })?;

        if resp.height == 0 {
            if resp.code == CODE_TX_IN_MEMPOOL_CACHE {
                warn!(%address, memo, "transfer already in mempool cache");
                return Ok(());
            }
            return Err(BlockchainError::Broadcast(format!(
                "code {}: {}",
                resp.code, resp.raw_log
            )));
        }

        debug!(%address, %amount, height = resp.height, "stake transfer included");
        Ok(())
    }

    async fn ping(&self) -> Result<(), BlockchainError> {
        let url = format!("{}/v1/status", self.endpoint);
        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(BlockchainError::Unreachable(format!(
                "HTTP status {}",
                response.status()
            )));
        }
        Ok(())
    }
}
