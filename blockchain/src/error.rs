use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("transfer was not accepted by the chain: {0}")]
    Broadcast(String),

    #[error("HTTP request to broadcaster failed: {0}")]
    RequestFailed(String),

    #[error("invalid response from broadcaster: {0}")]
    InvalidResponse(String),

    #[error("broadcaster unreachable: {0}")]
    Unreachable(String),
}

impl From<reqwest::Error> for BlockchainError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BlockchainError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            BlockchainError::Unreachable(format!("connection failed: {e}"))
        } else {
            BlockchainError::RequestFailed(e.to_string())
        }
    }
}
