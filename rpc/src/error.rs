//! RPC error types and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use vulcan_service::ServiceError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found")]
    NotFound,

    #[error("server error: {0}")]
    Server(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::NotFound => StatusCode::NOT_FOUND,
            RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RpcError::Service(e) => match e {
                ServiceError::InvalidAddress(_) | ServiceError::InvalidReferralCode => {
                    StatusCode::BAD_REQUEST
                }
                ServiceError::FraudDomain => StatusCode::FORBIDDEN,
                ServiceError::NotFound | ServiceError::FaucetDisabled => StatusCode::NOT_FOUND,
                ServiceError::AlreadyExists | ServiceError::InvalidTransition(_) => {
                    StatusCode::CONFLICT
                }
                ServiceError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
                ServiceError::InvalidConfig(_)
                | ServiceError::Store(_)
                | ServiceError::Blockchain(_)
                | ServiceError::Random(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message shown to the client. Internal failures are not described.
    fn public_message(&self) -> String {
        if self.status().is_server_error() {
            "internal error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vulcan_blockchain::BlockchainError;
    use vulcan_store::StoreError;

    fn status(e: ServiceError) -> StatusCode {
        RpcError::from(e).status()
    }

    #[test]
    fn every_service_error_has_a_status() {
        assert_eq!(status(ServiceError::InvalidAddress("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(ServiceError::InvalidReferralCode), StatusCode::BAD_REQUEST);
        assert_eq!(status(ServiceError::FraudDomain), StatusCode::FORBIDDEN);
        assert_eq!(status(ServiceError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status(ServiceError::FaucetDisabled), StatusCode::NOT_FOUND);
        assert_eq!(status(ServiceError::AlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status(ServiceError::InvalidTransition("x".into())), StatusCode::CONFLICT);
        assert_eq!(status(ServiceError::TooManyAttempts), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            status(ServiceError::Store(StoreError::Backend("disk".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(ServiceError::Blockchain(BlockchainError::Broadcast("x".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(ServiceError::InvalidConfig("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_stay_private() {
        let e = RpcError::from(ServiceError::Store(StoreError::Backend("/var/lib/x".into())));
        assert_eq!(e.public_message(), "internal error");
        assert_eq!(RpcError::NotFound.public_message(), "not found");
    }
}
