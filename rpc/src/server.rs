//! Axum-based RPC server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use vulcan_service::RegistrationService;

use crate::error::RpcError;
use crate::handlers;
use crate::RpcMetrics;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct RpcState {
    pub service: RegistrationService,
    pub metrics: Arc<RpcMetrics>,
}

/// Build the router with all routes.
pub fn router(state: RpcState) -> Router {
    Router::new()
        .route("/v1/register", post(handlers::register))
        .route("/v1/confirm/:owner/:code", get(handlers::confirm))
        .route("/v1/testnet/stake", post(handlers::testnet_stake))
        .route("/v1/referral/track", post(handlers::track_referral))
        .route("/v1/referral/installed/:owner", post(handlers::referral_installed))
        .route("/v1/referral/stats/:owner", get(handlers::referral_stats))
        .route("/v1/registration/stats", get(handlers::registration_stats))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}

pub struct RpcServer {
    pub addr: SocketAddr,
    state: RpcState,
}

impl RpcServer {
    pub fn new(addr: SocketAddr, state: RpcState) -> Self {
        Self { addr, state }
    }

    /// Serve until `shutdown` resolves, then finish in-flight requests.
    pub async fn start(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), RpcError> {
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {}: {e}", self.addr)))?;
        info!(addr = %self.addr, "RPC server listening");
        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!("RPC server stopped");
        Ok(())
    }
}
