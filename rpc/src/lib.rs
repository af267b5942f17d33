//! HTTP front end for the Vulcan registration service.
//!
//! Every route forwards to [`vulcan_service::RegistrationService`]. This layer
//! only normalizes input, maps errors to status codes and counts requests.
//!
//! - `POST /v1/register`
//! - `GET  /v1/confirm/:owner/:code`
//! - `POST /v1/testnet/stake`
//! - `POST /v1/referral/track`
//! - `POST /v1/referral/installed/:owner`
//! - `GET  /v1/referral/stats/:owner`
//! - `GET  /v1/registration/stats`
//! - `GET  /health`, `GET /metrics`

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::RpcError;
pub use metrics::RpcMetrics;
pub use server::{router, RpcServer, RpcState};
