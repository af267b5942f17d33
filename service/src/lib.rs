//! The Vulcan registration workflow.
//!
//! [`RegistrationService`] binds an email address to a wallet address with a
//! mailed one-time code, grants the initial stake once the code is confirmed,
//! and pays referral rewards when an invited user completes the funnel.
//!
//! The service keeps no state of its own between calls. Everything durable
//! lives behind [`vulcan_store::RegistryStore`]; the chain and the mailer are
//! injected as trait objects.

pub mod config;
mod confirm;
pub mod error;
mod referral;
mod register;
pub mod service;
mod testnet;

pub use config::{ReferralPolicy, RewardTier, ServiceConfig};
pub use error::ServiceError;
pub use referral::ReferralPayout;
pub use service::{RegistrationService, RegistrationStats};
