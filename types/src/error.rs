//! Parse errors for the shared types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid owner: {0}")]
    InvalidOwner(String),

    #[error("unknown referral status: {0}")]
    UnknownStatus(String),
}
