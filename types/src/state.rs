//! Referral tracking states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Lifecycle of a sender → receiver referral relationship.
///
/// Transitions are strictly forward: `Registered → Installed → Confirmed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralStatus {
    /// The receiver registered with the sender's referral code.
    Registered,
    /// App installation by the receiver has been observed.
    Installed,
    /// The receiver confirmed their registration; rewards were issued.
    Confirmed,
}

impl ReferralStatus {
    /// The only state this one may move to, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Registered => Some(Self::Installed),
            Self::Installed => Some(Self::Confirmed),
            Self::Confirmed => None,
        }
    }

    /// Whether `to` is the immediate forward successor of `self`.
    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Installed => "installed",
            Self::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferralStatus {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(Self::Registered),
            "installed" => Ok(Self::Installed),
            "confirmed" => Ok(Self::Confirmed),
            other => Err(TypesError::UnknownStatus(other.to_string())),
        }
    }
}
