//! Shared utilities for the Vulcan registration service.

pub mod clock;
pub mod logging;
pub mod time;

pub use clock::{Clock, SystemClock};
pub use logging::{init_logging, LogFormat};
pub use time::format_duration;
