//! Wall-clock abstraction.

use vulcan_types::Timestamp;

/// Source of the current time.
///
/// Everything that stamps or compares times takes a `Clock` so tests can
/// pin the time instead of sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The system's wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
