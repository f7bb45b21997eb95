//! Blocking time source used by timed moves.

use std::thread;
use std::time::Duration;

/// Blocks the calling thread for a duration.
///
/// While a [`DriveBase`][crate::drive::DriveBase] move is sleeping nothing
/// else runs: no sensor polling, no collision checks.
pub trait Clock: Send {
    fn sleep(&mut self, duration: Duration);
}

/// Wall-clock sleep via [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}
