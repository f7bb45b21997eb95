//! [`Rig`] – the hardware bundle handed to every state handler.

use crate::drive::DriveBase;
use crate::latch::ReleaseLatch;
use crate::sensor::SensorSuite;
use crate::start::StartSignal;

/// All robot I/O in one place. Handlers borrow it mutably for the duration
/// of a single cycle.
pub struct Rig {
    pub sensors: SensorSuite,
    pub drive: DriveBase,
    pub latch: Box<dyn ReleaseLatch>,
    pub start: Box<dyn StartSignal>,
}

impl Rig {
    pub fn new(
        sensors: SensorSuite,
        drive: DriveBase,
        latch: Box<dyn ReleaseLatch>,
        start: Box<dyn StartSignal>,
    ) -> Self {
        Self {
            sensors,
            drive,
            latch,
            start,
        }
    }
}
