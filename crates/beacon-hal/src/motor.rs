//! Generic `Motor` trait for a single drive wheel.
//!
//! The [`DriveBase`][crate::drive::DriveBase] owns one motor per side and is
//! the only caller; nothing else in the controller talks to a motor directly.

use beacon_types::{BeaconError, MotorId};

/// A power-controlled wheel motor.
pub trait Motor: Send {
    /// Which wheel this driver moves.
    fn id(&self) -> MotorId;

    /// Apply a signed power level. Positive drives the wheel forward.
    ///
    /// # Errors
    ///
    /// Returns [`BeaconError::ActuatorFault`] if the driver rejects the
    /// command.
    fn set_power(&mut self, power: i32) -> Result<(), BeaconError>;

    /// The most recently applied power level.
    fn power(&self) -> i32;
}
