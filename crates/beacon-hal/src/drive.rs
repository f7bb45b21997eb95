//! [`DriveBase`] – differential drive built on two [`Motor`]s.
//!
//! Every timed move follows the same shape: command the wheels, block for
//! the duration, then command zero on both wheels. The zeroing is tied to a
//! scope guard, so it also runs when a motor command fails halfway through
//! or the clock panics.
//!
//! # Power shaping
//!
//! A non-zero command gets the per-wheel trim added and is then clamped to
//! `[-power_max, power_max]`. A zero command is sent as exactly zero: the
//! trim never keeps a stopped wheel creeping.

use std::time::Duration;

use beacon_types::{BeaconError, MotorId};
use tracing::{debug, error, instrument};

use crate::clock::Clock;
use crate::motor::Motor;

const DEFAULT_POWER_MAX: i32 = 100;

/// Two-wheel drive with blocking timed moves.
pub struct DriveBase {
    left: Box<dyn Motor>,
    right: Box<dyn Motor>,
    clock: Box<dyn Clock>,
    offset_left: i32,
    offset_right: i32,
    power_max: i32,
}

impl DriveBase {
    /// Build a drive base from its two wheel motors and a clock.
    ///
    /// # Errors
    ///
    /// Returns [`BeaconError::ActuatorFault`] if the motors are not one
    /// [`MotorId::Left`] and one [`MotorId::Right`] in that order.
    pub fn new(
        left: Box<dyn Motor>,
        right: Box<dyn Motor>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, BeaconError> {
        for (motor, expected) in [(&left, MotorId::Left), (&right, MotorId::Right)] {
            if motor.id() != expected {
                return Err(BeaconError::ActuatorFault {
                    component: expected.to_string(),
                    details: format!("expected {expected} motor, got {}", motor.id()),
                });
            }
        }
        Ok(Self {
            left,
            right,
            clock,
            offset_left: 0,
            offset_right: 0,
            power_max: DEFAULT_POWER_MAX,
        })
    }

    /// Set the per-wheel trims added to every non-zero command.
    pub fn with_trim(mut self, offset_left: i32, offset_right: i32) -> Self {
        self.offset_left = offset_left;
        self.offset_right = offset_right;
        self
    }

    /// Cap the magnitude of every wheel command.
    pub fn with_power_cap(mut self, power_max: i32) -> Self {
        self.power_max = power_max.saturating_abs();
        self
    }

    /// The differential-drive primitive: apply `left` and `right` and leave
    /// them applied.
    ///
    /// Prefer the timed moves, which always stop afterwards.
    pub fn set_wheel_powers(&mut self, left: i32, right: i32) -> Result<(), BeaconError> {
        let left = shape(left, self.offset_left, self.power_max);
        let right = shape(right, self.offset_right, self.power_max);
        debug!(motor = MotorId::Left.number(), power = left, "set motor");
        self.left.set_power(left)?;
        debug!(motor = MotorId::Right.number(), power = right, "set motor");
        self.right.set_power(right)
    }

    /// Command zero on both wheels.
    ///
    /// Both wheels are attempted even if the first command fails; the first
    /// error is returned.
    pub fn stop(&mut self) -> Result<(), BeaconError> {
        let left = self.left.set_power(0);
        let right = self.right.set_power(0);
        left.and(right)
    }

    /// Equal power on both wheels for `duration`, then stop. Negative power
    /// drives backward.
    #[instrument(level = "debug", skip(self))]
    pub fn drive_forward(&mut self, power: i32, duration: Duration) -> Result<(), BeaconError> {
        self.pulse(power, power, duration)
    }

    /// Spin clockwise in place for `duration`, then stop.
    #[instrument(level = "debug", skip(self))]
    pub fn turn_right(&mut self, power: i32, duration: Duration) -> Result<(), BeaconError> {
        self.pulse(power, -power, duration)
    }

    /// Spin counter-clockwise in place for `duration`, then stop.
    #[instrument(level = "debug", skip(self))]
    pub fn turn_left(&mut self, power: i32, duration: Duration) -> Result<(), BeaconError> {
        self.pulse(-power, power, duration)
    }

    /// Block for `duration` without moving.
    pub fn hold(&mut self, duration: Duration) {
        self.clock.sleep(duration);
    }

    /// Last applied `(left, right)` power levels.
    pub fn wheel_powers(&self) -> (i32, i32) {
        (self.left.power(), self.right.power())
    }

    fn pulse(&mut self, left: i32, right: i32, duration: Duration) -> Result<(), BeaconError> {
        let mut motion = Motion::begin(self);
        motion.base.set_wheel_powers(left, right)?;
        motion.base.clock.sleep(duration);
        motion.finish()
    }
}

fn shape(power: i32, offset: i32, power_max: i32) -> i32 {
    if power == 0 {
        return 0;
    }
    power.saturating_add(offset).clamp(-power_max, power_max)
}

/// Stops the drive base when it goes out of scope unless
/// [`Motion::finish`] already did.
struct Motion<'a> {
    base: &'a mut DriveBase,
    stopped: bool,
}

impl<'a> Motion<'a> {
    fn begin(base: &'a mut DriveBase) -> Self {
        Self {
            base,
            stopped: false,
        }
    }

    fn finish(mut self) -> Result<(), BeaconError> {
        let result = self.base.stop();
        self.stopped = result.is_ok();
        result
    }
}

impl Drop for Motion<'_> {
    fn drop(&mut self) {
        if self.stopped {
            return;
        }
        if let Err(e) = self.base.stop() {
            error!(error = %e, "failed to stop drive base after move");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct MockMotor {
        id: MotorId,
        history: Arc<Mutex<Vec<i32>>>,
        fail_on: Option<i32>,
    }

    impl MockMotor {
        fn new(id: MotorId) -> Self {
            Self {
                id,
                history: Arc::new(Mutex::new(Vec::new())),
                fail_on: None,
            }
        }

        fn history(&self) -> Vec<i32> {
            self.history.lock().unwrap().clone()
        }
    }

    impl Motor for MockMotor {
        fn id(&self) -> MotorId {
            self.id
        }

        fn set_power(&mut self, power: i32) -> Result<(), BeaconError> {
            if self.fail_on == Some(power) {
                return Err(BeaconError::ActuatorFault {
                    component: self.id.to_string(),
                    details: "stalled".to_string(),
                });
            }
            self.history.lock().unwrap().push(power);
            Ok(())
        }

        fn power(&self) -> i32 {
            self.history.lock().unwrap().last().copied().unwrap_or(0)
        }
    }

    #[derive(Clone, Default)]
    struct MockClock {
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    impl Clock for MockClock {
        fn sleep(&mut self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    fn base() -> (DriveBase, MockMotor, MockMotor, MockClock) {
        let left = MockMotor::new(MotorId::Left);
        let right = MockMotor::new(MotorId::Right);
        let clock = MockClock::default();
        let base = DriveBase::new(
            Box::new(left.clone()),
            Box::new(right.clone()),
            Box::new(clock.clone()),
        )
        .unwrap();
        (base, left, right, clock)
    }

    #[test]
    fn drive_forward_pulses_then_stops() {
        let (mut base, left, right, clock) = base();
        base.drive_forward(50, Duration::from_millis(1000)).unwrap();
        assert_eq!(left.history(), vec![50, 0]);
        assert_eq!(right.history(), vec![50, 0]);
        assert_eq!(*clock.sleeps.lock().unwrap(), vec![Duration::from_millis(1000)]);
        assert_eq!(base.wheel_powers(), (0, 0));
    }

    #[test]
    fn turns_use_opposite_powers() {
        let (mut base, left, right, _) = base();
        base.turn_right(30, Duration::from_millis(10)).unwrap();
        base.turn_left(30, Duration::from_millis(10)).unwrap();
        assert_eq!(left.history(), vec![30, 0, -30, 0]);
        assert_eq!(right.history(), vec![-30, 0, 30, 0]);
    }

    #[test]
    fn every_move_ends_stopped_for_any_power_and_zero_duration() {
        let (mut base, _, _, _) = base();
        for power in [-150, -50, 0, 1, 99, 250] {
            base.drive_forward(power, Duration::ZERO).unwrap();
            assert_eq!(base.wheel_powers(), (0, 0));
            base.turn_right(power, Duration::ZERO).unwrap();
            assert_eq!(base.wheel_powers(), (0, 0));
            base.turn_left(power, Duration::ZERO).unwrap();
            assert_eq!(base.wheel_powers(), (0, 0));
        }
    }

    #[test]
    fn trim_applies_to_motion_but_not_to_stop() {
        let (base, left, right, _) = base();
        let mut base = base.with_trim(5, -3);
        base.drive_forward(50, Duration::ZERO).unwrap();
        assert_eq!(left.history(), vec![55, 0]);
        assert_eq!(right.history(), vec![47, 0]);
    }

    #[test]
    fn power_cap_clamps_commands() {
        let (base, left, right, _) = base();
        let mut base = base.with_power_cap(60);
        base.turn_left(90, Duration::ZERO).unwrap();
        assert_eq!(left.history(), vec![-60, 0]);
        assert_eq!(right.history(), vec![60, 0]);
    }

    #[test]
    fn extreme_power_cap_saturates() {
        let (base, left, _, _) = base();
        let mut base = base.with_power_cap(i32::MIN);
        base.drive_forward(i32::MIN, Duration::ZERO).unwrap();
        assert_eq!(left.history(), vec![-i32::MAX, 0]);
    }

    #[test]
    fn failed_command_still_stops_both_wheels() {
        let left = MockMotor::new(MotorId::Left);
        let mut right = MockMotor::new(MotorId::Right);
        right.fail_on = Some(40);
        let mut base = DriveBase::new(
            Box::new(left.clone()),
            Box::new(right.clone()),
            Box::new(MockClock::default()),
        )
        .unwrap();

        let result = base.drive_forward(40, Duration::from_millis(5));
        assert!(matches!(result, Err(BeaconError::ActuatorFault { .. })));
        // Left was driven, then the guard zeroed both sides.
        assert_eq!(left.history(), vec![40, 0]);
        assert_eq!(right.history(), vec![0]);
        assert_eq!(base.wheel_powers(), (0, 0));
    }

    #[test]
    fn swapped_motors_are_rejected() {
        let result = DriveBase::new(
            Box::new(MockMotor::new(MotorId::Right)),
            Box::new(MockMotor::new(MotorId::Left)),
            Box::new(MockClock::default()),
        );
        assert!(matches!(result, Err(BeaconError::ActuatorFault { .. })));
    }

    #[test]
    fn hold_sleeps_without_commanding_motors() {
        let (mut base, left, _, clock) = base();
        base.hold(Duration::from_millis(250));
        assert!(left.history().is_empty());
        assert_eq!(*clock.sleeps.lock().unwrap(), vec![Duration::from_millis(250)]);
    }
}
