//! Pluggable decision hooks used by the state handlers.
//!
//! Three points in the mission flow have no settled rule yet. Each is a
//! trait with a default that reproduces the current field behaviour, and
//! each is implemented for plain closures so tests can script them.
//!
//! | Hook | Consulted by | Default |
//! |---|---|---|
//! | [`ObstacleAvoidance`] | SEARCHING, when forward clearance is short | [`HoldCourse`] (no-op) |
//! | [`SearchExit`] | SEARCHING, after the search move | [`AlwaysLeave`] |
//! | [`DropReadiness`] | ALIGNMENT, when the bearing is straight | [`NeverReady`] |

use beacon_hal::{Rig, SensorSuite};
use beacon_types::{BeaconError, DirectionCorrection};
use tracing::debug;

/// Corrective action taken when something is too close ahead.
pub trait ObstacleAvoidance: Send {
    fn avoid(&mut self, rig: &mut Rig, clearance: i32) -> Result<(), BeaconError>;
}

impl<F> ObstacleAvoidance for F
where
    F: FnMut(&mut Rig, i32) -> Result<(), BeaconError> + Send,
{
    fn avoid(&mut self, rig: &mut Rig, clearance: i32) -> Result<(), BeaconError> {
        self(rig, clearance)
    }
}

/// Keeps going regardless of the obstacle.
#[derive(Debug, Default, Clone, Copy)]
pub struct HoldCourse;

impl ObstacleAvoidance for HoldCourse {
    fn avoid(&mut self, _rig: &mut Rig, clearance: i32) -> Result<(), BeaconError> {
        debug!(clearance, "obstacle ahead, holding course");
        Ok(())
    }
}

/// Whether the search phase is over after the latest search move.
pub trait SearchExit: Send {
    fn should_leave(&mut self, correction: DirectionCorrection) -> bool;
}

impl<F> SearchExit for F
where
    F: FnMut(DirectionCorrection) -> bool + Send,
{
    fn should_leave(&mut self, correction: DirectionCorrection) -> bool {
        self(correction)
    }
}

/// Leaves SEARCHING after every search move.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysLeave;

impl SearchExit for AlwaysLeave {
    fn should_leave(&mut self, _correction: DirectionCorrection) -> bool {
        true
    }
}

/// Whether a straight-aligned robot is close enough to drop.
pub trait DropReadiness: Send {
    fn ready_to_drop(&mut self, sensors: &mut SensorSuite) -> Result<bool, BeaconError>;
}

impl<F> DropReadiness for F
where
    F: FnMut(&mut SensorSuite) -> Result<bool, BeaconError> + Send,
{
    fn ready_to_drop(&mut self, sensors: &mut SensorSuite) -> Result<bool, BeaconError> {
        self(sensors)
    }
}

/// Never ready: a straight bearing keeps the robot in ALIGNMENT.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverReady;

impl DropReadiness for NeverReady {
    fn ready_to_drop(&mut self, _sensors: &mut SensorSuite) -> Result<bool, BeaconError> {
        Ok(false)
    }
}

/// The full set of hooks handed to the controller.
pub struct Strategies {
    pub avoidance: Box<dyn ObstacleAvoidance>,
    pub search_exit: Box<dyn SearchExit>,
    pub drop_readiness: Box<dyn DropReadiness>,
}

impl Default for Strategies {
    fn default() -> Self {
        Self {
            avoidance: Box::new(HoldCourse),
            search_exit: Box::new(AlwaysLeave),
            drop_readiness: Box::new(NeverReady),
        }
    }
}

impl Strategies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_avoidance(mut self, avoidance: impl ObstacleAvoidance + 'static) -> Self {
        self.avoidance = Box::new(avoidance);
        self
    }

    pub fn with_search_exit(mut self, search_exit: impl SearchExit + 'static) -> Self {
        self.search_exit = Box::new(search_exit);
        self
    }

    pub fn with_drop_readiness(mut self, readiness: impl DropReadiness + 'static) -> Self {
        self.drop_readiness = Box::new(readiness);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reproduce_field_behaviour() {
        assert!(AlwaysLeave.should_leave(DirectionCorrection::TurnLeft));
        assert!(AlwaysLeave.should_leave(DirectionCorrection::Straight));
    }

    #[test]
    fn closures_are_search_exits() {
        let mut only_when_straight =
            |c: DirectionCorrection| c == DirectionCorrection::Straight;
        assert!(only_when_straight.should_leave(DirectionCorrection::Straight));
        assert!(!only_when_straight.should_leave(DirectionCorrection::TurnRight));
    }
}
