use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;

pub use config::ControllerConfig;

/// Every sensor driver returns a value in `[-SENSOR_LIMIT, SENSOR_LIMIT]`.
pub const SENSOR_LIMIT: i32 = 500;

/// The closed set of controller states. Exactly one is active per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RobotState {
    /// Right at the start, waiting for the operator's go.
    Idle,
    /// Looking for the beacon. Most of the run is spent here.
    Searching,
    /// Near the beacon but not yet lined up for a drop.
    Alignment,
    /// In position; release the carried object.
    DropObject,
    /// Done. Signal completion and stay put.
    Complete,
    /// Interrupt state entered through the collision override.
    Collision,
}

impl RobotState {
    pub const ALL: [RobotState; 6] = [
        RobotState::Idle,
        RobotState::Searching,
        RobotState::Alignment,
        RobotState::DropObject,
        RobotState::Complete,
        RobotState::Collision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RobotState::Idle => "IDLE",
            RobotState::Searching => "SEARCHING",
            RobotState::Alignment => "ALIGNMENT",
            RobotState::DropObject => "DROP_OBJECT",
            RobotState::Complete => "COMPLETE",
            RobotState::Collision => "COLLISION",
        }
    }
}

impl fmt::Display for RobotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heading correction derived from one pair of bearing readings.
///
/// Recomputed on every read; it carries no history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionCorrection {
    Straight,
    TurnRight,
    TurnLeft,
}

/// Drive wheel identifiers. The numeric value is the motor number on the
/// driver board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotorId {
    Left = 1,
    Right = 2,
}

impl MotorId {
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for MotorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorId::Left => write!(f, "left_wheel"),
            MotorId::Right => write!(f, "right_wheel"),
        }
    }
}

/// The controller's only mutable state.
///
/// Owned by the controller. Handlers see it through a shared reference and
/// hand their next state back as a return value, so `previous_state` can
/// only ever be written by [`RobotContext::begin_cycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotContext {
    current_state: RobotState,
    previous_state: RobotState,
}

impl Default for RobotContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RobotContext {
    /// Fresh context: both states start at [`RobotState::Idle`].
    pub fn new() -> Self {
        Self {
            current_state: RobotState::Idle,
            previous_state: RobotState::Idle,
        }
    }

    pub fn current_state(&self) -> RobotState {
        self.current_state
    }

    /// The value `current_state` had when this cycle started, before any
    /// collision override.
    pub fn previous_state(&self) -> RobotState {
        self.previous_state
    }

    /// Snapshot `current_state` into `previous_state`.
    ///
    /// Returns `true` when the robot was already in [`RobotState::Collision`].
    pub fn begin_cycle(&mut self) -> bool {
        self.previous_state = self.current_state;
        self.current_state == RobotState::Collision
    }

    /// Replace the current state. Used for the collision override and to
    /// apply a handler's answer.
    pub fn set_current_state(&mut self, state: RobotState) {
        self.current_state = state;
    }
}

/// Workspace-wide error type.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeaconError {
    #[error("Sensor Unavailable on {sensor}: {details}")]
    SensorUnavailable { sensor: String, details: String },

    #[error("Actuator Fault on {component}: {details}")]
    ActuatorFault { component: String, details: String },

    #[error("Invalid Configuration for {field}: {details}")]
    InvalidConfig { field: String, details: String },

    #[error("Start Signal Lost: {0}")]
    StartSignalLost(String),
}
