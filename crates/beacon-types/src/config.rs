//! Tunable constants for the beacon-seeking controller.
//!
//! Every field has a default, so a partial TOML table (or none at all)
//! yields a usable configuration. Validation lives in `beacon-kernel`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Thresholds, power levels, and timings used by the state handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Bearing diff (`left - right`) below which the heading counts as
    /// straight, provided both sensors see the signal.
    pub straight_threshold: i32,
    /// Minimum per-sensor magnitude for the beacon to count as visible.
    pub signal_threshold: i32,
    /// Forward range (cm) under which obstacle avoidance runs first.
    pub min_forward_clearance: i32,
    pub power_low: i32,
    pub power_medium: i32,
    pub power_high: i32,
    /// Absolute cap on any wheel command after trims.
    pub power_max: i32,
    pub search_move_ms: u64,
    pub drop_settle_ms: u64,
    pub drop_reverse_ms: u64,
    /// Trim added to every non-zero command on the left wheel.
    pub motor_offset_left: i32,
    /// Trim added to every non-zero command on the right wheel.
    pub motor_offset_right: i32,
    /// Byte on the start-signal stream that means "begin".
    pub start_token: char,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            straight_threshold: 50,
            signal_threshold: 200,
            min_forward_clearance: 50,
            power_low: 30,
            power_medium: 50,
            power_high: 70,
            power_max: 100,
            search_move_ms: 1000,
            drop_settle_ms: 1000,
            drop_reverse_ms: 2000,
            motor_offset_left: 0,
            motor_offset_right: 0,
            start_token: 'n',
        }
    }
}

impl ControllerConfig {
    pub fn search_move(&self) -> Duration {
        Duration::from_millis(self.search_move_ms)
    }

    pub fn drop_settle(&self) -> Duration {
        Duration::from_millis(self.drop_settle_ms)
    }

    pub fn drop_reverse(&self) -> Duration {
        Duration::from_millis(self.drop_reverse_ms)
    }
}
