//! Sensor driver trait and the bearing/clearance abstraction built on it.
//!
//! Two bearing sensors (left and right photo-transistors facing the beacon)
//! and one forward range sensor. Every read is an independent sample: there
//! is no smoothing, and two reads in the same cycle need not agree.

use beacon_types::{BeaconError, DirectionCorrection};
use tracing::debug;

/// A sensor that produces one bounded signed reading per call.
pub trait Sensor: Send {
    /// Stable identifier, e.g. `"ir_left"` or `"sonar_forward"`.
    fn id(&self) -> &str;

    /// Take a fresh reading.
    ///
    /// # Errors
    ///
    /// Returns [`BeaconError::SensorUnavailable`] when the driver cannot
    /// produce a value.
    fn read(&mut self) -> Result<i32, BeaconError>;
}

/// Decide the heading correction for one pair of bearing magnitudes.
///
/// Rules, in order:
/// 1. `left - right < straight_threshold` and both sides above
///    `signal_threshold` → [`DirectionCorrection::Straight`]
/// 2. `left - right < 0` → [`DirectionCorrection::TurnRight`]
/// 3. otherwise → [`DirectionCorrection::TurnLeft`]
///
/// The first comparison is one-sided: a strongly negative diff still
/// satisfies it.
pub fn classify_bearing(
    left: i32,
    right: i32,
    straight_threshold: i32,
    signal_threshold: i32,
) -> DirectionCorrection {
    let diff = left.saturating_sub(right);
    let diff_in_range = diff < straight_threshold;
    let has_left_signal = left > signal_threshold;
    let has_right_signal = right > signal_threshold;

    if diff_in_range && has_left_signal && has_right_signal {
        DirectionCorrection::Straight
    } else if diff < 0 {
        DirectionCorrection::TurnRight
    } else {
        DirectionCorrection::TurnLeft
    }
}

/// The three sensors the controller consumes, plus the bearing thresholds.
pub struct SensorSuite {
    left_bearing: Box<dyn Sensor>,
    right_bearing: Box<dyn Sensor>,
    forward_range: Box<dyn Sensor>,
    straight_threshold: i32,
    signal_threshold: i32,
}

impl SensorSuite {
    pub fn new(
        left_bearing: Box<dyn Sensor>,
        right_bearing: Box<dyn Sensor>,
        forward_range: Box<dyn Sensor>,
        straight_threshold: i32,
        signal_threshold: i32,
    ) -> Self {
        Self {
            left_bearing,
            right_bearing,
            forward_range,
            straight_threshold,
            signal_threshold,
        }
    }

    /// Read both bearing sensors and classify the result with
    /// [`classify_bearing`].
    pub fn read_bearing(&mut self) -> Result<DirectionCorrection, BeaconError> {
        let left = self.left_bearing.read()?;
        let right = self.right_bearing.read()?;
        let correction =
            classify_bearing(left, right, self.straight_threshold, self.signal_threshold);
        debug!(left, right, ?correction, "bearing");
        Ok(correction)
    }

    /// Current free distance ahead. Callers compare it to their minimum
    /// safe clearance.
    pub fn read_forward_clearance(&mut self) -> Result<i32, BeaconError> {
        let range = self.forward_range.read()?;
        debug!(sensor = self.forward_range.id(), range, "forward clearance");
        Ok(range)
    }
}
