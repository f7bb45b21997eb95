//! Simulated drivers for running the controller without a robot.
//!
//! [`SimRig`] builds a complete [`Rig`] from stand-ins: random sensors that
//! draw uniformly from the full sensor range, motors and a latch that record
//! what they were told, and a start signal that fires immediately. Any piece
//! can be replaced with a scripted or custom driver, which is how the
//! controller tests pin down every transition.
//!
//! # Example
//!
//! ```rust
//! use beacon_hal::sim::{ManualClock, ScriptedSensor, SimMotor, SimRig};
//! use beacon_types::{ControllerConfig, DirectionCorrection, MotorId};
//!
//! let left = SimMotor::new(MotorId::Left);
//! let mut rig = SimRig::new()
//!     .with_bearings(
//!         ScriptedSensor::new("ir_left", [300]),
//!         ScriptedSensor::new("ir_right", [300]),
//!     )
//!     .with_left_motor(Box::new(left.clone()))
//!     .with_clock(Box::new(ManualClock::new()))
//!     .build(&ControllerConfig::default())
//!     .expect("sim rig must build");
//!
//! assert_eq!(rig.sensors.read_bearing().unwrap(), DirectionCorrection::Straight);
//! rig.drive.drive_forward(50, std::time::Duration::from_secs(1)).unwrap();
//! assert_eq!(left.history(), vec![50, 0]);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use beacon_types::{BeaconError, ControllerConfig, MotorId, SENSOR_LIMIT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::drive::DriveBase;
use crate::latch::ReleaseLatch;
use crate::motor::Motor;
use crate::rig::Rig;
use crate::sensor::{Sensor, SensorSuite};
use crate::start::StartSignal;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ────────────────────────────────────────────────────────────────────────────
// Sensors
// ────────────────────────────────────────────────────────────────────────────

/// Noise source standing in for a real sensor: every read is an independent
/// uniform draw from `[-SENSOR_LIMIT, SENSOR_LIMIT]`.
pub struct SimSensor {
    id: String,
    rng: StdRng,
}

impl SimSensor {
    pub fn new(id: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            rng: StdRng::from_entropy(),
        })
    }

    /// Reproducible variant for tests and replays.
    pub fn seeded(id: impl Into<String>, seed: u64) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl Sensor for SimSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn read(&mut self) -> Result<i32, BeaconError> {
        let value = self.rng.gen_range(-SENSOR_LIMIT..=SENSOR_LIMIT);
        debug!(sensor = %self.id, value, "reading");
        Ok(value)
    }
}

/// Replays a fixed sequence of readings, then repeats the last one forever.
///
/// An empty script behaves like a disconnected sensor.
pub struct ScriptedSensor {
    id: String,
    readings: VecDeque<i32>,
}

impl ScriptedSensor {
    pub fn new(id: impl Into<String>, readings: impl IntoIterator<Item = i32>) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            readings: readings.into_iter().collect(),
        })
    }

    /// A sensor whose every read fails with
    /// [`BeaconError::SensorUnavailable`].
    pub fn disconnected(id: impl Into<String>) -> Box<Self> {
        Self::new(id, Vec::new())
    }
}

impl Sensor for ScriptedSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn read(&mut self) -> Result<i32, BeaconError> {
        let value = if self.readings.len() > 1 {
            self.readings.pop_front()
        } else {
            self.readings.front().copied()
        };
        value.ok_or_else(|| BeaconError::SensorUnavailable {
            sensor: self.id.clone(),
            details: "no reading available".to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Motor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated wheel motor that records every commanded power level.
///
/// Clones share the same record, so a test can keep a handle after boxing
/// one copy into a [`DriveBase`].
#[derive(Clone)]
pub struct SimMotor {
    id: MotorId,
    history: Arc<Mutex<Vec<i32>>>,
}

impl SimMotor {
    pub fn new(id: MotorId) -> Self {
        Self {
            id,
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every power level commanded so far, oldest first.
    pub fn history(&self) -> Vec<i32> {
        lock(&self.history).clone()
    }
}

impl Motor for SimMotor {
    fn id(&self) -> MotorId {
        self.id
    }

    fn set_power(&mut self, power: i32) -> Result<(), BeaconError> {
        debug!(motor = self.id.number(), power, "setting motor power level");
        lock(&self.history).push(power);
        Ok(())
    }

    fn power(&self) -> i32 {
        lock(&self.history).last().copied().unwrap_or(0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Latch
// ────────────────────────────────────────────────────────────────────────────

/// A simulated release latch. Clones share state.
#[derive(Clone)]
pub struct SimLatch {
    id: String,
    released: Arc<AtomicBool>,
    releases: Arc<AtomicUsize>,
}

impl SimLatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            released: Arc::new(AtomicBool::new(false)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many times [`ReleaseLatch::release`] has been called.
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl ReleaseLatch for SimLatch {
    fn id(&self) -> &str {
        &self.id
    }

    fn release(&mut self) -> Result<(), BeaconError> {
        debug!(latch = %self.id, "releasing");
        self.released.store(true, Ordering::SeqCst);
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Clock and start signal
// ────────────────────────────────────────────────────────────────────────────

/// A clock that records requested sleeps and returns immediately.
#[derive(Clone, Default)]
pub struct ManualClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.sleeps).clone()
    }

    /// Sum of every requested sleep.
    pub fn elapsed(&self) -> Duration {
        lock(&self.sleeps).iter().sum()
    }
}

impl Clock for ManualClock {
    fn sleep(&mut self, duration: Duration) {
        lock(&self.sleeps).push(duration);
    }
}

/// A start signal that is always already given. Counts how often it was
/// waited on.
#[derive(Clone, Default)]
pub struct ImmediateStart {
    waits: Arc<AtomicUsize>,
}

impl ImmediateStart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }
}

impl StartSignal for ImmediateStart {
    fn wait_for_start(&mut self) -> Result<(), BeaconError> {
        self.waits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRig builder
// ────────────────────────────────────────────────────────────────────────────

/// Builder for a [`Rig`] made of simulated drivers.
///
/// Anything not supplied explicitly gets a default: [`SimSensor`]s,
/// [`SimMotor`]s, a [`SimLatch`], [`ImmediateStart`], and the wall-clock
/// [`SystemClock`].
#[derive(Default)]
pub struct SimRig {
    seed: Option<u64>,
    left_bearing: Option<Box<dyn Sensor>>,
    right_bearing: Option<Box<dyn Sensor>>,
    forward_range: Option<Box<dyn Sensor>>,
    left_motor: Option<Box<dyn Motor>>,
    right_motor: Option<Box<dyn Motor>>,
    clock: Option<Box<dyn Clock>>,
    latch: Option<Box<dyn ReleaseLatch>>,
    start: Option<Box<dyn StartSignal>>,
}

impl SimRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the default random sensors so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_bearings(mut self, left: Box<dyn Sensor>, right: Box<dyn Sensor>) -> Self {
        self.left_bearing = Some(left);
        self.right_bearing = Some(right);
        self
    }

    pub fn with_forward_range(mut self, sensor: Box<dyn Sensor>) -> Self {
        self.forward_range = Some(sensor);
        self
    }

    pub fn with_left_motor(mut self, motor: Box<dyn Motor>) -> Self {
        self.left_motor = Some(motor);
        self
    }

    pub fn with_right_motor(mut self, motor: Box<dyn Motor>) -> Self {
        self.right_motor = Some(motor);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_latch(mut self, latch: Box<dyn ReleaseLatch>) -> Self {
        self.latch = Some(latch);
        self
    }

    pub fn with_start_signal(mut self, start: Box<dyn StartSignal>) -> Self {
        self.start = Some(start);
        self
    }

    /// Consume the builder and wire the drivers up with the thresholds,
    /// trims and power cap from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BeaconError::ActuatorFault`] if a supplied motor reports
    /// the wrong wheel.
    pub fn build(self, config: &ControllerConfig) -> Result<Rig, BeaconError> {
        let seed = self.seed;
        let random = move |id: &str, offset: u64| -> Box<dyn Sensor> {
            match seed {
                Some(s) => SimSensor::seeded(id, s.wrapping_add(offset)),
                None => SimSensor::new(id),
            }
        };

        let sensors = SensorSuite::new(
            self.left_bearing.unwrap_or_else(|| random("ir_left", 0)),
            self.right_bearing.unwrap_or_else(|| random("ir_right", 1)),
            self.forward_range
                .unwrap_or_else(|| random("sonar_forward", 2)),
            config.straight_threshold,
            config.signal_threshold,
        );

        let drive = DriveBase::new(
            self.left_motor
                .unwrap_or_else(|| Box::new(SimMotor::new(MotorId::Left))),
            self.right_motor
                .unwrap_or_else(|| Box::new(SimMotor::new(MotorId::Right))),
            self.clock.unwrap_or_else(|| Box::new(SystemClock)),
        )?
        .with_trim(config.motor_offset_left, config.motor_offset_right)
        .with_power_cap(config.power_max);

        Ok(Rig::new(
            sensors,
            drive,
            self.latch
                .unwrap_or_else(|| Box::new(SimLatch::new("payload_latch"))),
            self.start
                .unwrap_or_else(|| Box::new(ImmediateStart::new())),
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
