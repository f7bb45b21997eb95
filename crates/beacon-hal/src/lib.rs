//! `beacon-hal` – Hardware Abstraction Layer
//!
//! Everything the controller knows about the physical robot goes through the
//! traits in this crate, so drivers can be swapped for simulated or scripted
//! ones without touching the state machine.
//!
//! # Modules
//!
//! - [`sensor`] – [`Sensor`][sensor::Sensor] driver trait and
//!   [`SensorSuite`][sensor::SensorSuite], which turns two bearing readings
//!   into a [`DirectionCorrection`][beacon_types::DirectionCorrection] and
//!   exposes the forward clearance.
//! - [`motor`] – [`Motor`][motor::Motor] driver trait for a single wheel.
//! - [`drive`] – [`DriveBase`][drive::DriveBase]: differential drive with
//!   timed moves that always end with both wheels at zero power.
//! - [`clock`] – [`Clock`][clock::Clock]: blocking sleep primitive.
//! - [`latch`] – [`ReleaseLatch`][latch::ReleaseLatch]: holds the carried
//!   object until told to let go.
//! - [`start`] – [`StartSignal`][start::StartSignal]: blocks until the
//!   operator says go.
//! - [`rig`] – [`Rig`][rig::Rig]: the bundle of all of the above handed to
//!   state handlers.
//! - [`sim`] – random, scripted, and recording stand-ins for every driver,
//!   plus the [`SimRig`][sim::SimRig] builder.

pub mod clock;
pub mod drive;
pub mod latch;
pub mod motor;
pub mod rig;
pub mod sensor;
pub mod sim;
pub mod start;

pub use clock::{Clock, SystemClock};
pub use drive::DriveBase;
pub use latch::ReleaseLatch;
pub use motor::Motor;
pub use rig::Rig;
pub use sensor::{Sensor, SensorSuite, classify_bearing};
pub use start::{ByteStreamStart, StartSignal};
