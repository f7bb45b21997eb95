//! `beacon-runtime` – The Beacon Seeker State Machine
//!
//! Drives the robot through IDLE → SEARCHING → ALIGNMENT → DROP_OBJECT →
//! COMPLETE, with COLLISION as an interrupt state that can pre-empt any
//! other state at the start of a cycle.
//!
//! # Modules
//!
//! - [`controller`] – [`Controller`][controller::Controller]: owns the
//!   [`RobotContext`][beacon_types::RobotContext], applies the collision
//!   override, and dispatches each cycle to the matching handler.
//!   [`run`][controller::run] is the parameterless entry point.
//! - [`handlers`] – [`StateHandler`][handlers::StateHandler] and one
//!   implementation per [`RobotState`][beacon_types::RobotState].
//! - [`strategy`] – the hooks that are still open decisions in the mission
//!   flow: obstacle avoidance, when to stop searching, when to drop.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   global `tracing` subscriber with an optional OTLP span exporter.

pub mod controller;
pub mod handlers;
pub mod strategy;
pub mod telemetry;

pub use controller::{Controller, CycleReport, run};
pub use handlers::{Handlers, StateHandler};
pub use strategy::{
    AlwaysLeave, DropReadiness, HoldCourse, NeverReady, ObstacleAvoidance, SearchExit, Strategies,
};
pub use telemetry::{TracerProviderGuard, init_tracing};
