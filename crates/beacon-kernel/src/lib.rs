//! `beacon-kernel` – Safety Rules
//!
//! The part of the controller that does not steer; it decides when the
//! normal flow must be interrupted or must not start at all.
//!
//! # Modules
//!
//! - [`collision`] – [`CollisionMonitor`][collision::CollisionMonitor]:
//!   the single boolean evaluated once per cycle before dispatch. A `true`
//!   forces the COLLISION state ahead of whatever the last handler chose.
//! - [`config_verifier`] – [`ConfigVerifier`][config_verifier::ConfigVerifier]:
//!   a rule engine that rejects an invalid
//!   [`ControllerConfig`][beacon_types::ControllerConfig] before the control
//!   loop is entered.

pub mod collision;
pub mod config_verifier;

pub use collision::{CollisionMonitor, NoCollisions, SimBumper};
pub use config_verifier::{
    ConfigRule, ConfigVerifier, PowerLevelRule, StartTokenRule, ThresholdRule, TrimRule,
};
