//! [`ConfigVerifier`] – startup configuration rule engine.
//!
//! Before the control loop starts, pass the [`ControllerConfig`] through
//! [`ConfigVerifier::verify`]. Every registered [`ConfigRule`] is evaluated
//! in order; the first violation returns [`BeaconError::InvalidConfig`] and
//! the controller must not be started.
//!
//! [`ConfigVerifier::standard`] registers the built-in rules:
//! - [`PowerLevelRule`] – every named power level lies in `1..=power_max`
//!   and `power_max` itself lies in `1..=100`.
//! - [`ThresholdRule`] – thresholds and clearance are non-negative and
//!   within the sensor range.
//! - [`TrimRule`] – per-wheel trims are no larger than `power_max`.
//! - [`StartTokenRule`] – the start token is a single ASCII byte.

use beacon_types::{BeaconError, ControllerConfig, SENSOR_LIMIT};
use tracing::error;

/// Highest power level any motor driver accepts.
pub const DRIVER_POWER_LIMIT: i32 = 100;

/// A single invariant a configuration must satisfy.
pub trait ConfigRule: Send + Sync {
    /// Human-readable name used in log lines.
    fn name(&self) -> &str;

    /// `Ok(())` when `config` satisfies the invariant, otherwise
    /// [`BeaconError::InvalidConfig`] naming the offending field.
    fn check(&self, config: &ControllerConfig) -> Result<(), BeaconError>;
}

/// Runs every registered [`ConfigRule`] against a configuration.
///
/// # Example
///
/// ```
/// use beacon_kernel::config_verifier::ConfigVerifier;
/// use beacon_types::ControllerConfig;
///
/// let verifier = ConfigVerifier::standard();
/// assert!(verifier.verify(&ControllerConfig::default()).is_ok());
///
/// let broken = ControllerConfig { power_low: 0, ..ControllerConfig::default() };
/// assert!(verifier.verify(&broken).is_err());
/// ```
#[derive(Default)]
pub struct ConfigVerifier {
    rules: Vec<Box<dyn ConfigRule>>,
}

impl ConfigVerifier {
    /// Create an empty verifier with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// A verifier with all built-in rules registered.
    pub fn standard() -> Self {
        let mut verifier = Self::new();
        verifier.add_rule(Box::new(PowerLevelRule));
        verifier.add_rule(Box::new(ThresholdRule));
        verifier.add_rule(Box::new(TrimRule));
        verifier.add_rule(Box::new(StartTokenRule));
        verifier
    }

    /// Register a new [`ConfigRule`]. Rules run in insertion order.
    pub fn add_rule(&mut self, rule: Box<dyn ConfigRule>) {
        self.rules.push(rule);
    }

    /// Validate `config` against every rule, returning the first violation.
    pub fn verify(&self, config: &ControllerConfig) -> Result<(), BeaconError> {
        for rule in &self.rules {
            rule.check(config).inspect_err(|e| {
                error!(rule = rule.name(), error = %e, "configuration rejected");
            })?;
        }
        Ok(())
    }
}

fn invalid(field: &str, details: String) -> BeaconError {
    BeaconError::InvalidConfig {
        field: field.to_string(),
        details,
    }
}

/// Power levels must be usable by the motor driver.
pub struct PowerLevelRule;

impl ConfigRule for PowerLevelRule {
    fn name(&self) -> &str {
        "power_level"
    }

    fn check(&self, config: &ControllerConfig) -> Result<(), BeaconError> {
        if !(1..=DRIVER_POWER_LIMIT).contains(&config.power_max) {
            return Err(invalid(
                "power_max",
                format!("{} out of [1, {DRIVER_POWER_LIMIT}]", config.power_max),
            ));
        }
        for (field, value) in [
            ("power_low", config.power_low),
            ("power_medium", config.power_medium),
            ("power_high", config.power_high),
        ] {
            if !(1..=config.power_max).contains(&value) {
                return Err(invalid(
                    field,
                    format!("{value} out of [1, {}]", config.power_max),
                ));
            }
        }
        Ok(())
    }
}

/// Thresholds must be reachable by a sensor reading.
pub struct ThresholdRule;

impl ConfigRule for ThresholdRule {
    fn name(&self) -> &str {
        "threshold"
    }

    fn check(&self, config: &ControllerConfig) -> Result<(), BeaconError> {
        for (field, value) in [
            ("straight_threshold", config.straight_threshold),
            ("signal_threshold", config.signal_threshold),
            ("min_forward_clearance", config.min_forward_clearance),
        ] {
            if !(0..=SENSOR_LIMIT).contains(&value) {
                return Err(invalid(
                    field,
                    format!("{value} out of [0, {SENSOR_LIMIT}]"),
                ));
            }
        }
        Ok(())
    }
}

/// A trim larger than the power cap would swamp every command.
pub struct TrimRule;

impl ConfigRule for TrimRule {
    fn name(&self) -> &str {
        "motor_trim"
    }

    fn check(&self, config: &ControllerConfig) -> Result<(), BeaconError> {
        for (field, value) in [
            ("motor_offset_left", config.motor_offset_left),
            ("motor_offset_right", config.motor_offset_right),
        ] {
            if value.unsigned_abs() > config.power_max.unsigned_abs() {
                return Err(invalid(
                    field,
                    format!("|{value}| exceeds power_max {}", config.power_max),
                ));
            }
        }
        Ok(())
    }
}

/// The start signal reads raw bytes, so the token must fit in one.
pub struct StartTokenRule;

impl ConfigRule for StartTokenRule {
    fn name(&self) -> &str {
        "start_token"
    }

    fn check(&self, config: &ControllerConfig) -> Result<(), BeaconError> {
        if config.start_token.is_ascii() && !config.start_token.is_ascii_control() {
            Ok(())
        } else {
            Err(invalid(
                "start_token",
                format!("{:?} is not a printable ASCII character", config.start_token),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<(), BeaconError>) -> String {
        match result {
            Err(BeaconError::InvalidConfig { field, .. }) => field,
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn default_config_passes_standard_rules() {
        assert!(ConfigVerifier::standard()
            .verify(&ControllerConfig::default())
            .is_ok());
    }

    #[test]
    fn empty_verifier_accepts_anything() {
        let cfg = ControllerConfig {
            power_max: -5,
            ..ControllerConfig::default()
        };
        assert!(ConfigVerifier::new().verify(&cfg).is_ok());
    }

    #[test]
    fn zero_power_level_rejected() {
        let cfg = ControllerConfig {
            power_medium: 0,
            ..ControllerConfig::default()
        };
        assert_eq!(field_of(PowerLevelRule.check(&cfg)), "power_medium");
    }

    #[test]
    fn power_level_above_cap_rejected() {
        let cfg = ControllerConfig {
            power_max: 60,
            ..ControllerConfig::default()
        };
        // power_high defaults to 70.
        assert_eq!(field_of(PowerLevelRule.check(&cfg)), "power_high");
    }

    #[test]
    fn power_max_beyond_driver_rejected() {
        let cfg = ControllerConfig {
            power_max: 101,
            ..ControllerConfig::default()
        };
        assert_eq!(field_of(PowerLevelRule.check(&cfg)), "power_max");
    }

    #[test]
    fn negative_threshold_rejected() {
        let cfg = ControllerConfig {
            straight_threshold: -1,
            ..ControllerConfig::default()
        };
        assert_eq!(field_of(ThresholdRule.check(&cfg)), "straight_threshold");
    }

    #[test]
    fn threshold_beyond_sensor_range_rejected() {
        let cfg = ControllerConfig {
            signal_threshold: SENSOR_LIMIT + 1,
            ..ControllerConfig::default()
        };
        assert_eq!(field_of(ThresholdRule.check(&cfg)), "signal_threshold");
    }

    #[test]
    fn oversized_trim_rejected() {
        let cfg = ControllerConfig {
            motor_offset_right: -101,
            ..ControllerConfig::default()
        };
        assert_eq!(field_of(TrimRule.check(&cfg)), "motor_offset_right");
    }

    #[test]
    fn non_ascii_start_token_rejected() {
        let cfg = ControllerConfig {
            start_token: 'ñ',
            ..ControllerConfig::default()
        };
        assert_eq!(field_of(StartTokenRule.check(&cfg)), "start_token");
    }

    #[test]
    fn first_violation_wins() {
        let cfg = ControllerConfig {
            power_low: 0,
            signal_threshold: -3,
            ..ControllerConfig::default()
        };
        assert_eq!(
            field_of(ConfigVerifier::standard().verify(&cfg)),
            "power_low"
        );
    }
}
