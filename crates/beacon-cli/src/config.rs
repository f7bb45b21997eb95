//! Reads `~/.beacon/config.toml`.
//!
//! ```toml
//! sim_collision_rate = 0.05
//!
//! [controller]
//! signal_threshold = 180
//! power_medium = 45
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use beacon_types::ControllerConfig;
use serde::{Deserialize, Serialize};

/// Everything the `beacon` binary reads from disk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Per-cycle probability that the simulated bumper fires. `0` disables it.
    #[serde(default)]
    pub sim_collision_rate: f64,
}

/// Return the path to `~/.beacon/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".beacon").join("config.toml")
}

/// The resolved configuration and whether a file contributed to it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: CliConfig,
    pub from_file: bool,
}

/// Load `path` (or the defaults when it does not exist), then apply the
/// `BEACON_*` environment overrides.
pub fn load(path: &Path) -> Result<LoadedConfig, String> {
    let file = load_from(path)?;
    let from_file = file.is_some();
    let mut config = file.unwrap_or_default();
    apply_env_overrides(&mut config);
    Ok(LoadedConfig { config, from_file })
}

/// Parse the config file at `path`. `None` if the file does not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<CliConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: CliConfig =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    if !(0.0..=1.0).contains(&cfg.sim_collision_rate) {
        return Err(format!(
            "sim_collision_rate must be within 0..=1, got {}",
            cfg.sim_collision_rate
        ));
    }
    Ok(Some(cfg))
}

/// Apply `BEACON_*` environment overrides. Values that do not parse are
/// ignored.
///
/// | Variable | Field |
/// |---|---|
/// | `BEACON_SIGNAL_THRESHOLD` | `controller.signal_threshold` |
/// | `BEACON_STRAIGHT_THRESHOLD` | `controller.straight_threshold` |
/// | `BEACON_MIN_CLEARANCE` | `controller.min_forward_clearance` |
/// | `BEACON_SEARCH_MOVE_MS` | `controller.search_move_ms` |
pub fn apply_env_overrides(cfg: &mut CliConfig) {
    let c = &mut cfg.controller;
    if let Some(v) = env_parse("BEACON_SIGNAL_THRESHOLD") {
        c.signal_threshold = v;
    }
    if let Some(v) = env_parse("BEACON_STRAIGHT_THRESHOLD") {
        c.straight_threshold = v;
    }
    if let Some(v) = env_parse("BEACON_MIN_CLEARANCE") {
        c.min_forward_clearance = v;
    }
    if let Some(v) = env_parse("BEACON_SEARCH_MOVE_MS") {
        c.search_move_ms = v;
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.trim().parse().ok()
}
