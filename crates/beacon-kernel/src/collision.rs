//! [`CollisionMonitor`] – per-cycle collision predicate.
//!
//! How a hit is sensed (bumper switch, current spike, IMU jolt) is up to the
//! implementation; the controller only ever asks for a boolean.
//!
//! Any `FnMut() -> bool` closure is a monitor, which keeps test doubles to a
//! single line.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Answers "did we hit something since the last cycle?".
pub trait CollisionMonitor: Send {
    fn detect_collision(&mut self) -> bool;
}

impl<F> CollisionMonitor for F
where
    F: FnMut() -> bool + Send,
{
    fn detect_collision(&mut self) -> bool {
        self()
    }
}

/// Never reports a collision. The default until a real bumper is fitted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCollisions;

impl CollisionMonitor for NoCollisions {
    fn detect_collision(&mut self) -> bool {
        false
    }
}

/// Simulated bumper that fires with a fixed probability per cycle.
pub struct SimBumper {
    rng: StdRng,
    rate: f64,
}

impl SimBumper {
    /// `rate` is clamped to `[0.0, 1.0]`; NaN counts as zero.
    pub fn new(rate: f64) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            rate: hit_rate(rate),
        }
    }

    pub fn seeded(rate: f64, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            rate: hit_rate(rate),
        }
    }
}

fn hit_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

impl CollisionMonitor for SimBumper {
    fn detect_collision(&mut self) -> bool {
        let hit = self.rng.gen_bool(self.rate);
        if hit {
            debug!("simulated bumper hit");
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_collisions_is_always_false() {
        let mut monitor = NoCollisions;
        assert!((0..100).all(|_| !monitor.detect_collision()));
    }

    #[test]
    fn closure_is_a_monitor() {
        let mut calls = 0;
        let mut monitor = move || {
            calls += 1;
            calls == 2
        };
        assert!(!monitor.detect_collision());
        assert!(monitor.detect_collision());
        assert!(!monitor.detect_collision());
    }

    #[test]
    fn sim_bumper_extremes() {
        let mut never = SimBumper::seeded(0.0, 3);
        let mut always = SimBumper::seeded(1.0, 3);
        for _ in 0..50 {
            assert!(!never.detect_collision());
            assert!(always.detect_collision());
        }
    }

    #[test]
    fn sim_bumper_clamps_rate() {
        let mut bumper = SimBumper::seeded(7.5, 1);
        assert!(bumper.detect_collision());
        let mut bumper = SimBumper::seeded(-1.0, 1);
        assert!(!bumper.detect_collision());
        let mut bumper = SimBumper::seeded(f64::NAN, 1);
        assert!(!bumper.detect_collision());
    }
}
