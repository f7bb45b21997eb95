//! [`Controller`] – the state machine's cycle loop.
//!
//! Each cycle, in order:
//!
//! 1. **Snapshot** – `previous_state := current_state`.
//! 2. **Collision check** – query the [`CollisionMonitor`] once. A hit while
//!    not already in COLLISION overrides `current_state` with COLLISION,
//!    whatever the last handler chose.
//! 3. **Dispatch** – run the [`StateHandler`] for the (possibly overridden)
//!    current state.
//! 4. **Commit** – the handler's answer becomes `current_state`.
//!
//! Handlers block for the length of their moves, so the robot is blind to
//! collisions until the running handler returns.
//!
//! # Faults
//!
//! A handler error ends the cycle: the controller logs it, tries to stop
//! both wheels, and returns the error. Nothing is retried; the state is left
//! as it was at dispatch.
//!
//! # Example
//!
//! ```rust
//! use beacon_hal::sim::{ManualClock, SimRig};
//! use beacon_kernel::NoCollisions;
//! use beacon_runtime::{Controller, Strategies};
//! use beacon_types::{ControllerConfig, RobotState};
//!
//! let config = ControllerConfig::default();
//! let rig = SimRig::new()
//!     .with_seed(7)
//!     .with_clock(Box::new(ManualClock::new()))
//!     .build(&config)
//!     .unwrap();
//! let mut controller =
//!     Controller::new(&config, rig, Box::new(NoCollisions), Strategies::default()).unwrap();
//!
//! // The simulated start signal fires at once.
//! controller.cycle().unwrap();
//! assert_eq!(controller.context().current_state(), RobotState::Searching);
//! ```

use std::convert::Infallible;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use beacon_hal::sim::SimRig;
use beacon_hal::{ByteStreamStart, Rig};
use beacon_kernel::{CollisionMonitor, ConfigVerifier, NoCollisions};
use beacon_types::{BeaconError, ControllerConfig, RobotContext, RobotState};
use tracing::{debug, error, info, info_span, warn};

use crate::handlers::Handlers;
use crate::strategy::Strategies;
use crate::telemetry::init_tracing;

/// What happened in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Zero-based cycle number.
    pub cycle: u64,
    /// State at the start of the cycle.
    pub previous: RobotState,
    /// Whether the collision override fired this cycle.
    pub overridden: bool,
    /// State whose handler actually ran.
    pub dispatched: RobotState,
    /// State selected for the next cycle.
    pub next: RobotState,
}

/// Owns the robot context, the hardware, and the handlers, and runs cycles.
pub struct Controller {
    context: RobotContext,
    rig: Rig,
    monitor: Box<dyn CollisionMonitor>,
    handlers: Handlers,
    cycles: u64,
}

impl Controller {
    /// Build a controller in IDLE.
    ///
    /// # Errors
    ///
    /// Returns [`BeaconError::InvalidConfig`] if `config` fails
    /// [`ConfigVerifier::standard`]. Nothing has moved at that point.
    pub fn new(
        config: &ControllerConfig,
        rig: Rig,
        monitor: Box<dyn CollisionMonitor>,
        strategies: Strategies,
    ) -> Result<Self, BeaconError> {
        ConfigVerifier::standard().verify(config)?;
        Ok(Self {
            context: RobotContext::new(),
            rig,
            monitor,
            handlers: Handlers::new(config, strategies),
            cycles: 0,
        })
    }

    pub fn context(&self) -> &RobotContext {
        &self.context
    }

    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    /// Number of cycles completed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run exactly one cycle.
    pub fn cycle(&mut self) -> Result<CycleReport, BeaconError> {
        let span = info_span!("cycle", n = self.cycles);
        let _enter = span.enter();

        info!(state = %self.context.current_state(), "current state");

        let already_in_collision = self.context.begin_cycle();
        let previous = self.context.previous_state();
        let hit = self.monitor.detect_collision();
        let overridden = hit && !already_in_collision;
        if overridden {
            warn!(interrupted = %previous, "collision detected");
            self.context.set_current_state(RobotState::Collision);
        }

        let dispatched = self.context.current_state();
        let handler = self.handlers.for_state(dispatched);
        let next = match handler.handle(&self.context, &mut self.rig) {
            Ok(next) => next,
            Err(e) => {
                error!(state = %dispatched, error = %e, "handler failed");
                if let Err(stop_err) = self.rig.drive.stop() {
                    error!(error = %stop_err, "all-stop after fault failed");
                }
                return Err(e);
            }
        };

        if next != dispatched {
            debug!(from = %dispatched, to = %next, "transition");
        }
        self.context.set_current_state(next);
        let report = CycleReport {
            cycle: self.cycles,
            previous,
            overridden,
            dispatched,
            next,
        };
        self.cycles += 1;
        Ok(report)
    }

    /// Run `count` cycles, stopping early on the first fault.
    pub fn run_cycles(&mut self, count: usize) -> Result<Vec<CycleReport>, BeaconError> {
        (0..count).map(|_| self.cycle()).collect()
    }

    /// Run until `stop` is set. The flag is checked between cycles, so a
    /// handler that is mid-move finishes first.
    ///
    /// Returns the number of cycles run by this call.
    pub fn run_until(&mut self, stop: &AtomicBool) -> Result<u64, BeaconError> {
        let start = self.cycles;
        while !stop.load(Ordering::SeqCst) {
            self.cycle()?;
        }
        info!(cycles = self.cycles - start, "stop requested");
        self.rig.drive.stop()?;
        Ok(self.cycles - start)
    }

    /// Run forever. Only returns on a fault.
    pub fn run(&mut self) -> Result<Infallible, BeaconError> {
        loop {
            self.cycle()?;
        }
    }
}

/// Start the beacon seeker with default tuning on simulated hardware,
/// waiting for the start token on stdin. Runs until a fault.
///
/// Installs the tracing subscriber through [`init_tracing`] unless the
/// caller already has one.
pub fn run() -> Result<Infallible, BeaconError> {
    let _guard = init_tracing("beacon");
    let config = ControllerConfig::default();
    ConfigVerifier::standard().verify(&config)?;
    let rig = SimRig::new()
        .with_start_signal(Box::new(ByteStreamStart::new(
            io::stdin(),
            config.start_token as u8,
        )))
        .build(&config)?;
    let mut controller = Controller::new(&config, rig, Box::new(NoCollisions), Strategies::default())?;
    controller.run()
}
