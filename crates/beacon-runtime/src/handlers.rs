//! One [`StateHandler`] per [`RobotState`].
//!
//! A handler reads sensors, commands actuators, and returns the state the
//! controller should be in next cycle. It sees the [`RobotContext`] only
//! through a shared reference, so the controller stays the single writer of
//! both `current_state` and `previous_state`.
//!
//! ```text
//!   IDLE ──[start]──▶ SEARCHING ──[search exit]──▶ ALIGNMENT ──[ready]──▶ DROP_OBJECT
//!                        ▲                             │                      │
//!                        └──────[not straight]─────────┘                      ▼
//!                                                                         COMPLETE
//!
//!   any ──[collision override]──▶ COLLISION ──▶ previous state
//!                                               (ALIGNMENT resumes as SEARCHING)
//! ```

use std::time::Duration;

use beacon_hal::Rig;
use beacon_types::{BeaconError, ControllerConfig, DirectionCorrection, RobotContext, RobotState};
use tracing::{debug, info, warn};

use crate::strategy::{DropReadiness, ObstacleAvoidance, SearchExit, Strategies};

/// Uniform contract for every state.
pub trait StateHandler: Send {
    /// The state this handler serves.
    fn state(&self) -> RobotState;

    /// Run the state's action once and return the next state.
    ///
    /// # Errors
    ///
    /// Any sensor or actuator fault is returned unchanged; the controller
    /// decides what to do with it.
    fn handle(&mut self, ctx: &RobotContext, rig: &mut Rig) -> Result<RobotState, BeaconError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// IDLE
// ─────────────────────────────────────────────────────────────────────────────

/// Blocks on the start signal, then starts searching.
#[derive(Debug, Default)]
pub struct IdleHandler;

impl StateHandler for IdleHandler {
    fn state(&self) -> RobotState {
        RobotState::Idle
    }

    fn handle(&mut self, _ctx: &RobotContext, rig: &mut Rig) -> Result<RobotState, BeaconError> {
        rig.start.wait_for_start()?;
        info!("start signal received");
        Ok(RobotState::Searching)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SEARCHING
// ─────────────────────────────────────────────────────────────────────────────

/// One search step per cycle.
///
/// 1. If the way ahead is shorter than the minimum clearance, run the
///    [`ObstacleAvoidance`] hook first.
/// 2. Read the bearing. Straight → drive forward at medium power; otherwise
///    turn toward the stronger side at low power. Both for one search
///    interval.
/// 3. Ask the [`SearchExit`] hook whether to move on to ALIGNMENT.
pub struct SearchingHandler {
    avoidance: Box<dyn ObstacleAvoidance>,
    exit: Box<dyn SearchExit>,
    min_clearance: i32,
    drive_power: i32,
    turn_power: i32,
    move_time: Duration,
}

impl SearchingHandler {
    pub fn new(
        config: &ControllerConfig,
        avoidance: Box<dyn ObstacleAvoidance>,
        exit: Box<dyn SearchExit>,
    ) -> Self {
        Self {
            avoidance,
            exit,
            min_clearance: config.min_forward_clearance,
            drive_power: config.power_medium,
            turn_power: config.power_low,
            move_time: config.search_move(),
        }
    }
}

impl StateHandler for SearchingHandler {
    fn state(&self) -> RobotState {
        RobotState::Searching
    }

    fn handle(&mut self, _ctx: &RobotContext, rig: &mut Rig) -> Result<RobotState, BeaconError> {
        let clearance = rig.sensors.read_forward_clearance()?;
        if clearance < self.min_clearance {
            self.avoidance.avoid(rig, clearance)?;
        }

        let correction = rig.sensors.read_bearing()?;
        match correction {
            DirectionCorrection::Straight => {
                rig.drive.drive_forward(self.drive_power, self.move_time)?
            }
            DirectionCorrection::TurnRight => {
                rig.drive.turn_right(self.turn_power, self.move_time)?
            }
            DirectionCorrection::TurnLeft => rig.drive.turn_left(self.turn_power, self.move_time)?,
        }

        if self.exit.should_leave(correction) {
            Ok(RobotState::Alignment)
        } else {
            Ok(RobotState::Searching)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ALIGNMENT
// ─────────────────────────────────────────────────────────────────────────────

/// Holds the approach while the bearing stays straight.
///
/// Any other bearing aborts back to SEARCHING. A straight bearing stays in
/// ALIGNMENT unless the [`DropReadiness`] hook reports the robot is in
/// position.
pub struct AlignmentHandler {
    readiness: Box<dyn DropReadiness>,
}

impl AlignmentHandler {
    pub fn new(readiness: Box<dyn DropReadiness>) -> Self {
        Self { readiness }
    }
}

impl StateHandler for AlignmentHandler {
    fn state(&self) -> RobotState {
        RobotState::Alignment
    }

    fn handle(&mut self, _ctx: &RobotContext, rig: &mut Rig) -> Result<RobotState, BeaconError> {
        let correction = rig.sensors.read_bearing()?;
        if correction != DirectionCorrection::Straight {
            debug!(?correction, "lost alignment");
            return Ok(RobotState::Searching);
        }
        if self.readiness.ready_to_drop(&mut rig.sensors)? {
            Ok(RobotState::DropObject)
        } else {
            Ok(RobotState::Alignment)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DROP_OBJECT
// ─────────────────────────────────────────────────────────────────────────────

/// Releases the payload, lets it settle, backs away, and finishes.
pub struct DropObjectHandler {
    settle_time: Duration,
    reverse_power: i32,
    reverse_time: Duration,
}

impl DropObjectHandler {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            settle_time: config.drop_settle(),
            reverse_power: config.power_medium,
            reverse_time: config.drop_reverse(),
        }
    }
}

impl StateHandler for DropObjectHandler {
    fn state(&self) -> RobotState {
        RobotState::DropObject
    }

    fn handle(&mut self, _ctx: &RobotContext, rig: &mut Rig) -> Result<RobotState, BeaconError> {
        info!(latch = rig.latch.id(), "dropping object");
        rig.latch.release()?;
        rig.drive.hold(self.settle_time);
        rig.drive
            .drive_forward(-self.reverse_power, self.reverse_time)?;
        Ok(RobotState::Complete)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// COMPLETE
// ─────────────────────────────────────────────────────────────────────────────

/// Signals completion. Stays here for good.
#[derive(Debug, Default)]
pub struct CompleteHandler;

impl StateHandler for CompleteHandler {
    fn state(&self) -> RobotState {
        RobotState::Complete
    }

    fn handle(&mut self, _ctx: &RobotContext, _rig: &mut Rig) -> Result<RobotState, BeaconError> {
        info!("done");
        Ok(RobotState::Complete)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// COLLISION
// ─────────────────────────────────────────────────────────────────────────────

/// Recovers from a collision by resuming the interrupted state.
///
/// ALIGNMENT is never resumed directly: the robot has to search again first.
#[derive(Debug, Default)]
pub struct CollisionHandler;

impl StateHandler for CollisionHandler {
    fn state(&self) -> RobotState {
        RobotState::Collision
    }

    fn handle(&mut self, ctx: &RobotContext, _rig: &mut Rig) -> Result<RobotState, BeaconError> {
        let interrupted = ctx.previous_state();
        let resume = match interrupted {
            RobotState::Alignment => RobotState::Searching,
            other => other,
        };
        warn!(%interrupted, %resume, "recovering from collision");
        Ok(resume)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch table
// ─────────────────────────────────────────────────────────────────────────────

/// Owns one handler per state and resolves the handler for a state.
pub struct Handlers {
    idle: IdleHandler,
    searching: SearchingHandler,
    alignment: AlignmentHandler,
    drop_object: DropObjectHandler,
    complete: CompleteHandler,
    collision: CollisionHandler,
}

impl Handlers {
    pub fn new(config: &ControllerConfig, strategies: Strategies) -> Self {
        let Strategies {
            avoidance,
            search_exit,
            drop_readiness,
        } = strategies;
        Self {
            idle: IdleHandler,
            searching: SearchingHandler::new(config, avoidance, search_exit),
            alignment: AlignmentHandler::new(drop_readiness),
            drop_object: DropObjectHandler::new(config),
            complete: CompleteHandler,
            collision: CollisionHandler,
        }
    }

    pub fn for_state(&mut self, state: RobotState) -> &mut dyn StateHandler {
        match state {
            RobotState::Idle => &mut self.idle,
            RobotState::Searching => &mut self.searching,
            RobotState::Alignment => &mut self.alignment,
            RobotState::DropObject => &mut self.drop_object,
            RobotState::Complete => &mut self.complete,
            RobotState::Collision => &mut self.collision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_hal::SensorSuite;
    use beacon_hal::sim::{ManualClock, ScriptedSensor, SimLatch, SimMotor, SimRig};
    use beacon_types::MotorId;
    use std::io::Cursor;

    struct Bench {
        rig: Rig,
        left: SimMotor,
        right: SimMotor,
        clock: ManualClock,
        latch: SimLatch,
    }

    /// Rig with scripted bearings and range, recording motors and clock.
    fn bench(left_ir: i32, right_ir: i32, range: i32) -> Bench {
        let left = SimMotor::new(MotorId::Left);
        let right = SimMotor::new(MotorId::Right);
        let clock = ManualClock::new();
        let latch = SimLatch::new("payload_latch");
        let rig = SimRig::new()
            .with_bearings(
                ScriptedSensor::new("ir_left", [left_ir]),
                ScriptedSensor::new("ir_right", [right_ir]),
            )
            .with_forward_range(ScriptedSensor::new("sonar_forward", [range]))
            .with_left_motor(Box::new(left.clone()))
            .with_right_motor(Box::new(right.clone()))
            .with_clock(Box::new(clock.clone()))
            .with_latch(Box::new(latch.clone()))
            .build(&ControllerConfig::default())
            .unwrap();
        Bench {
            rig,
            left,
            right,
            clock,
            latch,
        }
    }

    fn ctx_after(previous: RobotState, current: RobotState) -> RobotContext {
        let mut ctx = RobotContext::new();
        ctx.set_current_state(previous);
        ctx.begin_cycle();
        ctx.set_current_state(current);
        ctx
    }

    fn searching(strategies: Strategies) -> SearchingHandler {
        let Strategies {
            avoidance,
            search_exit,
            ..
        } = strategies;
        SearchingHandler::new(&ControllerConfig::default(), avoidance, search_exit)
    }

    // ---------------------------------------------------------------- IDLE

    #[test]
    fn idle_moves_to_searching_after_start() {
        let mut b = bench(0, 0, 100);
        let next = IdleHandler
            .handle(&RobotContext::new(), &mut b.rig)
            .unwrap();
        assert_eq!(next, RobotState::Searching);
    }

    #[test]
    fn idle_reports_lost_start_signal() {
        let mut b = bench(0, 0, 100);
        b.rig.start = Box::new(beacon_hal::ByteStreamStart::new(Cursor::new(Vec::<u8>::new()), b'n'));
        let result = IdleHandler.handle(&RobotContext::new(), &mut b.rig);
        assert!(matches!(result, Err(BeaconError::StartSignalLost(_))));
    }

    // ----------------------------------------------------------- SEARCHING

    #[test]
    fn searching_straight_drives_forward_at_medium_power() {
        let mut b = bench(300, 300, 100);
        let next = searching(Strategies::default())
            .handle(&RobotContext::new(), &mut b.rig)
            .unwrap();
        assert_eq!(next, RobotState::Alignment);
        assert_eq!(b.left.history(), vec![50, 0]);
        assert_eq!(b.right.history(), vec![50, 0]);
        assert_eq!(b.clock.sleeps(), vec![Duration::from_millis(1000)]);
    }

    #[test]
    fn searching_turns_right_at_low_power() {
        let mut b = bench(100, 300, 100);
        searching(Strategies::default())
            .handle(&RobotContext::new(), &mut b.rig)
            .unwrap();
        assert_eq!(b.left.history(), vec![30, 0]);
        assert_eq!(b.right.history(), vec![-30, 0]);
    }

    #[test]
    fn searching_turns_left_at_low_power() {
        let mut b = bench(300, 100, 100);
        searching(Strategies::default())
            .handle(&RobotContext::new(), &mut b.rig)
            .unwrap();
        assert_eq!(b.left.history(), vec![-30, 0]);
        assert_eq!(b.right.history(), vec![30, 0]);
    }

    #[test]
    fn searching_runs_avoidance_only_when_blocked() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicI32, Ordering};

        let seen = Arc::new(AtomicI32::new(-1));
        let seen_in_hook = Arc::clone(&seen);
        let strategies = Strategies::new().with_avoidance(
            move |_rig: &mut Rig, clearance: i32| -> Result<(), BeaconError> {
                seen_in_hook.store(clearance, Ordering::SeqCst);
                Ok(())
            },
        );
        let mut handler = searching(strategies);

        let mut clear = bench(300, 300, 50);
        handler.handle(&RobotContext::new(), &mut clear.rig).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), -1);

        let mut blocked = bench(300, 300, 49);
        handler.handle(&RobotContext::new(), &mut blocked.rig).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 49);
    }

    #[test]
    fn searching_stays_when_exit_hook_declines() {
        let mut b = bench(300, 100, 100);
        let strategies = Strategies::new().with_search_exit(|_c: DirectionCorrection| false);
        let next = searching(strategies)
            .handle(&RobotContext::new(), &mut b.rig)
            .unwrap();
        assert_eq!(next, RobotState::Searching);
    }

    #[test]
    fn searching_propagates_sensor_fault_without_moving() {
        let mut b = bench(300, 300, 100);
        b.rig.sensors = SensorSuite::new(
            ScriptedSensor::new("ir_left", [300]),
            ScriptedSensor::disconnected("ir_right"),
            ScriptedSensor::new("sonar_forward", [100]),
            50,
            200,
        );
        let result = searching(Strategies::default()).handle(&RobotContext::new(), &mut b.rig);
        assert!(matches!(result, Err(BeaconError::SensorUnavailable { .. })));
        assert!(b.left.history().is_empty());
    }

    // ----------------------------------------------------------- ALIGNMENT

    #[test]
    fn alignment_aborts_to_searching_when_not_straight() {
        for (l, r) in [(100, 300), (300, 100), (100, 100)] {
            let mut b = bench(l, r, 100);
            let next = AlignmentHandler::new(Box::new(crate::strategy::NeverReady))
                .handle(&RobotContext::new(), &mut b.rig)
                .unwrap();
            assert_eq!(next, RobotState::Searching);
        }
    }

    #[test]
    fn alignment_holds_on_straight_by_default() {
        let mut b = bench(300, 300, 100);
        let next = AlignmentHandler::new(Box::new(crate::strategy::NeverReady))
            .handle(&RobotContext::new(), &mut b.rig)
            .unwrap();
        assert_eq!(next, RobotState::Alignment);
        assert!(b.left.history().is_empty());
    }

    #[test]
    fn alignment_moves_to_drop_when_ready() {
        let mut b = bench(300, 300, 10);
        let ready = |sensors: &mut SensorSuite| -> Result<bool, BeaconError> {
            Ok(sensors.read_forward_clearance()? < 20)
        };
        let next = AlignmentHandler::new(Box::new(ready))
            .handle(&RobotContext::new(), &mut b.rig)
            .unwrap();
        assert_eq!(next, RobotState::DropObject);
    }

    // --------------------------------------------------------- DROP_OBJECT

    #[test]
    fn drop_releases_settles_reverses_and_completes() {
        let mut b = bench(0, 0, 0);
        let next = DropObjectHandler::new(&ControllerConfig::default())
            .handle(&RobotContext::new(), &mut b.rig)
            .unwrap();
        assert_eq!(next, RobotState::Complete);
        assert_eq!(b.latch.release_count(), 1);
        assert_eq!(
            b.clock.sleeps(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
        assert_eq!(b.left.history(), vec![-50, 0]);
        assert_eq!(b.right.history(), vec![-50, 0]);
    }

    // ------------------------------------------------------------ COMPLETE

    #[test]
    fn complete_is_idempotent() {
        let mut b = bench(0, 0, 0);
        let ctx = ctx_after(RobotState::Complete, RobotState::Complete);
        for _ in 0..5 {
            assert_eq!(
                CompleteHandler.handle(&ctx, &mut b.rig).unwrap(),
                RobotState::Complete
            );
        }
        assert!(b.left.history().is_empty());
        assert!(b.clock.sleeps().is_empty());
        assert_eq!(b.latch.release_count(), 0);
    }

    // ----------------------------------------------------------- COLLISION

    #[test]
    fn collision_after_alignment_resumes_searching() {
        let mut b = bench(0, 0, 0);
        let ctx = ctx_after(RobotState::Alignment, RobotState::Collision);
        assert_eq!(
            CollisionHandler.handle(&ctx, &mut b.rig).unwrap(),
            RobotState::Searching
        );
    }

    #[test]
    fn collision_resumes_any_other_state() {
        let mut b = bench(0, 0, 0);
        for previous in [
            RobotState::Idle,
            RobotState::Searching,
            RobotState::DropObject,
            RobotState::Complete,
        ] {
            let ctx = ctx_after(previous, RobotState::Collision);
            assert_eq!(CollisionHandler.handle(&ctx, &mut b.rig).unwrap(), previous);
        }
    }

    // ------------------------------------------------------------ dispatch

    #[test]
    fn table_resolves_matching_handler() {
        let mut handlers = Handlers::new(&ControllerConfig::default(), Strategies::default());
        for state in RobotState::ALL {
            assert_eq!(handlers.for_state(state).state(), state);
        }
    }
}
