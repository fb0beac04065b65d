use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::content::LayoutError;
use crate::StartupError;

use super::input::InputSource;
use super::room::RoomId;
use super::simulation::{SessionState, Simulation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// Every frame advances by exactly one fixed step. Deterministic.
    Stepped,
    /// Frames are paced against the wall clock.
    Realtime,
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval_ticks: u64,
    pub max_ticks: Option<u64>,
    pub clock: ClockMode,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval_ticks: 600,
            max_ticks: None,
            clock: ClockMode::Stepped,
        }
    }
}

impl LoopConfig {
    pub fn fixed_dt(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_tps.max(1) as f64)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load dungeon layout: {0}")]
    Layout(#[from] LayoutError),
}

pub trait FrameClock {
    /// Blocks as needed and returns the time since the previous frame.
    fn next_frame_delta(&mut self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
pub struct SteppedClock {
    frame: Duration,
}

impl SteppedClock {
    pub fn new(frame: Duration) -> Self {
        Self { frame }
    }
}

impl FrameClock for SteppedClock {
    fn next_frame_delta(&mut self) -> Duration {
        self.frame
    }
}

#[derive(Debug)]
pub struct RealtimeClock {
    frame_target: Duration,
    last_frame: Instant,
}

impl RealtimeClock {
    pub fn new(frame_target: Duration) -> Self {
        Self {
            frame_target,
            last_frame: Instant::now(),
        }
    }
}

impl FrameClock for RealtimeClock {
    fn next_frame_delta(&mut self) -> Duration {
        let elapsed = Instant::now().saturating_duration_since(self.last_frame);
        let sleep = compute_cap_sleep(elapsed, self.frame_target);
        if sleep > Duration::ZERO {
            thread::sleep(sleep);
        }
        let now = Instant::now();
        let frame_dt = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        frame_dt
    }
}

pub fn clock_for(config: &LoopConfig) -> Box<dyn FrameClock> {
    match config.clock {
        ClockMode::Stepped => Box::new(SteppedClock::new(config.fixed_dt())),
        ClockMode::Realtime => Box::new(RealtimeClock::new(config.fixed_dt())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QuitRequested,
    SessionFinished(SessionState),
    TickLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub frames: u64,
    pub stop_reason: StopReason,
    pub final_state: SessionState,
    pub score: u32,
    pub health: i32,
    pub room_id: RoomId,
    pub dropped_backlog: Duration,
}

/// Fixed-step loop without a window. Runs until quit, a terminal session state or the tick limit.
///
/// `on_frame` sees the simulation after each frame's ticks.
pub fn run_headless(
    config: &LoopConfig,
    simulation: &mut Simulation,
    input: &mut dyn InputSource,
    clock: &mut dyn FrameClock,
    mut on_frame: Option<&mut dyn FnMut(&Simulation)>,
) -> RunSummary {
    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval_ticks = config.metrics_log_interval_ticks.max(1);
    let fixed_dt = config.fixed_dt();
    let fixed_dt_seconds = fixed_dt.as_secs_f32();

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ticks,
        max_ticks = ?config.max_ticks,
        clock = ?config.clock,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut ticks = 0u64;
    let mut frames = 0u64;
    let mut dropped_total = Duration::ZERO;

    let stop_reason = 'frames: loop {
        let raw_frame_dt = clock.next_frame_delta();
        let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
        accumulator = accumulator.saturating_add(clamped_frame_dt);

        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        accumulator = step_plan.remaining_accumulator;
        if step_plan.dropped_backlog > Duration::ZERO {
            dropped_total = dropped_total.saturating_add(step_plan.dropped_backlog);
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        for _ in 0..step_plan.ticks_to_run {
            if config.max_ticks.is_some_and(|limit| ticks >= limit) {
                break 'frames StopReason::TickLimit;
            }
            let snapshot = input.snapshot_for_tick();
            let report = simulation.tick(fixed_dt_seconds, &snapshot);
            ticks += 1;

            if report.quit_requested {
                info!(reason = "quit_input", "shutdown_requested");
                break 'frames StopReason::QuitRequested;
            }
            if ticks % metrics_log_interval_ticks == 0 {
                info!(
                    tick = ticks,
                    room_id = simulation.current_room_id(),
                    score = simulation.player().score(),
                    health = simulation.player().health(),
                    state = %simulation.state(),
                    "loop_metrics"
                );
            }
            if simulation.state().is_terminal() {
                break 'frames StopReason::SessionFinished(simulation.state());
            }
        }

        frames += 1;
        if let Some(hook) = on_frame.as_mut() {
            hook(&*simulation);
        }
        if config.max_ticks.is_some_and(|limit| ticks >= limit) {
            break StopReason::TickLimit;
        }
    };

    if let Some(hook) = on_frame.as_mut() {
        hook(&*simulation);
    }

    let summary = RunSummary {
        ticks,
        frames,
        stop_reason,
        final_state: simulation.state(),
        score: simulation.player().score(),
        health: simulation.player().health(),
        room_id: simulation.current_room_id(),
        dropped_backlog: dropped_total,
    };
    info!(
        ticks = summary.ticks,
        frames = summary.frames,
        stop_reason = ?summary.stop_reason,
        state = %summary.final_state,
        score = summary.score,
        health = summary.health,
        room_id = summary.room_id,
        "shutdown"
    );
    summary
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn compute_cap_sleep(elapsed: Duration, frame_target: Duration) -> Duration {
    if elapsed < frame_target {
        frame_target - elapsed
    } else {
        Duration::ZERO
    }
}
