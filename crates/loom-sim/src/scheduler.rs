//! Fixed sub-step scheduler with one-shot rate calibration.
//!
//! Each tick runs `steps × sub_steps` solver iterations with
//! `sub_dt = step_dt / sub_steps`, then records its wall-clock duration.
//! When more than [`CALIBRATION_WINDOW`] durations have accumulated the
//! mean is logged and, if auto-rate is on and not yet locked, adopted as
//! both `step_dt` and the tick period. The lock holds until a reset.

use std::time::{Duration, Instant};

use glam::Vec3;
use loom_solver::PbdSolver;
use loom_types::constants::CALIBRATION_WINDOW;
use loom_types::FabricResult;
use serde::{Deserialize, Serialize};

use crate::config::FabricConfig;

/// Outcome of a closed calibration window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Mean tick duration over the window (seconds).
    pub mean_tick: f64,
    /// Whether the mean became the new `step_dt` and tick period.
    pub applied: bool,
}

/// Result of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick index since the session began, starting at 1.
    pub tick: u64,
    /// Wall-clock duration of the tick (seconds).
    pub wall_time: f64,
    /// PBD sub-steps executed.
    pub sub_steps: u32,
    /// Set when this tick closed a calibration window.
    pub calibration: Option<Calibration>,
}

/// Per-session scheduling state.
#[derive(Debug, Clone)]
pub struct Scheduler {
    step_dt: f64,
    sub_steps: u32,
    steps: u32,
    gravity: Vec3,
    auto_rate: bool,
    auto_rate_locked: bool,
    tick_period: Duration,
    frame_count: u32,
    time_sum: f64,
    ticks: u64,
}

impl Scheduler {
    /// Fresh session state from a validated config.
    pub fn from_config(config: &FabricConfig) -> Self {
        Self {
            step_dt: config.simulation.step_dt,
            sub_steps: config.simulation.sub_steps,
            steps: config.simulation.steps,
            gravity: config.gravity(),
            auto_rate: config.simulation.auto_rate,
            auto_rate_locked: false,
            tick_period: config.simulation_period(),
            frame_count: 0,
            time_sum: 0.0,
            ticks: 0,
        }
    }

    /// Advances the solver one tick and records its duration.
    ///
    /// A solver error aborts the tick before its duration is recorded.
    pub fn tick(&mut self, solver: &mut dyn PbdSolver) -> FabricResult<TickReport> {
        let start = Instant::now();
        let sub_steps = self.advance(solver)?;
        let wall_time = start.elapsed().as_secs_f64();
        let calibration = self.record_tick(wall_time);
        Ok(TickReport {
            tick: self.ticks,
            wall_time,
            sub_steps,
            calibration,
        })
    }

    /// Runs the solver loop without touching the timing accumulators.
    pub fn advance(&self, solver: &mut dyn PbdSolver) -> FabricResult<u32> {
        let sub_dt = (self.step_dt / self.sub_steps as f64) as f32;
        let mut executed = 0;
        for _ in 0..self.steps {
            for _ in 0..self.sub_steps {
                solver.pre_solve(sub_dt, self.gravity)?;
                solver.solve(sub_dt)?;
                solver.post_solve(sub_dt)?;
                executed += 1;
            }
        }
        Ok(executed)
    }

    /// Accumulates one tick duration and closes the window when full.
    pub fn record_tick(&mut self, wall_time: f64) -> Option<Calibration> {
        self.ticks += 1;
        self.time_sum += wall_time;
        self.frame_count += 1;
        if self.frame_count <= CALIBRATION_WINDOW {
            return None;
        }

        let mean_tick = self.time_sum / self.frame_count as f64;
        tracing::info!(mean_tick, "Seconds per simulation tick");
        self.frame_count = 0;
        self.time_sum = 0.0;

        // A zero mean only happens below clock resolution; keep the old dt.
        let applied = self.auto_rate && !self.auto_rate_locked && mean_tick > 0.0;
        if applied {
            self.step_dt = mean_tick;
            self.tick_period = Duration::from_secs_f64(mean_tick);
            self.auto_rate_locked = true;
            tracing::info!(step_dt = mean_tick, "Simulation rate locked");
        }
        Some(Calibration { mean_tick, applied })
    }

    /// Clears timing accumulators and the auto-rate lock.
    ///
    /// `step_dt` and the tick period keep their current values.
    pub fn reset(&mut self) {
        self.frame_count = 0;
        self.time_sum = 0.0;
        self.auto_rate_locked = false;
        self.ticks = 0;
    }

    pub fn step_dt(&self) -> f64 {
        self.step_dt
    }

    pub fn sub_steps(&self) -> u32 {
        self.sub_steps
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Interval at which the simulation timer should fire.
    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    pub fn is_locked(&self) -> bool {
        self.auto_rate_locked
    }

    pub fn auto_rate(&self) -> bool {
        self.auto_rate
    }

    /// Durations accumulated in the open calibration window.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Sum of the durations in the open calibration window (seconds).
    pub fn time_sum(&self) -> f64 {
        self.time_sum
    }

    /// Ticks since the session began.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
