//! Simulation event types.
//!
//! Events are lightweight value types tagged with the tick index at
//! which they were produced.

use serde::{Deserialize, Serialize};

/// A simulation event emitted by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Scheduler tick count since the current session began.
    pub tick: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// A scheduler tick finished.
    TickCompleted {
        /// Wall-clock duration of the tick (seconds).
        wall_time: f64,
        /// PBD sub-steps executed.
        sub_steps: u32,
    },

    /// The calibration window closed.
    RateCalibrated {
        /// Mean tick duration over the window (seconds).
        mean_tick: f64,
        /// Whether `step_dt` and the tick period were adopted from it.
        applied: bool,
    },

    /// An anchor slot bound a particle.
    AnchorAttached {
        /// Anchor slot index.
        slot: usize,
        /// Particle the slot is now pinned to.
        particle: u32,
    },

    /// Scheduling and attachment bookkeeping was cleared.
    SessionReset,

    /// Mesh and solver were rebuilt from a new configuration.
    Reconfigured {
        /// Particles in the new solver.
        particles: usize,
        /// Triangles in the new mesh.
        triangles: usize,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given tick.
    pub fn new(tick: u64, kind: EventKind) -> Self {
        Self { tick, kind }
    }
}
