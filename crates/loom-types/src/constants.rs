//! Simulation defaults.
//!
//! These mirror the parameter defaults of the fabric node the simulator
//! replaces, so an empty config file reproduces its behavior.

/// Gravitational acceleration (m/s²), applied along -Z.
pub const GRAVITY: f64 = 9.81;

/// Default nominal seconds per top-level step (125 Hz).
pub const DEFAULT_STEP_DT: f64 = 1.0 / 125.0;

/// Default PBD sub-steps per top-level step.
pub const DEFAULT_SUB_STEPS: u32 = 3;

/// Default top-level steps per scheduler tick.
pub const DEFAULT_STEPS: u32 = 1;

/// Default simulation tick rate (Hz).
pub const DEFAULT_SIMULATION_RATE: f64 = 90.0;

/// Default render tick rate (Hz).
pub const DEFAULT_RENDER_RATE: f64 = 30.0;

/// Number of anchor slots in the default configuration.
pub const DEFAULT_ANCHOR_COUNT: usize = 4;

/// Ticks accumulated before the mean tick duration is evaluated.
///
/// The mean is taken once the counter exceeds this value, i.e. on the
/// 11th tick after the accumulators were last cleared.
pub const CALIBRATION_WINDOW: u32 = 10;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f32 = 1.0e-7;
