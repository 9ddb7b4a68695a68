//! # loom-telemetry
//!
//! Event bus for simulator telemetry. Emits structured events
//! (tick timing, rate calibration, anchor attachment, session
//! lifecycle) that can be consumed by pluggable sinks.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, SharedVecSink, TracingSink, VecSink};
